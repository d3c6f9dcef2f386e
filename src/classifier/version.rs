//! Browser version parsing and canonical formatting

/// Major/minor pair extracted from a product token.
///
/// Build and patch components are discarded at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a dotted (or iOS-style underscored) version string.
    ///
    /// Only leading digits of each component count, so `"91.0.4472.124"`,
    /// `"13_0"` and `"4.0b3"` all parse. Anything unreadable is `0`.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.trim().split(['.', '_']);
        let major = parts.next().map(leading_number).unwrap_or(0);
        let minor = parts.next().map(leading_number).unwrap_or(0);
        Self { major, minor }
    }

    /// Canonical string: `"major"`, or `"major.minor"` when minor > 0.
    pub fn format(&self) -> String {
        if self.minor > 0 {
            format!("{}.{}", self.major, self.minor)
        } else {
            self.major.to_string()
        }
    }
}

fn leading_number(part: &str) -> u32 {
    let digits: &str = {
        let end = part
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(part.len());
        &part[..end]
    };

    // Overlong numerals saturate instead of failing the whole parse
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u32::MAX)
    }
}
