//! User-agent tokenizer
//!
//! Splits a raw header into `name/version` product tokens and parenthesised
//! comment groups. Never fails: unbalanced parentheses swallow the rest of
//! the input into the last comment, stray characters become version-less
//! products.

/// A `name/version` product token (version may be empty)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product<'a> {
    pub name: &'a str,
    pub version: &'a str,
}

/// Tokenized view over a raw user-agent string
#[derive(Debug)]
pub struct UserAgent<'a> {
    raw: &'a str,
    lower: String,
    products: Vec<Product<'a>>,
    comments: Vec<&'a str>,
}

impl<'a> UserAgent<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        let mut products = Vec::new();
        let mut comments = Vec::new();

        let bytes = raw.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => {
                    let start = i + 1;
                    let mut depth = 1;
                    let mut j = start;
                    while j < bytes.len() && depth > 0 {
                        match bytes[j] {
                            b'(' => depth += 1,
                            b')' => depth -= 1,
                            _ => {}
                        }
                        j += 1;
                    }
                    let end = if depth == 0 { j - 1 } else { bytes.len() };
                    comments.push(&raw[start..end]);
                    i = j;
                }
                b if b.is_ascii_whitespace() || b == b')' => i += 1,
                _ => {
                    let start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'(' {
                        i += 1;
                    }
                    let token = &raw[start..i];
                    let (name, version) = token.split_once('/').unwrap_or((token, ""));
                    products.push(Product { name, version });
                }
            }
        }

        Self {
            raw,
            lower: raw.to_ascii_lowercase(),
            products,
            comments,
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Lowercased copy of the whole header, for keyword scans
    pub fn lower(&self) -> &str {
        &self.lower
    }

    pub fn products(&self) -> &[Product<'a>] {
        &self.products
    }

    /// Version of the first product token named exactly `name`
    pub fn product(&self, name: &str) -> Option<&'a str> {
        self.products
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.version)
    }

    pub fn has_product(&self, name: &str) -> bool {
        self.products.iter().any(|p| p.name == name)
    }

    /// Case-sensitive search across all comment groups
    pub fn comment_contains(&self, needle: &str) -> bool {
        self.comments.iter().any(|c| c.contains(needle))
    }

    /// Case-sensitive search across the whole header
    pub fn contains(&self, needle: &str) -> bool {
        self.raw.contains(needle)
    }

    /// Remainder of the first `;`-separated comment item starting with `prefix`
    ///
    /// `comment_value("rv:")` on `(Windows NT 10.0; Trident/7.0; rv:11.0)`
    /// yields `"11.0"`.
    pub fn comment_value(&self, prefix: &str) -> Option<&'a str> {
        self.comments
            .iter()
            .flat_map(|c| c.split(';'))
            .map(str::trim)
            .find_map(|item| item.strip_prefix(prefix))
            .map(str::trim)
    }

    /// iOS version from `CPU iPhone OS 13_0 like Mac OS X`, if present
    pub fn ios_version(&self) -> Option<&'a str> {
        self.comments
            .iter()
            .flat_map(|c| c.split(';'))
            .map(str::trim)
            .filter(|item| item.starts_with("CPU "))
            .find_map(|item| {
                let (_, rest) = item.split_once(" OS ")?;
                rest.split_whitespace().next()
            })
    }
}
