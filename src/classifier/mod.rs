//! User-Agent Classifier
//!
//! Pure mapping from a raw, untrusted user-agent header to a canonical
//! `(family, version, mobile)` triple. Automated traffic and anything that
//! cannot be attributed to a known browser is rejected rather than counted
//! under a placeholder family.
//!
//! ```text
//! raw header → UserAgent (tokens) → bot check → browser family + version
//!                                             → device class → mobile flag
//! ```

pub mod bot;
pub mod browser;
pub mod device;
pub mod tokens;
pub mod version;

pub use browser::BrowserFamily;
pub use device::DeviceClass;
pub use tokens::UserAgent;
pub use version::Version;

use serde::Serialize;

/// Accepted classification of one user-agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub family: BrowserFamily,
    pub version: String,
    pub mobile: bool,
}

impl Classification {
    pub fn browser(&self) -> &'static str {
        self.family.as_str()
    }
}

/// Why a user-agent was not counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Empty,
    Bot,
    Unrecognized,
}

impl Serialize for BrowserFamily {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Classify a raw user-agent header
pub fn classify(raw: &str) -> Result<Classification, Rejection> {
    let ua = UserAgent::parse(raw);
    if ua.is_empty() {
        return Err(Rejection::Empty);
    }

    if bot::is_bot(&ua) {
        return Err(Rejection::Bot);
    }

    let (family, version) = browser::detect_browser(&ua).ok_or(Rejection::Unrecognized)?;
    let device = device::detect_device(&ua);

    Ok(Classification {
        family,
        version: version.format(),
        mobile: device.is_mobile(),
    })
}
