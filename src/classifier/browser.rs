//! Browser family detection
//!
//! Most browsers embed the tokens of the engines they imitate (every Chrome
//! says `Safari/`, every Edge says `Chrome/`), so detection runs in a fixed
//! precedence order from the most specific token to the most generic.
//!
//! Known misreports kept as-is:
//! - Firefox on iOS (`FxiOS/`) is reported as Firefox although it is the
//!   Safari engine underneath.
//! - Edge, both EdgeHTML (`Edge/18.17763`) and Chromium (`Edg/79`), is
//!   reported as IE.
//! - Opera Mini on Presto sends `Version/12.16` and lands on "Opera 12.16",
//!   indistinguishable from desktop Opera 12.16.

use super::tokens::UserAgent;
use super::version::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserFamily {
    Chrome,
    Firefox,
    Safari,
    IE,
    Opera,
    Android,
    Blackberry,
    UCBrowser,
    Silk,
    Samsung,
    Yandex,
    CocCoc,
    QQ,
    Nintendo,
}

impl BrowserFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserFamily::Chrome => "Chrome",
            BrowserFamily::Firefox => "Firefox",
            BrowserFamily::Safari => "Safari",
            BrowserFamily::IE => "IE",
            BrowserFamily::Opera => "Opera",
            BrowserFamily::Android => "Android",
            BrowserFamily::Blackberry => "Blackberry",
            BrowserFamily::UCBrowser => "UCBrowser",
            BrowserFamily::Silk => "Silk",
            BrowserFamily::Samsung => "Samsung",
            BrowserFamily::Yandex => "Yandex",
            BrowserFamily::CocCoc => "CocCoc",
            BrowserFamily::QQ => "QQ",
            BrowserFamily::Nintendo => "Nintendo",
        }
    }
}

/// Product tokens checked in order; first hit wins
const PRODUCT_RULES: &[(&str, BrowserFamily)] = &[
    ("OPR", BrowserFamily::Opera),
    ("OPiOS", BrowserFamily::Opera),
    ("Edge", BrowserFamily::IE),
    ("Edg", BrowserFamily::IE),
    ("EdgA", BrowserFamily::IE),
    ("EdgiOS", BrowserFamily::IE),
    ("SamsungBrowser", BrowserFamily::Samsung),
    ("UCBrowser", BrowserFamily::UCBrowser),
    ("YaBrowser", BrowserFamily::Yandex),
    ("coc_coc_browser", BrowserFamily::CocCoc),
    ("MQQBrowser", BrowserFamily::QQ),
    ("QQBrowser", BrowserFamily::QQ),
    ("Silk", BrowserFamily::Silk),
    ("NintendoBrowser", BrowserFamily::Nintendo),
    ("Firefox", BrowserFamily::Firefox),
    ("FxiOS", BrowserFamily::Firefox),
    ("CriOS", BrowserFamily::Chrome),
    ("Chrome", BrowserFamily::Chrome),
    ("Chromium", BrowserFamily::Chrome),
];

pub fn detect_browser(ua: &UserAgent<'_>) -> Option<(BrowserFamily, Version)> {
    // Presto-era Opera: "Opera/9.80 (...) Presto/2.12 Version/12.16"
    if let Some(opera) = ua.product("Opera") {
        let version = ua.product("Version").unwrap_or(opera);
        log::trace!("Opera {} -> {}", version, ua.raw());
        return Some((BrowserFamily::Opera, Version::parse(version)));
    }

    for (token, family) in PRODUCT_RULES {
        if let Some(version) = ua.product(token) {
            return Some((*family, Version::parse(version)));
        }
    }

    // Old IE only identifies itself inside the comment
    if let Some(msie) = ua.comment_value("MSIE ") {
        return Some((BrowserFamily::IE, Version::parse(msie)));
    }
    if ua.comment_contains("Trident/") {
        let version = ua.comment_value("rv:").unwrap_or("0");
        return Some((BrowserFamily::IE, Version::parse(version)));
    }

    let webkit = ua.has_product("AppleWebKit");

    if webkit && ua.comment_contains("Android") {
        let version = ua.product("Version").unwrap_or("0");
        return Some((BrowserFamily::Android, Version::parse(version)));
    }

    if ua.comment_contains("BlackBerry") || ua.comment_contains("BB10") {
        let version = ua.product("Version").unwrap_or("0");
        return Some((BrowserFamily::Blackberry, Version::parse(version)));
    }

    if webkit {
        if let Some(version) = ua.product("Version") {
            return Some((BrowserFamily::Safari, Version::parse(version)));
        }
        // iOS in-app web views carry no Version/ token; fall back to the OS version
        if let Some(ios) = ua.ios_version() {
            return Some((BrowserFamily::Safari, Version::parse(ios)));
        }
        if ua.has_product("Safari") {
            return Some((BrowserFamily::Safari, Version::default()));
        }
    }

    None
}
