//! Coarse device class from platform hints

use super::tokens::UserAgent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Computer,
    Phone,
    Tablet,
    Console,
    Tv,
    Unknown,
}

impl DeviceClass {
    /// Only phone-class devices count as mobile
    pub fn is_mobile(&self) -> bool {
        matches!(self, DeviceClass::Phone)
    }
}

pub fn detect_device(ua: &UserAgent<'_>) -> DeviceClass {
    let lower = ua.lower();

    if ["smart-tv", "smarttv", "googletv", "appletv", "crkey", "hbbtv", "netcast", "roku"]
        .iter()
        .any(|k| lower.contains(k))
    {
        return DeviceClass::Tv;
    }

    if ["playstation", "xbox", "nintendo"].iter().any(|k| lower.contains(k)) {
        return DeviceClass::Console;
    }

    if ua.comment_contains("iPad") || lower.contains("kindle") || lower.contains("silk/") {
        return DeviceClass::Tablet;
    }

    if ua.comment_contains("iPhone")
        || ua.comment_contains("iPod")
        || lower.contains("windows phone")
        || lower.contains("opera mini")
        || lower.contains("blackberry")
        || lower.contains("bb10")
    {
        return DeviceClass::Phone;
    }

    if lower.contains("android") {
        // Android tablets omit the "Mobile" marker
        return if lower.contains("mobile") {
            DeviceClass::Phone
        } else {
            DeviceClass::Tablet
        };
    }

    // Firefox OS and other generic handsets: "(Mobile; rv:48.0)"
    if ua.comment_contains("Mobile") || lower.contains("mobi") {
        return DeviceClass::Phone;
    }

    if ua.comment_contains("Windows")
        || ua.comment_contains("Macintosh")
        || ua.comment_contains("X11")
        || ua.comment_contains("CrOS")
        || ua.comment_contains("Linux")
    {
        return DeviceClass::Computer;
    }

    DeviceClass::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(raw: &str) -> DeviceClass {
        detect_device(&UserAgent::parse(raw))
    }

    #[test]
    fn test_phones() {
        assert_eq!(
            device("Mozilla/5.0 (iPhone; CPU iPhone OS 13_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) FxiOS/20.2 Mobile/15E148 Safari/605.1.15"),
            DeviceClass::Phone
        );
        assert_eq!(
            device("Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.91 Mobile Safari/537.36"),
            DeviceClass::Phone
        );
        assert_eq!(
            device("Opera/9.80 (SpreadTrum; Opera Mini/4.4.33961/163.67; U; en) Presto/2.12.423 Version/12.16"),
            DeviceClass::Phone
        );
        assert!(DeviceClass::Phone.is_mobile());
    }

    #[test]
    fn test_tablets_are_not_mobile() {
        let ipad = device("Mozilla/5.0 (iPad; CPU OS 12_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.1 Mobile/15E148 Safari/604.1");
        assert_eq!(ipad, DeviceClass::Tablet);
        assert!(!ipad.is_mobile());

        let android_tab = device("Mozilla/5.0 (Linux; Android 9; SM-T820) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.152 Safari/537.36");
        assert_eq!(android_tab, DeviceClass::Tablet);
    }

    #[test]
    fn test_computers_and_others() {
        assert_eq!(
            device("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"),
            DeviceClass::Computer
        );
        assert_eq!(
            device("Mozilla/5.0 (X11; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0"),
            DeviceClass::Computer
        );
        assert_eq!(
            device("Mozilla/5.0 (PlayStation 4 3.11) AppleWebKit/537.73 (KHTML, like Gecko)"),
            DeviceClass::Console
        );
        assert_eq!(device("garbage"), DeviceClass::Unknown);
    }
}
