//! Core data types shared by the reader, aggregator and committer

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub type SiteId = i64;

/// Site state column values
pub const STATE_ACTIVE: &str = "a";
pub const STATE_REQUEST: &str = "r";
pub const STATE_DELETED: &str = "d";

/// Tenant owning hits and browser stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    pub id: SiteId,
    pub code: String,
    /// Exclusive end of the last fully committed window (`None` = never ran)
    pub last_stat: Option<DateTime<Utc>>,
}

/// Pre-counted group of identical user-agents within one hour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyCount {
    pub browser: String,
    pub count: i64,
    /// `created_at` truncated to the hour
    pub hour: DateTime<Utc>,
}

/// Persisted `browser_stats` row
///
/// Unique per `(site, day, browser, version)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AggregateRow {
    pub site: SiteId,
    pub day: NaiveDate,
    pub browser: String,
    pub version: String,
    pub count: i64,
    pub mobile: bool,
}

/// Days are stored as `YYYY-MM-DD` text
pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Unix seconds to UTC, `None` when out of chrono's range
pub fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_round_trip_format() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_day(day), "2024-01-01");
        assert_eq!(parse_day("2024-01-01"), Some(day));
        assert_eq!(parse_day("2024-13-01"), None);
    }

    #[test]
    fn test_from_unix() {
        assert_eq!(from_unix(0), Some(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(from_unix(i64::MAX), None);
    }
}
