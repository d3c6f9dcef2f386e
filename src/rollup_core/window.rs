//! Re-openable rollup window selection
//!
//! A run covers `[start, end)` where `start` is the site's checkpoint and
//! `end` the invocation time. Stats rows are per day, so the run re-reads and
//! replaces the checkpoint's whole day: reads begin at midnight of
//! `first_day()` and the committer deletes `day >= first_day()`.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Epoch sentinel used when a site has never been aggregated
    pub fn epoch() -> DateTime<Utc> {
        DateTime::UNIX_EPOCH
    }

    /// Select the window for a site; no side effects, same inputs give the same window
    pub fn select(last_checkpoint: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        // Whole seconds so the read bound and the stored checkpoint agree
        let end = Utc
            .timestamp_opt(now.timestamp(), 0)
            .single()
            .unwrap_or(now);
        let start = last_checkpoint.unwrap_or_else(Self::epoch);

        if start > end {
            log::warn!(
                "⚠️  Checkpoint {} is ahead of clock {}, re-reading its day only",
                start,
                end
            );
        }

        Self { start, end }
    }

    /// First calendar day whose stats this window replaces
    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Inclusive lower read bound: midnight UTC of `first_day()`
    pub fn read_from(&self) -> DateTime<Utc> {
        self.first_day().and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Exclusive upper read bound
    pub fn read_until(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.read_from() && ts < self.read_until()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_no_checkpoint_starts_at_epoch() {
        let now = ts(2024, 1, 1, 12, 0);
        let window = Window::select(None, now);

        assert_eq!(window.start, Window::epoch());
        assert_eq!(window.first_day(), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(window.end, now);
    }

    #[test]
    fn test_select_is_reentrant() {
        let now = ts(2024, 1, 2, 3, 4);
        let last = Some(ts(2024, 1, 1, 10, 30));

        assert_eq!(Window::select(last, now), Window::select(last, now));
    }

    #[test]
    fn test_end_truncated_to_seconds() {
        let now = ts(2024, 1, 1, 12, 0) + chrono::Duration::milliseconds(750);
        let window = Window::select(None, now);
        assert_eq!(window.end, ts(2024, 1, 1, 12, 0));
    }

    #[test]
    fn test_read_bounds() {
        let window = Window::select(Some(ts(2024, 1, 1, 10, 30)), ts(2024, 1, 2, 8, 0));

        assert_eq!(window.read_from(), ts(2024, 1, 1, 0, 0));
        assert!(window.contains(ts(2024, 1, 1, 10, 30)));
        assert!(window.contains(ts(2024, 1, 1, 0, 0)));
        assert!(!window.contains(ts(2023, 12, 31, 23, 59)));
        assert!(!window.contains(ts(2024, 1, 2, 8, 0)));
    }

    #[test]
    fn test_checkpoint_ahead_of_clock() {
        let last = ts(2024, 1, 3, 9, 0);
        let now = ts(2024, 1, 3, 8, 0);
        let window = Window::select(Some(last), now);

        assert!(window.start > window.end);
        assert_eq!(window.first_day(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(window.read_from(), ts(2024, 1, 3, 0, 0));
        assert_eq!(window.read_until(), now);
        assert!(window.contains(ts(2024, 1, 3, 7, 59)));
        assert!(!window.contains(ts(2024, 1, 3, 8, 30)));
    }

    #[test]
    fn test_consecutive_windows_tile() {
        let first = Window::select(None, ts(2024, 1, 1, 11, 0));
        let second = Window::select(Some(first.end), ts(2024, 1, 1, 12, 0));

        // The boundary instant belongs to the second window only
        let boundary = first.end;
        assert!(!first.contains(boundary));
        assert!(second.contains(boundary));
        assert_eq!(second.first_day(), first.end.date_naive());
    }
}
