//! Browser stats reducer
//!
//! Folds hour-bucketed user-agent counts into one row per
//! `(day, browser, version)`. Memory is bounded by the number of distinct
//! user-agents and groups, never by the number of raw hits.

use super::types::{AggregateRow, HourlyCount, SiteId};
use crate::classifier::{classify, Classification, Rejection};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct GroupKey {
    day: NaiveDate,
    browser: &'static str,
    version: String,
}

#[derive(Debug, Clone, Copy)]
struct GroupTotals {
    count: i64,
    /// First contributing bucket wins; never recomputed
    mobile: bool,
}

/// Per-run reduction counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub buckets: usize,
    pub accepted_hits: i64,
    pub rejected_bot: i64,
    pub rejected_empty: i64,
    pub rejected_unrecognized: i64,
    pub distinct_user_agents: usize,
}

impl AggregateStats {
    pub fn rejected_hits(&self) -> i64 {
        self.rejected_bot + self.rejected_empty + self.rejected_unrecognized
    }

    fn record_rejection(&mut self, reason: Rejection, count: i64) {
        let slot = match reason {
            Rejection::Bot => &mut self.rejected_bot,
            Rejection::Empty => &mut self.rejected_empty,
            Rejection::Unrecognized => &mut self.rejected_unrecognized,
        };
        *slot = slot.saturating_add(count);
    }
}

/// In-memory grouping of classified hourly counts for one site
pub struct BrowserAggregator {
    site: SiteId,
    groups: HashMap<GroupKey, GroupTotals>,
    classified: HashMap<String, Result<Classification, Rejection>>,
    stats: AggregateStats,
}

impl BrowserAggregator {
    pub fn new(site: SiteId) -> Self {
        Self {
            site,
            groups: HashMap::new(),
            classified: HashMap::new(),
            stats: AggregateStats::default(),
        }
    }

    pub fn add(&mut self, bucket: &HourlyCount) {
        self.stats.buckets += 1;

        let verdict = match self.classified.get(&bucket.browser) {
            Some(v) => v.clone(),
            None => {
                let v = classify(&bucket.browser);
                self.classified.insert(bucket.browser.clone(), v.clone());
                v
            }
        };

        let classification = match verdict {
            Ok(c) => c,
            Err(reason) => {
                self.stats.record_rejection(reason, bucket.count);
                return;
            }
        };

        let key = GroupKey {
            day: bucket.hour.date_naive(),
            browser: classification.browser(),
            version: classification.version,
        };

        let totals = self.groups.entry(key).or_insert(GroupTotals {
            count: 0,
            mobile: classification.mobile,
        });
        totals.count = totals.count.saturating_add(bucket.count);
        self.stats.accepted_hits = self.stats.accepted_hits.saturating_add(bucket.count);
    }

    pub fn extend<'a>(&mut self, buckets: impl IntoIterator<Item = &'a HourlyCount>) {
        for bucket in buckets {
            self.add(bucket);
        }
    }

    /// Rows sorted by `(day, browser, version)` plus run counters
    pub fn finish(mut self) -> (Vec<AggregateRow>, AggregateStats) {
        self.stats.distinct_user_agents = self.classified.len();

        let site = self.site;
        let mut rows: Vec<AggregateRow> = self
            .groups
            .into_iter()
            .map(|(key, totals)| AggregateRow {
                site,
                day: key.day,
                browser: key.browser.to_string(),
                version: key.version,
                count: totals.count,
                mobile: totals.mobile,
            })
            .collect();
        rows.sort();

        (rows, self.stats)
    }
}

/// Classify and group a full run's buckets in one call
pub fn aggregate<'a>(
    site: SiteId,
    buckets: impl IntoIterator<Item = &'a HourlyCount>,
) -> (Vec<AggregateRow>, AggregateStats) {
    let mut aggregator = BrowserAggregator::new(site);
    aggregator.extend(buckets);
    aggregator.finish()
}
