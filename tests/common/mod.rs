//! In-memory stores for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use browserstat::rollup_core::{
    AggregateRow, AggregateStore, EventStore, HourlyCount, Site, SiteId, SiteStore, StoreError,
    Window,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CHROME_91: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const FIREFOX_89: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0";
pub const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Mobile/15E148 Safari/604.1";
pub const GOOGLEBOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

pub fn ts(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, min, 0).unwrap()
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

type StatKey = (SiteId, NaiveDate, String, String);

/// Hits, stats and sites behind the three store traits
#[derive(Default)]
pub struct MemoryStore {
    hits: Mutex<Vec<(SiteId, String, DateTime<Utc>)>>,
    stats: Mutex<BTreeMap<StatKey, (i64, bool)>>,
    sites: Mutex<BTreeMap<SiteId, Option<DateTime<Utc>>>>,
    fail_read_for: Mutex<HashSet<SiteId>>,
    pub fail_insert: AtomicBool,
    pub fail_checkpoint: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_site(&self, site: SiteId) {
        self.sites.lock().unwrap().insert(site, None);
    }

    pub fn hit(&self, site: SiteId, browser: &str, at: DateTime<Utc>) {
        self.hits.lock().unwrap().push((site, browser.to_string(), at));
    }

    pub fn fail_reads(&self, site: SiteId, fail: bool) {
        let mut set = self.fail_read_for.lock().unwrap();
        if fail {
            set.insert(site);
        } else {
            set.remove(&site);
        }
    }

    pub fn seed_stat(&self, site: SiteId, day: NaiveDate, browser: &str, version: &str, count: i64) {
        self.stats.lock().unwrap().insert(
            (site, day, browser.to_string(), version.to_string()),
            (count, false),
        );
    }

    /// (day, browser, version, count, mobile) for one site, in key order
    pub fn stats(&self, site: SiteId) -> Vec<(NaiveDate, String, String, i64, bool)> {
        self.stats
            .lock()
            .unwrap()
            .iter()
            .filter(|((s, ..), _)| *s == site)
            .map(|((_, d, b, v), (c, m))| (*d, b.clone(), v.clone(), *c, *m))
            .collect()
    }

    pub fn total(&self, site: SiteId) -> i64 {
        self.stats(site).iter().map(|row| row.3).sum()
    }

    pub fn checkpoint(&self, site: SiteId) -> Option<DateTime<Utc>> {
        self.sites.lock().unwrap().get(&site).copied().flatten()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn hourly_counts(&self, site: SiteId, window: &Window) -> Result<Vec<HourlyCount>, StoreError> {
        if self.fail_read_for.lock().unwrap().contains(&site) {
            return Err(StoreError::InvalidData("event store unavailable".into()));
        }

        let mut grouped: BTreeMap<(i64, String), i64> = BTreeMap::new();
        for (s, browser, at) in self.hits.lock().unwrap().iter() {
            if *s == site && window.contains(*at) {
                let hour = at.timestamp() / 3600 * 3600;
                *grouped.entry((hour, browser.clone())).or_default() += 1;
            }
        }

        Ok(grouped
            .into_iter()
            .map(|((hour, browser), count)| HourlyCount {
                browser,
                count,
                hour: DateTime::from_timestamp(hour, 0).unwrap(),
            })
            .collect())
    }
}

#[async_trait]
impl AggregateStore for MemoryStore {
    async fn delete_from(&self, site: SiteId, from: NaiveDate) -> Result<usize, StoreError> {
        let mut stats = self.stats.lock().unwrap();
        let before = stats.len();
        stats.retain(|(s, d, ..), _| !(*s == site && *d >= from));
        Ok(before - stats.len())
    }

    async fn insert_rows(&self, site: SiteId, rows: &[AggregateRow]) -> Result<usize, StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::InvalidData("insert rejected".into()));
        }

        let mut stats = self.stats.lock().unwrap();
        let mut staged = Vec::with_capacity(rows.len());
        let mut seen = HashSet::new();
        for row in rows {
            let key = (site, row.day, row.browser.clone(), row.version.clone());
            if stats.contains_key(&key) || !seen.insert(key.clone()) {
                return Err(StoreError::Constraint(format!("duplicate key {:?}", key)));
            }
            staged.push((key, (row.count, row.mobile)));
        }
        stats.extend(staged);
        Ok(rows.len())
    }
}

#[async_trait]
impl SiteStore for MemoryStore {
    async fn active_sites(&self) -> Result<Vec<Site>, StoreError> {
        Ok(self
            .sites
            .lock()
            .unwrap()
            .iter()
            .map(|(id, last)| Site {
                id: *id,
                code: format!("site-{}", id),
                last_stat: *last,
            })
            .collect())
    }

    async fn last_checkpoint(&self, site: SiteId) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.sites
            .lock()
            .unwrap()
            .get(&site)
            .copied()
            .ok_or_else(|| StoreError::InvalidData(format!("unknown site {}", site)))
    }

    async fn set_checkpoint(&self, site: SiteId, at: DateTime<Utc>) -> Result<(), StoreError> {
        if self.fail_checkpoint.load(Ordering::SeqCst) {
            return Err(StoreError::Lock);
        }
        self.sites.lock().unwrap().insert(site, Some(at));
        Ok(())
    }
}

/// Event store wrapper that sleeps inside every read and records peak concurrency
pub struct SlowEvents {
    pub inner: Arc<MemoryStore>,
    pub delay: Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub reads: AtomicUsize,
}

impl SlowEvents {
    pub fn new(inner: Arc<MemoryStore>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner,
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl EventStore for SlowEvents {
    async fn hourly_counts(&self, site: SiteId, window: &Window) -> Result<Vec<HourlyCount>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        let result = self.inner.hourly_counts(site, window).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
