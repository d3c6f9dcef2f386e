//! Rollup scheduler
//!
//! Fires the rollup job for every active site on a fixed interval. A site is
//! never aggregated by two runs at once: each run holds that site's entry in
//! `SiteLocks`, and a site still busy from an earlier tick is skipped.

use crate::rollup_core::{RollupError, RollupJob, RunReport, SiteId, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedMutexGuard, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Per-site run locks
#[derive(Default)]
pub struct SiteLocks {
    locks: Mutex<HashMap<SiteId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SiteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, site: SiteId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(site).or_default().clone()
    }

    /// Take the site's lock if no other run holds it
    pub fn try_acquire(&self, site: SiteId) -> Option<OwnedMutexGuard<()>> {
        self.entry(site).try_lock_owned().ok()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteFailure {
    pub site: SiteId,
    pub error: String,
    pub retryable: bool,
}

/// Outcome of one scheduler tick
#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    pub started_at: DateTime<Utc>,
    pub sites: usize,
    pub succeeded: Vec<RunReport>,
    /// Sites still held by a run from an earlier tick
    pub skipped: Vec<SiteId>,
    pub failed: Vec<SiteFailure>,
}

/// Run the job for `site` while holding its lock
///
/// Returns `Ok(None)` without touching storage when another run holds the site.
pub async fn run_site(
    job: &RollupJob,
    locks: &SiteLocks,
    site: SiteId,
    now: DateTime<Utc>,
) -> Result<Option<RunReport>, RollupError> {
    let Some(_guard) = locks.try_acquire(site) else {
        log::warn!("⏭️  Site {} still running, skipping", site);
        return Ok(None);
    };
    job.run(site, now).await.map(Some)
}

/// One pass over every active site, at most `max_concurrent` at a time
///
/// Only listing the sites can fail the tick; per-site failures are logged and
/// collected so the remaining sites still run.
pub async fn run_tick(
    job: &RollupJob,
    locks: &Arc<SiteLocks>,
    max_concurrent: usize,
    now: DateTime<Utc>,
) -> Result<TickSummary, StoreError> {
    let sites = job.sites().active_sites().await?;

    let mut summary = TickSummary {
        started_at: now,
        sites: sites.len(),
        succeeded: Vec::new(),
        skipped: Vec::new(),
        failed: Vec::new(),
    };

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();
    let mut pending = HashSet::new();

    for site in sites {
        let Some(guard) = locks.try_acquire(site.id) else {
            log::warn!("⏭️  Site {} ({}) still running, skipping", site.id, site.code);
            summary.skipped.push(site.id);
            continue;
        };

        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        pending.insert(site.id);
        let job = job.clone();
        tasks.spawn(async move {
            let result = job.run(site.id, now).await;
            drop(guard);
            drop(permit);
            (site.id, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((site, Ok(report))) => {
                pending.remove(&site);
                if !report.commit.checkpoint_advanced {
                    log::warn!("⚠️  Site {} committed but checkpoint unchanged", report.site);
                }
                summary.succeeded.push(report);
            }
            Ok((site, Err(e))) => {
                pending.remove(&site);
                let retryable = e.is_retryable();
                if retryable {
                    log::error!("❌ Site {} rollup failed, will retry next tick: {}", site, e);
                } else {
                    log::error!("❌ Site {} rollup failed permanently: {}", site, e);
                }
                summary.failed.push(SiteFailure {
                    site,
                    error: e.to_string(),
                    retryable,
                });
            }
            Err(e) => {
                log::error!("❌ Rollup task panicked: {}", e);
            }
        }
    }

    // A panicked task never reports its site; it still counts as failed
    for site in pending {
        summary.failed.push(SiteFailure {
            site,
            error: "rollup task panicked".to_string(),
            retryable: true,
        });
    }

    summary.succeeded.sort_by_key(|r| r.site);
    summary.failed.sort_by_key(|f| f.site);

    Ok(summary)
}

/// Rollup scheduler task - periodically aggregate every active site
///
/// Arguments:
/// - `job`: Rollup job wired to the stores
/// - `locks`: Per-site run locks, shared with any ad hoc runs
/// - `interval_ms`: Delay between ticks in milliseconds
/// - `max_concurrent`: Sites aggregated concurrently within a tick
///
/// This function runs indefinitely until cancelled.
pub async fn rollup_scheduler_task(
    job: RollupJob,
    locks: Arc<SiteLocks>,
    interval_ms: u64,
    max_concurrent: usize,
) {
    log::info!(
        "⏰ Starting rollup scheduler (interval: {}ms, concurrency: {})",
        interval_ms,
        max_concurrent
    );

    let mut timer = interval(Duration::from_millis(interval_ms));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;

        match run_tick(&job, &locks, max_concurrent, Utc::now()).await {
            Ok(summary) => {
                if summary.sites == 0 {
                    continue;
                }
                let rows: usize = summary.succeeded.iter().map(|r| r.rows).sum();
                log::info!(
                    "✅ Rollup tick: {} sites, {} ok, {} failed, {} skipped, {} rows",
                    summary.sites,
                    summary.succeeded.len(),
                    summary.failed.len(),
                    summary.skipped.len(),
                    rows
                );
            }
            Err(e) => {
                log::error!("❌ Rollup tick failed to list sites: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_site_lock_is_exclusive() {
        let locks = SiteLocks::new();

        let guard = locks.try_acquire(1).unwrap();
        assert!(locks.try_acquire(1).is_none());
        assert!(locks.try_acquire(2).is_some(), "other sites are independent");

        drop(guard);
        assert!(locks.try_acquire(1).is_some());
    }
}
