//! One browser-stats rollup run for one site
//!
//! checkpoint → window → hourly counts → aggregate → delete/insert → checkpoint

use super::aggregator::{aggregate, AggregateStats};
use super::committer::{CommitOutcome, ReplacementCommitter};
use super::error::RollupError;
use super::store_backend::{AggregateStore, EventStore, SiteStore};
use super::types::SiteId;
use super::window::Window;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub site: SiteId,
    pub window: Window,
    pub rows: usize,
    pub stats: AggregateStats,
    pub commit: CommitOutcome,
}

#[derive(Clone)]
pub struct RollupJob {
    events: Arc<dyn EventStore>,
    aggregates: Arc<dyn AggregateStore>,
    sites: Arc<dyn SiteStore>,
}

impl RollupJob {
    pub fn new(
        events: Arc<dyn EventStore>,
        aggregates: Arc<dyn AggregateStore>,
        sites: Arc<dyn SiteStore>,
    ) -> Self {
        Self {
            events,
            aggregates,
            sites,
        }
    }

    pub fn sites(&self) -> &Arc<dyn SiteStore> {
        &self.sites
    }

    /// Run the rollup for `site` as of `now`
    ///
    /// Every failure leaves the checkpoint where it was, so the next call
    /// recomputes the same window.
    pub async fn run(&self, site: SiteId, now: DateTime<Utc>) -> Result<RunReport, RollupError> {
        let last = self
            .sites
            .last_checkpoint(site)
            .await
            .map_err(|source| RollupError::Checkpoint { site, source })?;

        let window = Window::select(last, now);

        let buckets = self
            .events
            .hourly_counts(site, &window)
            .await
            .map_err(|source| RollupError::Read { site, source })?;

        let (rows, stats) = aggregate(site, &buckets);
        drop(buckets);

        let committer = ReplacementCommitter::new(self.aggregates.as_ref(), self.sites.as_ref());
        let commit = committer.commit(site, &window, &rows).await?;

        log::debug!(
            "📊 Site {}: {} rows from {} hits ({} rejected) for days >= {}",
            site,
            rows.len(),
            stats.accepted_hits,
            stats.rejected_hits(),
            window.first_day()
        );

        Ok(RunReport {
            site,
            window,
            rows: rows.len(),
            stats,
            commit,
        })
    }
}
