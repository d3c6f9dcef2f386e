//! Replacement committer
//!
//! Delete-then-insert over the window's days, then checkpoint advance. Not a
//! single transaction: if the insert fails after the delete, the window's
//! days stay empty until the next run recomputes them from raw hits. Callers
//! must hold the site's run lock (see `pipeline::scheduler::SiteLocks`).

use super::error::RollupError;
use super::store_backend::{AggregateStore, SiteStore};
use super::types::{AggregateRow, SiteId};
use super::window::Window;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    pub deleted: usize,
    pub inserted: usize,
    /// False when the checkpoint write failed; the next run redoes this window
    pub checkpoint_advanced: bool,
}

pub struct ReplacementCommitter<'a> {
    aggregates: &'a dyn AggregateStore,
    sites: &'a dyn SiteStore,
}

impl<'a> ReplacementCommitter<'a> {
    pub fn new(aggregates: &'a dyn AggregateStore, sites: &'a dyn SiteStore) -> Self {
        Self { aggregates, sites }
    }

    pub async fn commit(
        &self,
        site: SiteId,
        window: &Window,
        rows: &[AggregateRow],
    ) -> Result<CommitOutcome, RollupError> {
        let deleted = self
            .aggregates
            .delete_from(site, window.first_day())
            .await
            .map_err(|source| RollupError::Delete { site, source })?;

        let inserted = self
            .aggregates
            .insert_rows(site, rows)
            .await
            .map_err(|source| {
                log::warn!(
                    "⚠️  Site {}: insert failed after deleting {} rows; days from {} empty until next run",
                    site,
                    deleted,
                    window.first_day()
                );
                RollupError::Insert { site, source }
            })?;

        let checkpoint_advanced = match self.sites.set_checkpoint(site, window.end).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "⚠️  Site {}: checkpoint not advanced ({}), window will be recomputed",
                    site,
                    e
                );
                false
            }
        };

        Ok(CommitOutcome {
            deleted,
            inserted,
            checkpoint_advanced,
        })
    }
}
