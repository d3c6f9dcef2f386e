//! Storage backend traits for the rollup job
//!
//! Three seams, one per external store:
//! - `EventStore` - read-only hourly counts over raw hits
//! - `AggregateStore` - delete/insert of browser_stats rows
//! - `SiteStore` - active sites and their checkpoints

use super::types::{AggregateRow, HourlyCount, Site, SiteId};
use super::window::Window;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug)]
pub enum StoreError {
    Database(rusqlite::Error),
    /// Unique/foreign-key violation; rows were not what the schema allows
    Constraint(String),
    /// Connection mutex poisoned by a panicking holder
    Lock,
    InvalidData(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(msg.unwrap_or_else(|| e.to_string()))
            }
            other => StoreError::Database(other),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Constraint(msg) => write!(f, "Constraint violation: {}", msg),
            StoreError::Lock => write!(f, "Connection lock poisoned"),
            StoreError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

/// Raw hit store, read-only to this crate
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Hits grouped by raw user-agent and hour within the window's read bounds
    async fn hourly_counts(&self, site: SiteId, window: &Window) -> Result<Vec<HourlyCount>, StoreError>;
}

/// browser_stats store
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Delete every row for `site` with `day >= from`; returns rows deleted
    async fn delete_from(&self, site: SiteId, from: NaiveDate) -> Result<usize, StoreError>;

    /// Bulk insert; all rows or none
    async fn insert_rows(&self, site: SiteId, rows: &[AggregateRow]) -> Result<usize, StoreError>;
}

/// Tenant directory and checkpoint store
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Sites in the active state, ordered by id
    async fn active_sites(&self) -> Result<Vec<Site>, StoreError>;

    async fn last_checkpoint(&self, site: SiteId) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Last-writer-wins single field update
    async fn set_checkpoint(&self, site: SiteId, at: DateTime<Utc>) -> Result<(), StoreError>;
}
