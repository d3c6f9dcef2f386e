//! Rollup Core - Incremental Browser Stats Aggregation
//!
//! Re-aggregates raw hits into daily `browser_stats` rows for one site at a
//! time. Each run reopens the window since the site's last checkpoint and
//! replaces every stats row inside it, so re-running over unchanged hits
//! reproduces identical rows.
//!
//! # Architecture
//!
//! ```text
//! SiteStore (last_stat) → Window::select
//!     ↓
//! SqliteHitReader (hits grouped by user-agent + hour)
//!     ↓
//! BrowserAggregator (classifier + (day, browser, version) grouping)
//!     ↓
//! ReplacementCommitter (delete day >= window → bulk insert → advance last_stat)
//! ```

pub mod aggregator;
pub mod committer;
pub mod error;
pub mod job;
pub mod sqlite_reader;
pub mod sqlite_writer;
pub mod store_backend;
pub mod types;
pub mod window;

pub use aggregator::{aggregate, AggregateStats, BrowserAggregator};
pub use committer::{CommitOutcome, ReplacementCommitter};
pub use error::RollupError;
pub use job::{RollupJob, RunReport};
pub use sqlite_reader::SqliteHitReader;
pub use sqlite_writer::SqliteStatWriter;
pub use store_backend::{AggregateStore, EventStore, SiteStore, StoreError};
pub use types::{AggregateRow, HourlyCount, Site, SiteId};
pub use window::Window;
