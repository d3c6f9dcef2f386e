//! Incremental per-site browser statistics.
//!
//! Raw page hits carry a user-agent string; this crate classifies them into
//! browser family, version and mobile flag, and maintains a daily
//! `browser_stats` table per site by re-aggregating everything since the
//! site's last checkpoint.

pub mod classifier;
pub mod pipeline;
pub mod rollup_core;
pub mod sqlite_pragma;

pub use classifier::{classify, Classification, Rejection};
pub use rollup_core::{RollupError, RollupJob, RunReport};
