//! # Rollup Pipeline
//!
//! Runtime plumbing around `rollup_core`:
//! - `config` - environment configuration
//! - `db` - database open, pragmas and embedded schema migrations
//! - `scheduler` - interval loop, per-site locks and bounded concurrency

pub mod config;
pub mod db;
pub mod scheduler;

pub use config::{ConfigError, RollupConfig};
pub use db::{open_database, run_schema_migrations};
pub use scheduler::{rollup_scheduler_task, run_site, run_tick, SiteLocks, SiteFailure, TickSummary};
