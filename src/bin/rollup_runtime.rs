//! Rollup Runtime - browser_stats aggregation service
//!
//! This binary:
//! - Opens the SQLite database and applies the embedded schema
//! - Wires the hit reader and stat writer into a `RollupJob`
//! - Runs one tick and prints a JSON summary (`ROLLUP_RUN_ONCE=true`), or
//!   runs the scheduler until CTRL+C
//!
//! Usage:
//!   cargo run --release --bin rollup_runtime
//!
//! Environment variables:
//!   BROWSERSTAT_DB_PATH - SQLite database path (default: data/browserstat.db)
//!   ROLLUP_INTERVAL_MS - Delay between ticks (default: 300000)
//!   ROLLUP_MAX_CONCURRENT_SITES - Sites aggregated at once (default: 4)
//!   ROLLUP_RUN_ONCE - Single tick then exit (default: false)

use browserstat::pipeline::{rollup_scheduler_task, run_tick, RollupConfig, SiteLocks};
use browserstat::rollup_core::{RollupJob, SqliteHitReader, SqliteStatWriter};
use dotenv::dotenv;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("🚀 Browser Stats Rollup Runtime");

    let config = RollupConfig::from_env();
    config.validate()?;

    info!("   ├─ Database: {}", config.db_path);
    info!("   ├─ Interval: {}ms", config.interval_ms);
    info!("   ├─ Max concurrent sites: {}", config.max_concurrent_sites);
    info!("   └─ Run once: {}", config.run_once);

    // Writer first: it creates the file and schema the read-only reader expects
    info!("🔧 Initializing database...");
    let writer = Arc::new(SqliteStatWriter::new(&config.db_path)?);
    let reader = Arc::new(SqliteHitReader::new(&config.db_path)?);
    info!("✅ Database initialized");

    let job = RollupJob::new(reader, writer.clone(), writer);
    let locks = Arc::new(SiteLocks::new());

    if config.run_once {
        let summary = run_tick(&job, &locks, config.max_concurrent_sites, chrono::Utc::now()).await?;
        println!("{}", serde_json::to_string_pretty(&summary)?);

        info!(
            "✅ Rollup complete: {} ok, {} failed, {} skipped",
            summary.succeeded.len(),
            summary.failed.len(),
            summary.skipped.len()
        );
        if summary.failed.iter().any(|f| !f.retryable) {
            return Err("one or more sites failed with a non-retryable error".into());
        }
        return Ok(());
    }

    let scheduler = tokio::spawn(rollup_scheduler_task(
        job,
        locks,
        config.interval_ms,
        config.max_concurrent_sites,
    ));

    info!("🔄 Press CTRL+C to shutdown gracefully");

    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("");
            info!("⚠️  Received CTRL+C, shutting down...");
        }
        Err(err) => {
            error!("❌ Failed to listen for CTRL+C: {}", err);
        }
    }

    // An interrupted run leaves its checkpoint untouched and is redone on next start
    scheduler.abort();
    let _ = scheduler.await;

    info!("✅ Rollup runtime stopped");
    Ok(())
}
