//! Database bootstrap: embedded schema migrations
//!
//! Schema files live in `/sql/` and are compiled into the binary so the job
//! never depends on its working directory. All statements use
//! `IF NOT EXISTS` and are safe to re-run on every start.

use crate::sqlite_pragma::apply_optimized_pragmas;
use rusqlite::Connection;
use std::path::Path;

/// Schema files in execution order
pub const SCHEMA_FILES: &[(&str, &str)] = &[
    ("00_sites.sql", include_str!("../../sql/00_sites.sql")),
    ("01_hits.sql", include_str!("../../sql/01_hits.sql")),
    ("02_browser_stats.sql", include_str!("../../sql/02_browser_stats.sql")),
];

/// Run schema migrations
///
/// Idempotent; executes every embedded schema file in order and stops at the
/// first failure.
pub fn run_schema_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    log::info!("🔧 Running schema migrations ({} files)", SCHEMA_FILES.len());

    for (filename, sql) in SCHEMA_FILES {
        log::debug!("   ├─ Executing: {}", filename);
        conn.execute_batch(sql)?;
    }

    log::info!("✅ All schema migrations completed successfully");
    Ok(())
}

/// Open (creating parent directories) a read-write connection with pragmas and schema applied
pub fn open_database(db_path: impl AsRef<Path>) -> Result<Connection, Box<dyn std::error::Error>> {
    if let Some(parent) = db_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                format!("Failed to create database directory {}: {}", parent.display(), e)
            })?;
        }
    }

    let conn = Connection::open(db_path)?;
    apply_optimized_pragmas(&conn)?;
    run_schema_migrations(&conn)?;
    Ok(conn)
}
