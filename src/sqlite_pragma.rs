//! Shared SQLite PRAGMA setup for every connection the job opens

use rusqlite::Connection;
use std::time::Duration;

/// WAL, NORMAL sync, in-memory temp store, 256MB mmap, 64MB cache,
/// 1000-page autocheckpoint and a 5s busy timeout
pub fn apply_optimized_pragmas(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "mmap_size", 268_435_456i64)?;
    conn.pragma_update(None, "cache_size", -65_536i64)?;
    conn.pragma_update(None, "wal_autocheckpoint", 1000i64)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(())
}
