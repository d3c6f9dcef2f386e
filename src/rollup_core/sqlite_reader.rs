//! SQLite hit reader with hour-bucketed pre-counting
//!
//! Groups raw hits by user-agent and hour inside the database so the
//! aggregator sees one row per distinct (browser, hour) instead of one row
//! per hit.

use super::store_backend::{EventStore, StoreError};
use super::types::{from_unix, HourlyCount, SiteId};
use super::window::Window;
use crate::sqlite_pragma::apply_optimized_pragmas;
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

const HOURLY_COUNTS_SQL: &str = "
    SELECT browser, COUNT(*) AS count, (created_at / 3600) * 3600 AS hour
    FROM hits
    WHERE site = ?1
      AND created_at >= ?2
      AND created_at < ?3
    GROUP BY browser, hour
    ORDER BY hour ASC, count DESC, browser ASC";

/// Read-only hit reader
pub struct SqliteHitReader {
    conn: Mutex<Connection>,
}

impl SqliteHitReader {
    /// Open a read-only connection; the schema must already exist
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;

        apply_optimized_pragmas(&conn)?;

        // Enable read-only mode to prevent write locks (must be after PRAGMAs)
        conn.execute("PRAGMA query_only = ON", [])?;

        log::info!("📥 SQLite hit reader initialized (read-only)");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Hour-bucketed counts for `[window.read_from(), window.read_until())`
    pub fn read_hourly(&self, site: SiteId, window: &Window) -> Result<Vec<HourlyCount>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;

        let mut stmt = conn.prepare_cached(HOURLY_COUNTS_SQL)?;
        let rows = stmt.query_map(
            params![
                site,
                window.read_from().timestamp(),
                window.read_until().timestamp()
            ],
            |row| {
                Ok((
                    browser_text(row.get_ref(0)?),
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;

        let mut counts = Vec::new();
        for row in rows {
            let (browser, count, hour) = row?;
            let hour = from_unix(hour)
                .ok_or_else(|| StoreError::InvalidData(format!("hour bucket out of range: {}", hour)))?;
            counts.push(HourlyCount { browser, count, hour });
        }

        log::debug!(
            "📥 Site {}: read {} hourly buckets in [{}, {})",
            site,
            counts.len(),
            window.read_from(),
            window.read_until()
        );

        Ok(counts)
    }
}

/// User-agent column as text; bytes that are not UTF-8 are replaced, never rejected here
fn browser_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Null => String::new(),
    }
}

#[async_trait]
impl EventStore for SqliteHitReader {
    async fn hourly_counts(&self, site: SiteId, window: &Window) -> Result<Vec<HourlyCount>, StoreError> {
        self.read_hourly(site, window)
    }
}
