//! SQLite writer for browser_stats rows and site checkpoints

use super::store_backend::{AggregateStore, SiteStore, StoreError};
use super::types::{format_day, from_unix, AggregateRow, Site, SiteId, STATE_ACTIVE};
use crate::pipeline::db::open_database;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteStatWriter {
    conn: Mutex<Connection>,
}

impl SqliteStatWriter {
    /// Open the database read-write, creating directories and schema as needed
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = open_database(db_path)?;

        log::info!("✅ SQLite stat writer initialized with WAL mode");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Lock)
    }

    pub fn delete_days_from(&self, site: SiteId, from: NaiveDate) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM browser_stats WHERE site = ?1 AND day >= ?2",
            params![site, format_day(from)],
        )?;
        Ok(deleted)
    }

    /// Insert all rows in one transaction
    pub fn insert_batch(&self, site: SiteId, rows: &[AggregateRow]) -> Result<usize, StoreError> {
        if let Some(row) = rows.iter().find(|r| r.site != site) {
            return Err(StoreError::InvalidData(format!(
                "row for site {} in batch for site {}",
                row.site, site
            )));
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO browser_stats (site, day, browser, version, count, mobile)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.site,
                    format_day(row.day),
                    row.browser,
                    row.version,
                    row.count,
                    row.mobile,
                ])?;
            }
        }
        tx.commit()?;

        log::debug!("✅ Inserted {} browser_stats rows for site {}", rows.len(), site);
        Ok(rows.len())
    }

    pub fn load_sites(&self) -> Result<Vec<Site>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, code, last_stat FROM sites WHERE state = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([STATE_ACTIVE], |row| {
            Ok((
                row.get::<_, SiteId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
            ))
        })?;

        let mut sites = Vec::new();
        for row in rows {
            let (id, code, last_stat) = row?;
            sites.push(Site {
                id,
                code,
                last_stat: decode_checkpoint(id, last_stat)?,
            });
        }
        Ok(sites)
    }

    pub fn read_checkpoint(&self, site: SiteId) -> Result<Option<DateTime<Utc>>, StoreError> {
        let conn = self.lock()?;
        let last_stat: Option<Option<i64>> = conn
            .query_row(
                "SELECT last_stat FROM sites WHERE id = ?1",
                [site],
                |row| row.get(0),
            )
            .optional()?;

        match last_stat {
            Some(secs) => decode_checkpoint(site, secs),
            None => Err(StoreError::InvalidData(format!("unknown site {}", site))),
        }
    }

    pub fn write_checkpoint(&self, site: SiteId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE sites SET last_stat = ?1 WHERE id = ?2",
            params![at.timestamp(), site],
        )?;
        if updated == 0 {
            return Err(StoreError::InvalidData(format!("unknown site {}", site)));
        }
        Ok(())
    }
}

fn decode_checkpoint(site: SiteId, secs: Option<i64>) -> Result<Option<DateTime<Utc>>, StoreError> {
    secs.map(|s| {
        from_unix(s).ok_or_else(|| {
            StoreError::InvalidData(format!("site {} has out-of-range last_stat {}", site, s))
        })
    })
    .transpose()
}

#[async_trait]
impl AggregateStore for SqliteStatWriter {
    async fn delete_from(&self, site: SiteId, from: NaiveDate) -> Result<usize, StoreError> {
        self.delete_days_from(site, from)
    }

    async fn insert_rows(&self, site: SiteId, rows: &[AggregateRow]) -> Result<usize, StoreError> {
        self.insert_batch(site, rows)
    }
}

#[async_trait]
impl SiteStore for SqliteStatWriter {
    async fn active_sites(&self) -> Result<Vec<Site>, StoreError> {
        self.load_sites()
    }

    async fn last_checkpoint(&self, site: SiteId) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.read_checkpoint(site)
    }

    async fn set_checkpoint(&self, site: SiteId, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.write_checkpoint(site, at)
    }
}
