//! Persistent SQLite store.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{poisoned, CacheStore};
use crate::CachedHashResult;

/// A raw row of the `cache_entries` table.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub key: String,
    pub value_json: String,
    pub stored_at: DateTime<Utc>,
}

/// SQLite-backed store. Values are stored as JSON.
pub struct SqliteStore<T> {
    conn: Mutex<Connection>,
    _value: PhantomData<fn() -> T>,
}

impl<T> SqliteStore<T> {
    /// Opens or creates the database at `db_path`.
    ///
    /// Missing parent directories are created.
    pub fn open(db_path: &Path) -> CachedHashResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(db_path)?)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> CachedHashResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> CachedHashResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                cache_key TEXT PRIMARY KEY,
                value_json TEXT NOT NULL,
                stored_at TEXT NOT NULL
            );
        "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            _value: PhantomData,
        })
    }

    /// Number of stored entries.
    pub fn len(&self) -> CachedHashResult<usize> {
        let conn = self.conn.lock().map_err(poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> CachedHashResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Lists every entry, most recent first.
    pub fn entries(&self) -> CachedHashResult<Vec<StoredEntry>> {
        let conn = self.conn.lock().map_err(poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT cache_key, value_json, stored_at FROM cache_entries
             ORDER BY stored_at DESC, cache_key ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let stored_at: String = row.get(2)?;
            Ok(StoredEntry {
                key: row.get(0)?,
                value_json: row.get(1)?,
                stored_at: DateTime::parse_from_rfc3339(&stored_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                    })?,
            })
        })?;

        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

impl<T: Serialize + DeserializeOwned> CacheStore<T> for SqliteStore<T> {
    fn get(&self, key: &str) -> CachedHashResult<Option<T>> {
        let conn = self.conn.lock().map_err(poisoned)?;
        let value_json: Option<String> = conn
            .query_row(
                "SELECT value_json FROM cache_entries WHERE cache_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match value_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: T) -> CachedHashResult<()> {
        let value_json = serde_json::to_string(&value)?;
        let conn = self.conn.lock().map_err(poisoned)?;
        conn.execute(
            "INSERT INTO cache_entries (cache_key, value_json, stored_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(cache_key) DO UPDATE SET
                value_json = excluded.value_json,
                stored_at = excluded.stored_at",
            params![key, value_json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> CachedHashResult<()> {
        let conn = self.conn.lock().map_err(poisoned)?;
        conn.execute(
            "DELETE FROM cache_entries WHERE cache_key = ?1",
            params![key],
        )?;
        Ok(())
    }
}
