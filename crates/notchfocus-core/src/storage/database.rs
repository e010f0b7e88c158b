//! SQLite-backed storage for daily progress and application state.
//!
//! Two tables: `daily_progress` holds one row per calendar day of
//! completed focus work, and `kv` is a key-value store used for the
//! persisted session snapshot and update-prompt bookkeeping.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::StorageError;

/// One calendar day of recorded focus work. Rows are created on the first
/// completion of a day, updated in place afterwards, and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub day: NaiveDate,
    pub focus_min: u32,
    pub completed_sessions: u32,
}

/// SQLite database handle.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/notchfocus/notchfocus.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("notchfocus.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS daily_progress (
                    day                TEXT PRIMARY KEY,
                    focus_min          INTEGER NOT NULL DEFAULT 0,
                    completed_sessions INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Add a completed focus session to the given day's record, creating
    /// the row on the first completion of that day.
    pub fn add_daily_progress(
        &self,
        day: NaiveDate,
        focus_min: u32,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO daily_progress (day, focus_min, completed_sessions)
             VALUES (?1, ?2, 1)
             ON CONFLICT(day) DO UPDATE SET
                focus_min = focus_min + excluded.focus_min,
                completed_sessions = completed_sessions + 1",
            params![day.format("%Y-%m-%d").to_string(), focus_min],
        )?;
        Ok(())
    }

    /// All daily records, newest first.
    pub fn daily_records(&self) -> Result<Vec<ProgressRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT day, focus_min, completed_sessions
             FROM daily_progress
             ORDER BY day DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (day, focus_min, completed_sessions) = row?;
            let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|e| StorageError::QueryFailed(format!("bad day '{day}': {e}")))?;
            records.push(ProgressRecord {
                day,
                focus_min,
                completed_sessions,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn kv_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.kv_get("missing").unwrap(), None);
        db.kv_set("session", "{}").unwrap();
        assert_eq!(db.kv_get("session").unwrap().as_deref(), Some("{}"));
        db.kv_set("session", "{\"a\":1}").unwrap();
        assert_eq!(db.kv_get("session").unwrap().as_deref(), Some("{\"a\":1}"));
        db.kv_delete("session").unwrap();
        assert_eq!(db.kv_get("session").unwrap(), None);
    }

    #[test]
    fn first_completion_creates_row() {
        let db = Database::open_memory().unwrap();
        db.add_daily_progress(day("2026-08-07"), 25).unwrap();
        let records = db.daily_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].focus_min, 25);
        assert_eq!(records[0].completed_sessions, 1);
    }

    #[test]
    fn later_completions_update_in_place() {
        let db = Database::open_memory().unwrap();
        db.add_daily_progress(day("2026-08-07"), 25).unwrap();
        db.add_daily_progress(day("2026-08-07"), 50).unwrap();
        let records = db.daily_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].focus_min, 75);
        assert_eq!(records[0].completed_sessions, 2);
    }

    #[test]
    fn records_are_newest_first() {
        let db = Database::open_memory().unwrap();
        db.add_daily_progress(day("2026-08-05"), 25).unwrap();
        db.add_daily_progress(day("2026-08-07"), 25).unwrap();
        db.add_daily_progress(day("2026-08-06"), 25).unwrap();
        let days: Vec<_> = db
            .daily_records()
            .unwrap()
            .into_iter()
            .map(|r| r.day)
            .collect();
        assert_eq!(days, vec![day("2026-08-07"), day("2026-08-06"), day("2026-08-05")]);
    }
}
