//! SQLite-backed local storage.
//!
//! Provides persistent storage for:
//! - Key-value blobs holding the serialized engine state
//! - A log of completed focus/break sessions

use std::path::Path;

use chrono::{DateTime, Local, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::timer::SessionKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub kind: SessionKind,
    pub task_id: Option<String>,
    pub duration_secs: u64,
    pub completed_at: DateTime<Utc>,
}

/// SQLite database for local state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/studymeow/studymeow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studymeow.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                kind          TEXT NOT NULL,
                task_id       TEXT,
                duration_secs INTEGER NOT NULL,
                completed_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Record a completed session.
    pub fn record_session(
        &self,
        kind: SessionKind,
        task_id: Option<&str>,
        duration_secs: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<i64> {
        let kind_str = match kind {
            SessionKind::Focus => "focus",
            SessionKind::Break => "break",
        };
        self.conn.execute(
            "INSERT INTO sessions (kind, task_id, duration_secs, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![kind_str, task_id, duration_secs, completed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, task_id, duration_secs, completed_at
             FROM sessions ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, kind, task_id, duration_secs, completed_at) = row?;
            let kind = if kind == "break" {
                SessionKind::Break
            } else {
                SessionKind::Focus
            };
            let Ok(completed_at) = DateTime::parse_from_rfc3339(&completed_at) else {
                tracing::warn!(id, "skipping session with unreadable timestamp");
                continue;
            };
            records.push(SessionRecord {
                id,
                kind,
                task_id,
                duration_secs,
                completed_at: completed_at.with_timezone(&Utc),
            });
        }
        Ok(records)
    }

    /// Focus minutes completed on the current local day.
    pub fn today_focus_minutes(&self) -> Result<u64> {
        let today = Local::now().date_naive();
        let secs: u64 = self
            .sessions()?
            .into_iter()
            .filter(|s| s.kind == SessionKind::Focus)
            .filter(|s| s.completed_at.with_timezone(&Local).date_naive() == today)
            .map(|s| s.duration_secs)
            .sum();
        Ok(secs / 60)
    }
}
