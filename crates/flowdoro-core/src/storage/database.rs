//! SQLite-based session history and state storage.
//!
//! Provides persistent storage for:
//! - Completed sessions (with their flow rating, when given)
//! - Daily statistics
//! - Key-value snapshots of the live timer state

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{data_dir, StateStore};
use crate::error::StorageError;
use crate::flow::FlowRating;
use crate::timer::SessionType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub session_type: String,
    pub duration_secs: u64,
    pub rating: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_sessions: u64,
    pub work_sessions: u64,
    pub flow_sessions: u64,
    pub focus_secs: u64,
    pub break_secs: u64,
}

/// SQLite database at `~/.config/flowdoro/flowdoro.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the default database, creating file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?
            .join("flowdoro.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path (tests, alternate profiles).
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(path),
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
                "CREATE TABLE IF NOT EXISTS sessions (
                    id            INTEGER PRIMARY KEY AUTOINCREMENT,
                    session_type  TEXT NOT NULL,
                    duration_secs INTEGER NOT NULL,
                    rating        TEXT,
                    started_at    TEXT NOT NULL,
                    completed_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);
                CREATE INDEX IF NOT EXISTS idx_sessions_session_type ON sessions(session_type);",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    /// Record a completed session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(
        &self,
        session_type: SessionType,
        duration_secs: u64,
        rating: Option<FlowRating>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let type_str = match session_type {
            SessionType::Work => "work",
            SessionType::ShortBreak => "shortBreak",
            SessionType::LongBreak => "longBreak",
        };
        let rating_str = rating.map(|r| match r {
            FlowRating::Distracted => "distracted",
            FlowRating::Ok => "ok",
            FlowRating::Focused => "focused",
            FlowRating::Flow => "flow",
        });
        self.conn.execute(
            "INSERT INTO sessions (session_type, duration_secs, rating, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                type_str,
                duration_secs,
                rating_str,
                started_at.to_rfc3339(),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Aggregate statistics for sessions completed today (UTC).
    pub fn stats_today(&self) -> Result<Stats, StorageError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT session_type, rating, COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions
             WHERE completed_at >= ?1
             GROUP BY session_type, rating",
        )?;

        let mut stats = Stats::default();
        let rows = stmt.query_map(params![format!("{today}T00:00:00+00:00")], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, u64>(3)?,
            ))
        })?;

        for row in rows {
            let (session_type, rating, count, secs) = row?;
            stats.total_sessions += count;
            if session_type == "work" {
                stats.work_sessions += count;
                stats.focus_secs += secs;
                if rating.as_deref() == Some("flow") {
                    stats.flow_sessions += count;
                }
            } else {
                stats.break_secs += secs;
            }
        }
        Ok(stats)
    }

    /// Most recent sessions, newest first.
    pub fn recent_sessions(&self, limit: u32) -> Result<Vec<SessionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_type, duration_secs, rating, started_at, completed_at
             FROM sessions
             ORDER BY completed_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, session_type, duration_secs, rating, started_at, completed_at) = row?;
            records.push(SessionRecord {
                id,
                session_type,
                duration_secs,
                rating,
                started_at: parse_timestamp(&started_at)?,
                completed_at: parse_timestamp(&completed_at)?,
            });
        }
        Ok(records)
    }

    /// Read a raw value from the kv table.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Write a raw value to the kv table.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::QueryFailed(format!("bad timestamp '{raw}': {e}")))
}

impl StateStore for Database {
    fn load(&self, key: &str) -> Option<String> {
        self.kv_get(key).ok().flatten()
    }

    fn save(&self, key: &str, json: &str) -> Result<(), StorageError> {
        self.kv_set(key, json)
    }
}
