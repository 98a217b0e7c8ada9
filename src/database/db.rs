//! SQLite storage for the review engine
//!
//! Holds the review-state document in a single-row table, plus an app_state
//! key/value table with the simulated current date and today's progress.

use crate::error::PersistenceError;
use crate::persistence::PersistenceAdapter;
use crate::progress::DailyProgress;
use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, params};
use std::path::Path;

/// SQLite-backed persistence adapter
pub struct SqliteAdapter {
    conn: Connection,
}

impl SqliteAdapter {
    /// Opens (or creates) the database file and its tables
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_database(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_database(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl PersistenceAdapter for SqliteAdapter {
    fn load(&self) -> std::result::Result<Option<Vec<u8>>, PersistenceError> {
        let document = self
            .conn
            .query_row("SELECT document FROM review_state WHERE id = 1", [], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(document)
    }

    fn save(&mut self, bytes: &[u8]) -> std::result::Result<(), PersistenceError> {
        // Single statement upsert: the old row stays until the new one commits.
        self.conn.execute(
            "INSERT INTO review_state (id, document) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET document = excluded.document",
            params![bytes],
        )?;
        Ok(())
    }
}

/// Creates the tables used by the engine and the simulated clock.
///
/// Sets current date to now if not already initialized.
pub fn init_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_state (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            document BLOB NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Utc::now().timestamp().to_string()],
    )?;

    Ok(())
}

/// Retrieves the simulated current date
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Utc>> {
    let timestamp: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    let secs = timestamp
        .parse::<i64>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Text,
            format!("timestamp {secs} out of range").into(),
        )
    })
}

/// Advances the simulated date by 24 hours
pub fn advance_day(conn: &Connection) -> Result<DateTime<Utc>> {
    let next_day = get_current_date(conn)? + Duration::days(1);

    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
        params![next_day.timestamp().to_string()],
    )?;

    Ok(next_day)
}

/// Loads today's progress counter, empty if never recorded
pub fn load_daily_progress(conn: &Connection) -> std::result::Result<DailyProgress, PersistenceError> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM app_state WHERE key = 'daily_progress'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(DailyProgress::default()),
    }
}

pub fn save_daily_progress(
    progress: &DailyProgress,
    conn: &Connection,
) -> std::result::Result<(), PersistenceError> {
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES ('daily_progress', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![serde_json::to_string(progress)?],
    )?;
    Ok(())
}

/// Forgets today's progress counter
pub fn clear_daily_progress(conn: &Connection) -> std::result::Result<(), PersistenceError> {
    conn.execute("DELETE FROM app_state WHERE key = 'daily_progress'", [])?;
    Ok(())
}
