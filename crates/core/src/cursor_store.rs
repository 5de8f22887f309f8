//! Cursor Store
//!
//! Last caret offset per action, persisted in a small SQLite file.
//!
//! # Invariants
//! - One row per action name; `set` is an upsert.
//! - Every `set` is committed before it returns (autocommit, no batching).
//! - A missing row is `None`, not an error.

use crate::action::Action;
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cursors (
    note   TEXT PRIMARY KEY,
    cursor INTEGER NOT NULL
);";

pub struct CursorStore {
    conn: Connection,
}

impl CursorStore {
    /// Open (or create) the cursor database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let store = Self::bootstrap(conn)?;
        tracing::info!("Cursor store opened at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        // A locked or slow database surfaces as an error instead of hanging the UI
        conn.busy_timeout(Duration::from_secs(2))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Last saved caret offset for `action`
    pub fn get(&self, action: Action) -> Result<Option<usize>> {
        let offset: Option<i64> = self
            .conn
            .query_row(
                "SELECT cursor FROM cursors WHERE note = ?1",
                params![action.name()],
                |row| row.get(0),
            )
            .optional()?;

        // Negative values can only come from a hand-edited database
        Ok(offset.and_then(|o| usize::try_from(o).ok()))
    }

    /// Insert or replace the caret offset for `action`
    pub fn set(&self, action: Action, offset: usize) -> Result<()> {
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        self.conn.execute(
            "INSERT INTO cursors (note, cursor) VALUES (?1, ?2)
             ON CONFLICT(note) DO UPDATE SET cursor = excluded.cursor",
            params![action.name(), offset],
        )?;
        tracing::debug!("Saved cursor {} for {}", offset, action);
        Ok(())
    }
}
