//! SQLite-backed StateStore implementation.
//! Keeps the project document in a single versioned row.
//!
//! Enable with the `sqlite` feature flag:
//! ```toml
//! nyoworks-core = { path = "../nyoworks-core", features = ["sqlite"] }
//! ```

use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::error::{NyoError, StorageError};
use crate::infrastructure::StateStore;
use crate::types::ProjectState;

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// A persistent state store backed by SQLite.
///
/// Every write runs in an `IMMEDIATE` transaction, so the reserved lock is
/// taken before the document is read and concurrent writers queue up behind
/// the busy timeout instead of racing.
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
    path: String,
}

impl SqliteStateStore {
    /// Open (or create) a SQLite database at the given path.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS project_state (
                id          INTEGER PRIMARY KEY CHECK (id = 1),
                version     INTEGER NOT NULL,
                document    TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_string(),
        })
    }

    /// Number of committed writes, 0 when no project exists.
    pub fn version(&self) -> Result<u64, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let version: Option<i64> = conn
            .query_row("SELECT version FROM project_state WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(version.map_or(0, |v| v as u64))
    }

    fn read_document(conn: &Connection) -> Result<Option<(i64, ProjectState)>, StorageError> {
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT version, document FROM project_state WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((version, document)) => Ok(Some((version, serde_json::from_str(&document)?))),
            None => Ok(None),
        }
    }
}

impl StateStore for SqliteStateStore {
    fn load(&self) -> Result<Option<ProjectState>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(Self::read_document(&conn)?.map(|(_, state)| state))
    }

    fn create(&self, state: &ProjectState) -> Result<(), NyoError> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;

        if Self::read_document(&tx)?.is_some() {
            return Err(NyoError::AlreadyInitialized(self.describe()));
        }

        let document = serde_json::to_string(state).map_err(StorageError::from)?;
        tx.execute(
            "INSERT INTO project_state (id, version, document, updated_at) VALUES (1, 1, ?1, ?2)",
            params![document, Utc::now().to_rfc3339()],
        )
        .map_err(StorageError::from)?;
        tx.commit().map_err(StorageError::from)?;
        Ok(())
    }

    fn transact<T, F>(&self, mutate: F) -> Result<T, NyoError>
    where
        F: FnOnce(&mut ProjectState) -> Result<T, NyoError>,
    {
        let mut conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;

        let (version, mut state) = Self::read_document(&tx)?.ok_or(NyoError::NoProject)?;
        // Dropping `tx` on error rolls back.
        let value = mutate(&mut state)?;

        let document = serde_json::to_string(&state).map_err(StorageError::from)?;
        tx.execute(
            "UPDATE project_state SET version = ?1, document = ?2, updated_at = ?3 WHERE id = 1",
            params![version + 1, document, Utc::now().to_rfc3339()],
        )
        .map_err(StorageError::from)?;
        tx.commit().map_err(StorageError::from)?;
        Ok(value)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}
