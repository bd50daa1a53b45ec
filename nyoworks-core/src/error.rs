use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures while reading or writing the persisted project state.
///
/// These abort the command; the in-memory view is never committed after one.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("timed out waiting for state lock {}", path.display())]
    LockTimeout { path: PathBuf },

    #[error("state store mutex poisoned")]
    Poisoned,

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Every user-facing failure of a project operation.
#[derive(Debug, Error)]
pub enum NyoError {
    #[error("No project found. Run 'nyoworks init' to create a project.")]
    NoProject,

    #[error("Project already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("Task {task_id} already claimed by {holder} (expires {})", expires_at.format("%Y-%m-%d %H:%M:%S UTC"))]
    Conflict {
        task_id: String,
        holder: String,
        expires_at: DateTime<Utc>,
    },

    #[error("Task {0} is not locked")]
    NotLocked(String),

    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Task {task_id} is held by {holder}, not {requester}")]
    NotHolder {
        task_id: String,
        holder: String,
        requester: String,
    },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl NyoError {
    /// Storage failures are the severe class; everything else is a user error.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, NyoError::Storage(_))
    }
}

pub type Result<T, E = NyoError> = std::result::Result<T, E>;
