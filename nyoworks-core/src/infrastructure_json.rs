//! Flat JSON file backend: `<root>/.nyoworks/state.json`.
//!
//! Writers serialize on an advisory lock over a sidecar lock file and replace
//! the document with an atomic rename, so readers never see a half-written
//! file and concurrent transactions never lose each other's updates.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::error::{NyoError, StorageError};
use crate::infrastructure::StateStore;
use crate::lock::{DEFAULT_LOCK_TIMEOUT, FileLock};
use crate::types::ProjectState;

pub const STATE_DIR: &str = ".nyoworks";
pub const STATE_FILE: &str = "state.json";
pub const LOCK_FILE: &str = "state.lock";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    state_path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl JsonFileStore {
    /// Store rooted at a project directory.
    pub fn open(project_dir: impl AsRef<Path>) -> Self {
        let dir = project_dir.as_ref().join(STATE_DIR);
        Self {
            state_path: dir.join(STATE_FILE),
            lock_path: dir.join(LOCK_FILE),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn read(&self) -> Result<Option<ProjectState>, StorageError> {
        let raw = match fs::read_to_string(&self.state_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&self.state_path, e)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write(&self, state: &ProjectState) -> Result<(), StorageError> {
        let dir = self
            .state_path
            .parent()
            .ok_or_else(|| StorageError::io(&self.state_path, ErrorKind::InvalidInput.into()))?;
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

        let tmp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, state)?;
            writer
                .write_all(b"\n")
                .and_then(|_| writer.flush())
                .map_err(|e| StorageError::io(tmp.path(), e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| StorageError::io(tmp.path(), e))?;
        tmp.persist(&self.state_path)
            .map_err(|e| StorageError::io(&self.state_path, e.error))?;
        sync_dir(dir)
    }

    fn lock(&self) -> Result<FileLock, StorageError> {
        FileLock::acquire(&self.lock_path, self.lock_timeout)
    }
}

/// Makes the rename itself durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StorageError> {
    fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| StorageError::io(dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), StorageError> {
    Ok(())
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<ProjectState>, StorageError> {
        self.read()
    }

    fn create(&self, state: &ProjectState) -> Result<(), NyoError> {
        let _lock = self.lock()?;
        if self.state_path.exists() {
            return Err(NyoError::AlreadyInitialized(self.describe()));
        }
        self.write(state)?;
        tracing::debug!(path = %self.state_path.display(), "State file created");
        Ok(())
    }

    fn transact<T, F>(&self, mutate: F) -> Result<T, NyoError>
    where
        F: FnOnce(&mut ProjectState) -> Result<T, NyoError>,
    {
        let _lock = self.lock()?;
        let mut state = self.read()?.ok_or(NyoError::NoProject)?;
        let value = mutate(&mut state)?;
        self.write(&state)?;
        Ok(value)
    }

    fn describe(&self) -> String {
        self.state_path.display().to_string()
    }
}
