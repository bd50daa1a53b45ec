use std::path::{Path, PathBuf};

use anyhow::bail;
use nyoworks_core::error::{NyoError, StorageError};
use nyoworks_core::infrastructure::StateStore;
use nyoworks_core::infrastructure_json::JsonFileStore;
use nyoworks_core::types::ProjectState;

/// The backend chosen by `--storage`.
pub enum Backend {
    Json(JsonFileStore),
    #[cfg(feature = "sqlite")]
    Sqlite(nyoworks_core::infrastructure_sqlite::SqliteStateStore),
}

impl StateStore for Backend {
    fn load(&self) -> Result<Option<ProjectState>, StorageError> {
        match self {
            Backend::Json(store) => store.load(),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(store) => store.load(),
        }
    }

    fn create(&self, state: &ProjectState) -> Result<(), NyoError> {
        match self {
            Backend::Json(store) => store.create(state),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(store) => store.create(state),
        }
    }

    fn transact<T, F>(&self, mutate: F) -> Result<T, NyoError>
    where
        F: FnOnce(&mut ProjectState) -> Result<T, NyoError>,
    {
        match self {
            Backend::Json(store) => store.transact(mutate),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(store) => store.transact(mutate),
        }
    }

    fn describe(&self) -> String {
        match self {
            Backend::Json(store) => store.describe(),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(store) => store.describe(),
        }
    }
}

// ─── Storage Backend Selection ──────────────────────────────────────────────

/// `json` or `sqlite:<path>`; relative sqlite paths resolve against the
/// project directory.
pub fn open_backend(storage: &str, project_dir: &Path) -> anyhow::Result<Backend> {
    if storage == "json" {
        let store = JsonFileStore::open(project_dir);
        tracing::debug!(path = %store.state_path().display(), "Storage backend: JSON file");
        Ok(Backend::Json(store))
    } else if let Some(path) = storage.strip_prefix("sqlite:") {
        if path.is_empty() {
            bail!("sqlite storage needs a path: sqlite:<path>");
        }
        let path = resolve(project_dir, path);
        open_sqlite(&path)
    } else {
        bail!("Unknown storage backend '{}'. Use 'json' or 'sqlite:<path>'", storage)
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(path: &Path) -> anyhow::Result<Backend> {
    use anyhow::Context;

    let path_str = path.display().to_string();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let store = nyoworks_core::infrastructure_sqlite::SqliteStateStore::open(&path_str)
        .with_context(|| format!("Failed to open SQLite database at '{}'", path_str))?;
    tracing::debug!(path = %path_str, "Storage backend: SQLite");
    Ok(Backend::Sqlite(store))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(path: &Path) -> anyhow::Result<Backend> {
    bail!(
        "SQLite storage requested ({}) but the `sqlite` feature is not enabled. \
         Rebuild with: cargo build --features sqlite",
        path.display()
    )
}

fn resolve(project_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}
