//! Cross-process exclusive lock on a sidecar lock file.
//!
//! The lock is an OS advisory lock (`flock` on Unix) held on an open handle
//! to a persistent file. It is released when the handle closes, including
//! when the owning process dies, so a leftover file never blocks anyone and
//! the file itself is never deleted.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::StorageError;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

const INITIAL_BACKOFF: Duration = Duration::from_millis(2);
const MAX_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until the lock at `path` is ours or `timeout` elapses.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StorageError::io(path, e))?;

        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;

        loop {
            if try_lock_exclusive(&file).map_err(|e| StorageError::io(path, e))? {
                record_owner(&file);
                tracing::trace!(path = %path.display(), waited_ms = started.elapsed().as_millis() as u64, "State lock acquired");
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                });
            }
            if started.elapsed() >= timeout {
                return Err(StorageError::LockTimeout {
                    path: path.to_path_buf(),
                });
            }
            thread::sleep(backoff);
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = unlock(&self.file) {
            // Closing the handle right after still releases it.
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to unlock state lock");
        }
    }
}

/// Owner pid, for humans inspecting the file.
fn record_owner(mut file: &File) {
    let _ = file
        .set_len(0)
        .and_then(|_| writeln!(file, "{}", std::process::id()));
}

// ─── Platform locking ───────────────────────────────────────────────────────

/// `Ok(false)` when another handle holds the lock.
#[cfg(unix)]
fn try_lock_exclusive(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        return Ok(false);
    }
    Err(err)
}

#[cfg(unix)]
fn unlock(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: as above.
    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_UN) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock_exclusive(file: &File) -> io::Result<bool> {
    match file.try_lock() {
        Ok(()) => Ok(true),
        Err(fs::TryLockError::WouldBlock) => Ok(false),
        Err(fs::TryLockError::Error(e)) => Err(e),
    }
}

#[cfg(not(unix))]
fn unlock(file: &File) -> io::Result<()> {
    file.unlock()
}
