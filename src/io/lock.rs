use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory file lock serializing writes to workspace.toml.
///
/// Uses flock on Unix so the TUI and concurrent CLI invocations do not
/// interleave read-modify-write cycles. The lock file stays in place after
/// release; unlinking it would let a waiter and a newcomer lock different
/// inodes at the same time.
pub struct FileLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another roster process may be writing")]
    Timeout { path: PathBuf },
}

impl FileLock {
    /// Acquire the lock in `roster_dir`, waiting up to `timeout`.
    pub fn acquire(roster_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = roster_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    return Ok(FileLock { _file: file });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    tracing::warn!(path = %lock_path.display(), "lock acquisition timed out");
                    return Err(LockError::Timeout { path: lock_path });
                }
            }
        }
    }

    pub fn acquire_default(roster_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(roster_dir, Duration::from_secs(5))
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
