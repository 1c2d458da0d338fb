//! Per-repository concurrency guard
//!
//! Every mutating operation takes the repository's exclusive lock before
//! touching refs, objects, the index, or the working tree. The guard releases
//! on drop, so the lock is returned on every exit path including early `?`
//! returns. Acquisition retries until the configured bound and then fails
//! with Busy rather than blocking forever.
//!
//! Exclusion is two-layered. The fcntl record lock taken through `file-guard`
//! is process-owned on Unix: a second acquisition from another thread of the
//! same process would succeed while the first guard is held, and dropping
//! either guard would release both. A process-wide registry of held lock
//! paths closes that gap; the file lock still excludes other processes.
//!
//! Locks for different repositories are independent; operations on different
//! repositories never contend.

use crate::artifacts::core::RepoId;
use crate::error::{Error, Result};
use file_guard::{FileGuard, Lock};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Lock paths currently held somewhere in this process.
static HELD_PATHS: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();

fn held_paths() -> &'static Mutex<HashSet<PathBuf>> {
    HELD_PATHS.get_or_init(Mutex::default)
}

#[derive(Debug)]
pub struct RepositoryLock {
    path: Box<Path>,
    repo: RepoId,
    wait: Duration,
}

/// The in-process half of the lock: sole claim on a lock path among the
/// threads of this process. Releases the claim on drop.
struct ProcessClaim {
    path: PathBuf,
}

impl ProcessClaim {
    fn acquire(path: &Path, repo: RepoId, deadline: Instant) -> Result<Self> {
        loop {
            let mut held = held_paths()
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if held.insert(path.to_path_buf()) {
                return Ok(ProcessClaim {
                    path: path.to_path_buf(),
                });
            }
            drop(held);

            if Instant::now() >= deadline {
                return Err(Error::Busy(repo));
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
    }
}

impl Drop for ProcessClaim {
    fn drop(&mut self) {
        held_paths()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
    }
}

/// Holds the exclusive lock; dropping it unlocks.
pub struct LockGuard {
    _claim: ProcessClaim,
    _guard: FileGuard<Box<File>>,
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("path", &self._claim.path)
            .finish_non_exhaustive()
    }
}

impl RepositoryLock {
    pub fn new(path: Box<Path>, repo: RepoId, wait: Duration) -> Self {
        RepositoryLock { path, repo, wait }
    }

    /// Acquire the exclusive repository lock, waiting up to the configured
    /// bound. Times out with Busy so the caller can retry.
    pub fn acquire(&self) -> Result<LockGuard> {
        let deadline = Instant::now() + self.wait;

        let claim = ProcessClaim::acquire(&self.path, self.repo, deadline)?;

        loop {
            let file = Box::new(
                std::fs::OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&self.path)?,
            );

            match file_guard::try_lock(file, Lock::Exclusive, 0, 1) {
                Ok(guard) => {
                    debug!(repo = %self.repo, "acquired repository lock");
                    return Ok(LockGuard {
                        _claim: claim,
                        _guard: guard,
                    });
                }
                // EAGAIN/EACCES mean another process holds it; anything else
                // is real I/O trouble
                Err(err)
                    if matches!(
                        err.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::PermissionDenied
                    ) =>
                {
                    if Instant::now() >= deadline {
                        return Err(Error::Busy(self.repo));
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_at(dir: &Path, name: &str) -> RepositoryLock {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        RepositoryLock::new(
            path.into_boxed_path(),
            RepoId::new(1),
            Duration::from_millis(50),
        )
    }

    #[test]
    fn a_held_lock_excludes_other_threads_of_this_process() {
        let dir = assert_fs::TempDir::new().unwrap();
        let lock = lock_at(dir.path(), "lock");

        let guard = lock.acquire().unwrap();
        let err = lock.acquire().unwrap_err();
        assert!(matches!(err, Error::Busy(_)));

        drop(guard);
        assert!(lock.acquire().is_ok());
    }

    #[test]
    fn different_lock_paths_do_not_contend() {
        let dir = assert_fs::TempDir::new().unwrap();
        let one = lock_at(dir.path(), "one.lock");
        let two = lock_at(dir.path(), "two.lock");

        let _first = one.acquire().unwrap();
        assert!(two.acquire().is_ok());
    }
}
