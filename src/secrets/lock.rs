//! secrets::lock
//!
//! Cross-process lock for the file-based secrets store.
//!
//! # Invariants
//!
//! - The lock must be held across the read-modify-write cycle of any
//!   mutation, so concurrent logins against different registries cannot
//!   drop each other's entries.
//! - The lock is released on drop (RAII).

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use super::traits::SecretError;

/// Maximum time a mutation waits for the lock.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(10);

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Exclusive lock guarding one secrets file.
///
/// The lock file lives next to the store file with a `.lock` suffix and
/// is left in place after release; only the OS-level lock matters.
#[derive(Debug)]
pub struct StoreLock {
    file: Option<File>,
    path: PathBuf,
}

impl StoreLock {
    /// Lock file path for a given store file.
    pub fn lock_path(store_path: &Path) -> PathBuf {
        let mut name = store_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        store_path.with_file_name(name)
    }

    /// Acquire the lock, blocking up to [`LOCK_TIMEOUT`].
    pub fn acquire(store_path: &Path) -> Result<Self, SecretError> {
        let path = Self::lock_path(store_path);
        let deadline = Instant::now() + LOCK_TIMEOUT;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SecretError::WriteError(format!(
                    "failed to create lock directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        loop {
            match Self::try_acquire(&path)? {
                Some(lock) => return Ok(lock),
                None => {
                    if Instant::now() >= deadline {
                        return Err(SecretError::LockTimeout);
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
            }
        }
    }

    fn try_acquire(path: &Path) -> Result<Option<Self>, SecretError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                SecretError::WriteError(format!(
                    "failed to open lock file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self {
                file: Some(file),
                path: path.to_path_buf(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(SecretError::WriteError(format!(
                "failed to lock {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_path_sits_next_to_store() {
        let path = StoreLock::lock_path(Path::new("/home/u/.stowage/secrets.toml"));
        assert_eq!(path, PathBuf::from("/home/u/.stowage/secrets.toml.lock"));
    }

    #[test]
    fn acquire_and_release() {
        let temp = TempDir::new().expect("create temp dir");
        let store = temp.path().join("secrets.toml");

        let lock = StoreLock::acquire(&store).expect("acquire");
        assert!(lock.path().exists());
        drop(lock);

        // Reacquirable after drop
        let _again = StoreLock::acquire(&store).expect("reacquire");
    }

    #[test]
    fn second_holder_blocks() {
        let temp = TempDir::new().expect("create temp dir");
        let store = temp.path().join("secrets.toml");
        let path = StoreLock::lock_path(&store);

        let _held = StoreLock::acquire(&store).expect("acquire");

        // try_lock_exclusive on a second handle must refuse while held.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .expect("open second handle");
        assert!(file.try_lock_exclusive().is_err());
    }
}
