//! secrets::file_store
//!
//! File-based secret storage.
//!
//! # Security
//!
//! - Secrets live in `~/.stowage/secrets.toml`
//! - File permissions are 0600 on Unix (owner read/write only)
//! - Writes are atomic (temp file + rename)
//! - Mutations hold a cross-process lock across read-modify-write
//! - Secret values never appear in error messages

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::lock::StoreLock;
use super::traits::{SecretError, SecretStore};

/// File-based secret storage, the default provider.
///
/// Stores secrets as a flat TOML table at `~/.stowage/secrets.toml`.
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Store at the default location, `~/.stowage/secrets.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("home directory is not available".into()))?;
        Ok(Self {
            path: home.join(".stowage").join("secrets.toml"),
        })
    }

    /// Store at a custom path. Primarily for tests.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path to the secrets file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_entries(&self) -> Result<HashMap<String, String>, SecretError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SecretError::ReadError(format!("failed to read secrets file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SecretError::ReadError(format!("secrets file is not valid TOML: {}", e)))
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SecretError::WriteError(format!("failed to create secrets directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(entries)
            .map_err(|e| SecretError::WriteError(format!("failed to encode secrets: {}", e)))?;

        let staging = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&staging)
                .map_err(|e| {
                    SecretError::WriteError(format!("failed to open staging file: {}", e))
                })?;

            // Restrict permissions before any content lands on disk.
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| {
                    SecretError::WriteError(format!("failed to restrict permissions: {}", e))
                })?;

            file.write_all(content.as_bytes()).map_err(|e| {
                SecretError::WriteError(format!("failed to write secrets file: {}", e))
            })?;

            file.sync_all().map_err(|e| {
                SecretError::WriteError(format!("failed to flush secrets file: {}", e))
            })?;
        }

        fs::rename(&staging, &self.path).map_err(|e| {
            SecretError::WriteError(format!("failed to replace secrets file: {}", e))
        })?;

        Ok(())
    }

    /// True if the file is absent or has 0600 permissions.
    #[cfg(unix)]
    pub fn verify_permissions(&self) -> Result<bool, SecretError> {
        if !self.path.exists() {
            return Ok(true);
        }

        let metadata = fs::metadata(&self.path)
            .map_err(|e| SecretError::ReadError(format!("failed to stat secrets file: {}", e)))?;

        Ok(metadata.permissions().mode() & 0o777 == 0o600)
    }

    #[cfg(not(unix))]
    pub fn verify_permissions(&self) -> Result<bool, SecretError> {
        Ok(true)
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        let entries = self.read_entries()?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let _lock = StoreLock::acquire(&self.path)?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let _lock = StoreLock::acquire(&self.path)?;
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::traits::registry_password_key;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, FileSecretStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        (temp, store)
    }

    #[test]
    fn get_missing_returns_none() {
        let (_temp, store) = test_store();
        assert!(store.get("registry.ghcr.io.password").expect("get").is_none());
    }

    #[test]
    fn set_get_delete_cycle() {
        let (_temp, store) = test_store();
        let key = registry_password_key("ghcr.io");

        store.set(&key, "s3cret").expect("set");
        assert_eq!(store.get(&key).expect("get"), Some("s3cret".to_string()));
        assert!(store.exists(&key).expect("exists"));

        store.delete(&key).expect("delete");
        assert!(store.get(&key).expect("get after delete").is_none());
    }

    #[test]
    fn set_overwrites() {
        let (_temp, store) = test_store();

        store.set("registry.docker.io.password", "old").expect("set");
        store.set("registry.docker.io.password", "new").expect("set");

        assert_eq!(
            store.get("registry.docker.io.password").expect("get"),
            Some("new".to_string())
        );
    }

    #[test]
    fn delete_missing_is_ok() {
        let (_temp, store) = test_store();
        store.delete("registry.ghcr.io.password").expect("delete");
    }

    #[test]
    fn entries_for_different_registries_coexist() {
        let (_temp, store) = test_store();

        store.set("registry.ghcr.io.password", "a").expect("set");
        store.set("registry.ghcr.io.username", "alice").expect("set");
        store.set("registry.docker.io.password", "b").expect("set");

        assert_eq!(
            store.get("registry.ghcr.io.username").expect("get"),
            Some("alice".to_string())
        );
        assert_eq!(
            store.get("registry.docker.io.password").expect("get"),
            Some("b".to_string())
        );
    }

    #[test]
    fn creates_parent_directory() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("nested").join("secrets.toml");
        let store = FileSecretStore::with_path(path.clone());

        store.set("k", "v").expect("set");
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_mode_is_0600() {
        let (_temp, store) = test_store();
        store.set("k", "v").expect("set");

        let mode = fs::metadata(store.path())
            .expect("metadata")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600);
        assert!(store.verify_permissions().expect("verify"));
    }

    #[test]
    fn persists_across_instances() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("secrets.toml");

        FileSecretStore::with_path(path.clone())
            .set("k", "v")
            .expect("set");

        let store = FileSecretStore::with_path(path);
        assert_eq!(store.get("k").expect("get"), Some("v".to_string()));
    }

    #[test]
    fn corrupt_file_surfaces_read_error() {
        let (_temp, store) = test_store();
        fs::create_dir_all(store.path().parent().unwrap()).expect("mkdir");
        fs::write(store.path(), "broken = [unclosed").expect("write");

        let err = store.get("k").unwrap_err();
        assert!(matches!(err, SecretError::ReadError(_)));
    }

    #[test]
    fn values_with_special_characters_roundtrip() {
        let (_temp, store) = test_store();
        let value = "p@ss with \"quotes\" and \n newlines";

        store.set("k", value).expect("set");
        assert_eq!(store.get("k").expect("get"), Some(value.to_string()));
    }
}
