//! secrets::traits
//!
//! The `SecretStore` key-value interface and its error type.
//!
//! Keys are namespaced per registry (e.g. "registry.ghcr.io.password")
//! so one store holds credentials for any number of registries. Every
//! implementation is `Send + Sync` and keeps secret values out of error
//! messages.

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Messages intentionally never include secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// No secret stored under the given key.
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The store could not be read.
    #[error("secret read failed: {0}")]
    ReadError(String),

    /// The store could not be written.
    #[error("secret write failed: {0}")]
    WriteError(String),

    /// The store entry could not be removed.
    #[error("secret delete failed: {0}")]
    DeleteError(String),

    /// Another process held the store lock for too long.
    #[error("timed out waiting for the secrets store lock")]
    LockTimeout,

    /// The requested provider is missing or misconfigured.
    #[error("secret provider unavailable: {0}")]
    ProviderNotAvailable(String),
}

/// Key for a registry's stored password.
pub fn registry_password_key(server: &str) -> String {
    format!("registry.{}.password", server)
}

/// Key for a registry's stored username.
pub fn registry_username_key(server: &str) -> String {
    format!("registry.{}.username", server)
}

/// A credential store, keyed by namespaced strings.
pub trait SecretStore: Send + Sync {
    /// Look up a secret; `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Store a secret, overwriting any existing value.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Remove a secret. Idempotent: removing an absent key is `Ok(())`.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    /// Whether a secret exists under the key.
    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keys_are_namespaced() {
        assert_eq!(
            registry_password_key("ghcr.io"),
            "registry.ghcr.io.password"
        );
        assert_eq!(
            registry_username_key("ghcr.io"),
            "registry.ghcr.io.username"
        );
        assert_ne!(
            registry_password_key("docker.io"),
            registry_password_key("ghcr.io")
        );
    }

    #[test]
    fn error_display_never_mentions_values() {
        let err = SecretError::NotFound("registry.ghcr.io.password".into());
        assert!(err.to_string().contains("not found"));

        let err = SecretError::ReadError("disk full".into());
        assert!(err.to_string().contains("read"));

        let err = SecretError::LockTimeout;
        assert!(err.to_string().contains("lock"));
    }
}
