//! secrets
//!
//! Secret storage for registry credentials.
//!
//! # Architecture
//!
//! Credentials go through the `SecretStore` trait:
//!
//! - [`FileSecretStore`]: `~/.stowage/secrets.toml` (default)
//! - [`KeychainSecretStore`]: OS keychain (feature-gated)
//!
//! Keys are namespaced per registry, e.g. `registry.ghcr.io.password`.
//!
//! # Security
//!
//! - Secret values are never logged or included in error messages
//! - The file store uses 0600 permissions and atomic writes
//! - Mutations hold a cross-process lock

mod file_store;
mod keychain_store;
mod lock;
mod traits;

pub use file_store::FileSecretStore;
pub use keychain_store::KeychainSecretStore;
pub use lock::StoreLock;
pub use traits::{registry_password_key, registry_username_key, SecretError, SecretStore};

/// The default secret store provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Create a secret store from a provider name.
///
/// # Providers
///
/// - `"file"` (default): [`FileSecretStore`]
/// - `"keychain"`: [`KeychainSecretStore`] (requires the feature)
pub fn create_store(provider: &str) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Box::new(FileSecretStore::new()?)),
        #[cfg(feature = "keychain")]
        "keychain" => Ok(Box::new(KeychainSecretStore::new()?)),
        #[cfg(not(feature = "keychain"))]
        "keychain" => Err(SecretError::ProviderNotAvailable(
            "keychain provider not enabled; rebuild with --features keychain".into(),
        )),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unrecognized secrets provider '{}': expected file or keychain",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_file_store() {
        let store = create_store("file").expect("create file store");
        assert!(store.get("registry.nowhere.test.password").expect("get").is_none());
    }

    #[test]
    fn create_unknown_provider() {
        match create_store("vault") {
            Err(SecretError::ProviderNotAvailable(msg)) => assert!(msg.contains("vault")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[cfg(not(feature = "keychain"))]
    #[test]
    fn create_keychain_without_feature() {
        let err = create_store("keychain").map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("not enabled"));
    }

    #[test]
    fn default_provider_constant() {
        assert_eq!(DEFAULT_PROVIDER, "file");
    }
}
