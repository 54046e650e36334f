//! config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Values are validated after parsing; unknown fields are rejected so a
//! typo in the file surfaces as an error instead of being silently
//! ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// runtime_path = "container"
/// debug = false
///
/// [timeouts]
/// default_secs = 30
/// transfer_secs = 600
/// build_secs = 300
///
/// [secrets]
/// provider = "file"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Path or name of the container runtime binary.
    pub runtime_path: Option<String>,

    /// Enable debug output by default.
    pub debug: Option<bool>,

    /// Root of the runtime's application data, used to locate container
    /// directories on disk.
    pub data_root: Option<PathBuf>,

    /// Command timeout overrides.
    pub timeouts: Option<TimeoutConfig>,

    /// Secret storage settings.
    pub secrets: Option<SecretsConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.runtime_path {
            if path.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "runtime_path cannot be empty".to_string(),
                ));
            }
        }

        if let Some(timeouts) = &self.timeouts {
            timeouts.validate()?;
        }

        if let Some(secrets) = &self.secrets {
            secrets.validate()?;
        }

        Ok(())
    }
}

/// Per-category command timeouts, in seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Ordinary commands (list, inspect, start, stop).
    pub default_secs: Option<u64>,

    /// Registry transfers (pull, push).
    pub transfer_secs: Option<u64>,

    /// Image builds and archive operations.
    pub build_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("default_secs", self.default_secs),
            ("transfer_secs", self.transfer_secs),
            ("build_secs", self.build_secs),
        ] {
            if value == Some(0) {
                return Err(ConfigError::InvalidValue(format!(
                    "timeouts.{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Secrets configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider to use ("file" or "keychain").
    pub provider: Option<String>,
}

impl SecretsConfig {
    /// Valid secret providers.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["file", "keychain"];

    /// Validate the secrets configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid secrets provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GlobalConfig::default();
        assert!(config.runtime_path.is_none());
        assert!(config.debug.is_none());
        assert!(config.data_root.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_runtime_path_rejected() {
        let config = GlobalConfig {
            runtime_path: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = GlobalConfig {
            timeouts: Some(TimeoutConfig {
                transfer_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_provider_rejected() {
        let config = SecretsConfig {
            provider: Some("vault".to_string()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn roundtrip() {
        let config = GlobalConfig {
            runtime_path: Some("container".to_string()),
            debug: Some(true),
            data_root: Some(PathBuf::from("/tmp/containers")),
            timeouts: Some(TimeoutConfig {
                default_secs: Some(30),
                transfer_secs: Some(600),
                build_secs: Some(300),
            }),
            secrets: Some(SecretsConfig {
                provider: Some("file".to_string()),
            }),
        };

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            runtime_path = "container"
            unknown_field = true
        "#;
        let result: Result<GlobalConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
