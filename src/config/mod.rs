//! config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! The global config file is searched in order:
//! 1. `$STOWAGE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/stowage/config.toml`
//! 3. `~/.stowage/config.toml`
//!
//! Missing files are not an error; defaults apply. CLI flags override
//! loaded values (handled in the CLI layer, not here).
//!
//! # Example
//!
//! ```no_run
//! use stowage::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("runtime: {}", config.runtime_path());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, SecretsConfig, TimeoutConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::runtime;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: GlobalConfig,
    /// Path the config was loaded from, if a file was found.
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let (global, loaded_from) = Self::load_global()?;
        global.validate()?;
        Ok(Config {
            global,
            loaded_from,
        })
    }

    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $STOWAGE_CONFIG
        if let Ok(path) = std::env::var("STOWAGE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/stowage/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("stowage/config.toml");
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.stowage/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".stowage/config.toml");
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    fn read_file(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// The container runtime binary to invoke.
    ///
    /// Defaults to `"container"`.
    pub fn runtime_path(&self) -> &str {
        self.global
            .runtime_path
            .as_deref()
            .unwrap_or(runtime::cli::DEFAULT_BINARY)
    }

    /// Whether debug output is enabled by default.
    pub fn debug(&self) -> bool {
        self.global.debug.unwrap_or(false)
    }

    /// Root of the runtime's on-disk application data.
    ///
    /// Defaults to the platform data directory joined with the runtime's
    /// bundle identifier.
    pub fn data_root(&self) -> Result<PathBuf, ConfigError> {
        if let Some(root) = &self.global.data_root {
            return Ok(root.clone());
        }
        let data = dirs::data_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(data.join("com.apple.container"))
    }

    /// The on-disk directory backing one container.
    pub fn container_dir(&self, container_id: &str) -> Result<PathBuf, ConfigError> {
        Ok(self.data_root()?.join("containers").join(container_id))
    }

    /// Timeout for ordinary commands.
    pub fn default_timeout(&self) -> Duration {
        self.timeout_or(|t| t.default_secs, runtime::DEFAULT_TIMEOUT)
    }

    /// Timeout for registry transfers.
    pub fn transfer_timeout(&self) -> Duration {
        self.timeout_or(|t| t.transfer_secs, runtime::TRANSFER_TIMEOUT)
    }

    /// Timeout for builds and archive operations.
    pub fn build_timeout(&self) -> Duration {
        self.timeout_or(|t| t.build_secs, runtime::BUILD_TIMEOUT)
    }

    fn timeout_or(
        &self,
        pick: impl Fn(&TimeoutConfig) -> Option<u64>,
        fallback: Duration,
    ) -> Duration {
        self.global
            .timeouts
            .as_ref()
            .and_then(pick)
            .map(Duration::from_secs)
            .unwrap_or(fallback)
    }

    /// The secrets provider name.
    ///
    /// Defaults to "file".
    pub fn secrets_provider(&self) -> &str {
        self.global
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or("file")
    }

    /// The path the config was loaded from, if any.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
