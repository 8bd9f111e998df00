//! Configuration management for albumup.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults; CLI flags override file values at the call site.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for albumup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Processing settings
    pub processing: ProcessingConfig,

    /// Normalization settings
    pub normalize: NormalizeConfig,

    /// Dispatch settings
    pub dispatch: DispatchConfig,

    /// Adaptive inter-batch delay settings
    pub delay: DelayConfig,

    /// Scratch storage settings
    pub scratch: ScratchConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// ~/.albumup/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "albumup", "albumup")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".albumup").join("config.toml")
            })
    }

    /// Resolved scratch root directory (with ~ expansion).
    ///
    /// An empty setting means the system temp directory.
    pub fn scratch_root(&self) -> PathBuf {
        if self.scratch.root.is_empty() {
            std::env::temp_dir()
        } else {
            let expanded = shellexpand::tilde(&self.scratch.root);
            PathBuf::from(expanded.into_owned())
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
