//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.normalize.max_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "normalize.max_dimension must be > 0".into(),
            ));
        }
        if self.normalize.jpeg_quality == 0 || self.normalize.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "normalize.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.normalize.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "normalize.timeout_ms must be > 0".into(),
            ));
        }
        if self.dispatch.album_size == 0 || self.dispatch.album_size > 10 {
            return Err(ConfigError::ValidationError(
                "dispatch.album_size must be between 1 and 10".into(),
            ));
        }
        if self.dispatch.max_network_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.max_network_attempts must be > 0".into(),
            ));
        }
        if self.delay.floor_s == 0 || self.delay.ceiling_s == 0 {
            return Err(ConfigError::ValidationError(
                "delay.floor_s and delay.ceiling_s must be > 0".into(),
            ));
        }
        if self.delay.floor_s > self.delay.ceiling_s {
            return Err(ConfigError::ValidationError(
                "delay.floor_s must not exceed delay.ceiling_s".into(),
            ));
        }
        if self.delay.step_s == 0 {
            return Err(ConfigError::ValidationError(
                "delay.step_s must be > 0".into(),
            ));
        }
        Ok(())
    }
}
