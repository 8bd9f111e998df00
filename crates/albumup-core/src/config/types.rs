//! Sub-configuration structs with defaults matching the reference uploader.

use serde::{Deserialize, Serialize};

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Recognized input extensions (case-insensitive)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// Normalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Longest output side in pixels; larger images are scaled down
    pub max_dimension: u32,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// Per-image decode+encode timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_dimension: 4096,
            jpeg_quality: 75,
            timeout_ms: 30_000,
        }
    }
}

/// Dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Images per album post (1-10)
    pub album_size: usize,

    /// Send attempts allowed per batch while the network keeps failing
    pub max_network_attempts: u32,

    /// Base backoff delay after a network failure, in milliseconds
    pub backoff_base_ms: u64,

    /// Wait applied on a rate-limit signal with no server hint, in seconds
    pub default_rate_limit_wait_s: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            album_size: 10,
            max_network_attempts: 3,
            backoff_base_ms: 1000,
            default_rate_limit_wait_s: 5,
        }
    }
}

/// Adaptive inter-batch delay settings, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Minimum delay between albums
    pub floor_s: u64,

    /// Maximum delay between albums
    pub ceiling_s: u64,

    /// How far the delay moves after each send or rate-limit signal
    pub step_s: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            floor_s: 20,
            ceiling_s: 120,
            step_s: 5,
        }
    }
}

/// Scratch storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Directory scratch runs are created under. Empty means the system
    /// temp directory.
    pub root: String,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Append-only run log file. Empty disables the file sink.
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "albumup.log".to_string(),
        }
    }
}
