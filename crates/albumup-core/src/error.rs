//! Error types for the albumup upload pipeline.
//!
//! Errors are organized by stage so messages carry the context that matters
//! (file paths, stage names, the channel's own diagnostics).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for albumup operations.
#[derive(Error, Debug)]
pub enum AlbumupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The upload root does not exist. Fatal: the run aborts before any
    /// other work begins.
    #[error("Root path not found: {0}")]
    RootNotFound(PathBuf),

    /// The file could not be read or recognized as an image.
    /// Recoverable: the file is skipped with a warning.
    #[error("Unreadable or unrecognized image {path}: {message}")]
    Unsupported { path: PathBuf, message: String },

    /// Image decoding failed after the format was recognized.
    /// Recoverable: the file is skipped.
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Re-encoding to the transport format failed.
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Scratch storage operation failed.
    #[error("Scratch storage error at {path}: {message}")]
    Scratch { path: PathBuf, message: String },

    /// Operation timed out.
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },
}

/// Failure contract of the remote channel, as seen by the dispatcher.
///
/// One send attempt yields success or exactly one of these classes; the
/// dispatcher depends on nothing else about the transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The channel asked the caller to pause, optionally saying how long.
    #[error("Rate limited by channel")]
    RateLimited {
        /// Server-suggested wait in seconds, when provided
        retry_after: Option<u64>,
    },

    /// Transient connectivity failure: timeout, connection error, 5xx.
    #[error("Network failure: {message}")]
    Network { message: String },

    /// The channel rejected the post outright. Not retryable.
    #[error("Rejected by channel: {message}")]
    Protocol { message: String },
}

/// Convenience type alias for albumup results.
pub type Result<T> = std::result::Result<T, AlbumupError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
