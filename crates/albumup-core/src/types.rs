//! Core data types for the upload pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A candidate image file found under the upload root.
///
/// Immutable once discovered; the pipeline never touches the source file
/// beyond reading it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// A size- and format-bounded re-encoding of a source image, stored in
/// scratch storage pending send.
///
/// Owned exclusively by the run: created by the normalizer, deleted by the
/// dispatcher on confirmed send or by cleanup at run end.
#[derive(Debug, Clone)]
pub struct NormalizedAsset {
    /// Path of the encoded JPEG in the run's scratch directory
    pub path: PathBuf,
    /// Encoded size in bytes
    pub size: u64,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

/// An ordered group of normalized assets posted together as one album.
///
/// Never empty, never longer than the configured album size. Asset order
/// is discovery order, preserved end-to-end.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Zero-based position of this batch in the run
    pub index: usize,
    /// The assets in this batch, in discovery order
    pub assets: Vec<NormalizedAsset>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Classified result of one dispatch attempt for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The whole album posted.
    Sent,
    /// The channel asked for a pause; `retry_after` is the server's
    /// suggested wait in seconds when it gave one.
    RateLimited { retry_after: Option<u64> },
    /// Transient connectivity failure.
    NetworkFailure,
    /// The channel rejected the post; retrying cannot help.
    ProtocolFailure,
}

/// Counts accumulated across a run. Read-only once the run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Candidate files found under the root
    pub discovered: usize,
    /// Files successfully normalized into scratch storage
    pub normalized: usize,
    /// Images confirmed sent
    pub sent: usize,
    /// Images in batches that reached a terminal failure
    pub failed: usize,
}
