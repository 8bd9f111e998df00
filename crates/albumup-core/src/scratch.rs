//! Per-run scratch storage for normalized assets.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Exclusive scratch directory for a single run.
///
/// Created once per run, populated by the normalizer, emptied by the
/// dispatcher as sends are confirmed, and removed by [`cleanup`] at run
/// end whatever happened in between.
///
/// [`cleanup`]: ScratchDir::cleanup
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh scratch directory under `root`.
    pub fn create(root: &Path) -> Result<Self, PipelineError> {
        let path = root.join(format!("albumup-{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&path).map_err(|e| PipelineError::Scratch {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scratch path for the `seq`-th discovered source file.
    ///
    /// The sequence prefix keeps outputs unique when two sources share a
    /// stem in different subdirectories, and keeps lexicographic order
    /// equal to discovery order.
    pub fn asset_path(&self, seq: usize, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        self.path.join(format!("{seq:05}-{stem}.jpg"))
    }

    /// Remove the whole scratch tree.
    ///
    /// Removal failure is logged and otherwise ignored; it is not a
    /// reportable run failure.
    pub fn cleanup(&self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove scratch directory {:?}: {e}", self.path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(root.path()).unwrap();
        assert!(scratch.path().is_dir());

        std::fs::write(scratch.path().join("00000-a.jpg"), b"x").unwrap();
        scratch.cleanup();
        assert!(!scratch.path().exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(root.path()).unwrap();
        scratch.cleanup();
        // A second cleanup of an already-removed tree must not panic
        scratch.cleanup();
    }

    #[test]
    fn test_asset_path_disambiguates_same_stem() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(root.path()).unwrap();

        let a = scratch.asset_path(0, Path::new("/photos/trip/cover.png"));
        let b = scratch.asset_path(1, Path::new("/photos/city/cover.png"));
        assert_ne!(a, b);
        assert!(a.file_name().unwrap().to_str().unwrap().ends_with("cover.jpg"));
        scratch.cleanup();
    }

    #[test]
    fn test_asset_path_sorts_in_sequence_order() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(root.path()).unwrap();

        let first = scratch.asset_path(9, Path::new("z.png"));
        let second = scratch.asset_path(10, Path::new("a.png"));
        // Zero-padded prefix keeps lexicographic order equal to sequence order
        assert!(first < second);
        scratch.cleanup();
    }

    #[test]
    fn test_runs_get_distinct_directories() {
        let root = tempfile::tempdir().unwrap();
        let one = ScratchDir::create(root.path()).unwrap();
        let two = ScratchDir::create(root.path()).unwrap();
        assert_ne!(one.path(), two.path());
        one.cleanup();
        two.cleanup();
    }
}
