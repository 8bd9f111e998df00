//! Progress reporting seam between the pipeline and its front-end.

use std::path::Path;
use std::time::Duration;

use crate::types::RunSummary;

/// Observer interface the pipeline reports progress to.
///
/// Every method defaults to a no-op so a front-end implements only what it
/// renders. The core depends on nothing about presentation beyond this
/// trait.
pub trait ProgressObserver: Send + Sync {
    /// Discovery finished with `count` candidate files.
    fn discovered(&self, count: usize) {
        let _ = count;
    }

    /// One more file has been normalized or skipped; `done` of `total`.
    fn normalize_progress(&self, done: usize, total: usize) {
        let _ = (done, total);
    }

    /// A source file was excluded from the run.
    fn file_skipped(&self, path: &Path) {
        let _ = path;
    }

    /// Images confirmed sent so far, out of all normalized assets.
    fn dispatch_progress(&self, sent: usize, total: usize) {
        let _ = (sent, total);
    }

    /// A batch reached its terminal failed state.
    fn batch_failed(&self, index: usize, len: usize) {
        let _ = (index, len);
    }

    /// The channel asked for a pause before the next attempt.
    fn rate_limited(&self, wait: Duration) {
        let _ = wait;
    }

    /// The run is over.
    fn run_finished(&self, summary: &RunSummary) {
        let _ = summary;
    }
}

/// Observer that ignores every event.
pub struct NullObserver;

impl ProgressObserver for NullObserver {}
