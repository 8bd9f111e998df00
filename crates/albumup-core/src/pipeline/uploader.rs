//! Run orchestration - wires together all pipeline stages.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::observer::ProgressObserver;
use crate::scratch::ScratchDir;
use crate::transport::ChannelTransport;
use crate::types::{NormalizedAsset, RunSummary, SourceImage};

use super::batch::into_batches;
use super::delay::DelayController;
use super::discovery::FileDiscovery;
use super::dispatch::Dispatcher;
use super::normalize::Normalizer;

/// The batch-upload pipeline, end to end.
///
/// Discovery → normalization → batching → dispatch → cleanup, strictly
/// sequential: one batch resolves before the next begins.
pub struct Uploader {
    config: Config,
    discovery: FileDiscovery,
    normalizer: Normalizer,
    dispatcher: Dispatcher,
}

impl Uploader {
    /// Create an uploader over the given transport.
    pub fn new(config: Config, transport: Arc<dyn ChannelTransport>) -> Self {
        Self {
            discovery: FileDiscovery::new(config.processing.clone()),
            normalizer: Normalizer::new(config.normalize.clone()),
            dispatcher: Dispatcher::new(transport, config.dispatch.clone()),
            config,
        }
    }

    /// Run the full pipeline against `root`, posting to `channel`.
    ///
    /// Always completes with a summary unless the root is missing. Partial
    /// failures reduce the sent count but never abort the run; `cancel`
    /// stops the run cooperatively between steps.
    pub async fn run(
        &self,
        root: &Path,
        channel: &str,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        let sources = self.discovery.discover(root)?;
        observer.discovered(sources.len());
        tracing::info!(
            "Discovered {} candidate image(s) under {:?}",
            sources.len(),
            root
        );

        if sources.is_empty() {
            let summary = RunSummary::default();
            tracing::info!("No images found; nothing to do");
            observer.run_finished(&summary);
            return Ok(summary);
        }

        let scratch = ScratchDir::create(&self.config.scratch_root())?;
        let assets = self
            .normalize_all(&sources, &scratch, observer, cancel)
            .await;

        let mut summary = RunSummary {
            discovered: sources.len(),
            normalized: assets.len(),
            ..Default::default()
        };

        if assets.is_empty() {
            scratch.cleanup();
            tracing::info!("No images left after normalization; nothing to send");
            observer.run_finished(&summary);
            return Ok(summary);
        }

        let batches = into_batches(assets, self.config.dispatch.album_size);
        tracing::info!(
            "Sending {} image(s) to {channel} in {} album(s)",
            summary.normalized,
            batches.len()
        );

        let mut delay = DelayController::new(&self.config.delay);
        let stats = self
            .dispatcher
            .dispatch_all(
                &batches,
                channel,
                &mut delay,
                summary.normalized,
                observer,
                cancel,
            )
            .await;
        summary.sent = stats.sent_assets;
        summary.failed = stats.failed_assets;

        scratch.cleanup();
        tracing::info!(
            "Run finished: {} discovered, {} normalized, {} sent, {} failed",
            summary.discovered,
            summary.normalized,
            summary.sent,
            summary.failed
        );
        observer.run_finished(&summary);
        Ok(summary)
    }

    /// Normalize every source in discovery order, skipping failures.
    async fn normalize_all(
        &self,
        sources: &[SourceImage],
        scratch: &ScratchDir,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Vec<NormalizedAsset> {
        let mut assets = Vec::with_capacity(sources.len());

        for (seq, source) in sources.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!("Cancelled during normalization");
                break;
            }

            match self.normalizer.normalize(source, scratch, seq).await {
                Ok(asset) => assets.push(asset),
                Err(e @ PipelineError::Unsupported { .. }) => {
                    tracing::warn!("{e}");
                    observer.file_skipped(&source.path);
                }
                Err(e) => {
                    tracing::error!("{e}");
                    observer.file_skipped(&source.path);
                }
            }
            observer.normalize_progress(seq + 1, sources.len());
        }

        assets
    }
}
