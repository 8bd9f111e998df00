//! Rate-aware batch dispatch with failure classification and retries.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::DispatchConfig;
use crate::error::TransportError;
use crate::observer::ProgressObserver;
use crate::transport::{AlbumItem, ChannelTransport};
use crate::types::{Batch, DispatchOutcome};

use super::delay::DelayController;

/// Terminal state of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchResult {
    /// Every asset in the batch was confirmed sent.
    Sent,
    /// The batch failed terminally; the run continues with the next one.
    Failed,
    /// The run was cancelled before the batch resolved.
    Cancelled,
}

/// Totals across all dispatched batches.
#[derive(Debug, Clone, Default)]
pub struct DispatchStats {
    /// Images confirmed sent
    pub sent_assets: usize,
    /// Images in batches that reached terminal failure
    pub failed_assets: usize,
}

/// Sends batches to the channel one at a time, in order.
///
/// Retry policy per batch: rate limits retry the same batch without bound,
/// each retry gated on the server's suggested wait (or the configured
/// default); network failures retry with exponential backoff up to a
/// bounded attempt count; protocol rejections are terminal immediately.
pub struct Dispatcher {
    transport: Arc<dyn ChannelTransport>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn ChannelTransport>, config: DispatchConfig) -> Self {
        Self { transport, config }
    }

    /// Dispatch every batch in order, pacing between batches with `delay`.
    ///
    /// A failed batch is recorded and does not stop the run. Progress is
    /// advanced only for confirmed sends, in batch order.
    pub async fn dispatch_all(
        &self,
        batches: &[Batch],
        channel: &str,
        delay: &mut DelayController,
        total_assets: usize,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> DispatchStats {
        let mut stats = DispatchStats::default();

        for (i, batch) in batches.iter().enumerate() {
            match self.dispatch_batch(batch, channel, delay, observer, cancel).await {
                BatchResult::Sent => {
                    for asset in &batch.assets {
                        if let Err(e) = tokio::fs::remove_file(&asset.path).await {
                            tracing::warn!("Failed to remove sent asset {:?}: {e}", asset.path);
                        }
                        stats.sent_assets += 1;
                        observer.dispatch_progress(stats.sent_assets, total_assets);
                    }
                    tracing::info!(
                        "Album {}/{} sent ({} image(s))",
                        batch.index + 1,
                        batches.len(),
                        batch.len()
                    );
                }
                BatchResult::Failed => {
                    stats.failed_assets += batch.len();
                    observer.batch_failed(batch.index, batch.len());
                    tracing::error!(
                        "Album {}/{} failed ({} image(s) not sent)",
                        batch.index + 1,
                        batches.len(),
                        batch.len()
                    );
                }
                BatchResult::Cancelled => {
                    tracing::info!("Cancelled before album {} resolved", batch.index + 1);
                    break;
                }
            }

            // Pace between albums; never before the first or after the last
            if i + 1 < batches.len() {
                tokio::time::sleep(delay.current()).await;
            }
        }

        stats
    }

    /// Resolve one batch through the retry state machine.
    async fn dispatch_batch(
        &self,
        batch: &Batch,
        channel: &str,
        delay: &mut DelayController,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> BatchResult {
        let mut network_failures = 0u32;

        loop {
            if cancel.is_cancelled() {
                return BatchResult::Cancelled;
            }

            // Asset bytes live for exactly one attempt and drop on every
            // exit path, never held across a retry sleep.
            let items = match self.load_batch(batch).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!("Album {}: cannot read assets: {e}", batch.index + 1);
                    return BatchResult::Failed;
                }
            };

            let outcome = match self.transport.send_album(channel, items).await {
                Ok(()) => DispatchOutcome::Sent,
                Err(TransportError::RateLimited { retry_after }) => {
                    DispatchOutcome::RateLimited { retry_after }
                }
                Err(TransportError::Network { message }) => {
                    tracing::warn!("Album {}: network failure: {message}", batch.index + 1);
                    DispatchOutcome::NetworkFailure
                }
                Err(TransportError::Protocol { message }) => {
                    tracing::error!("Album {}: rejected by channel: {message}", batch.index + 1);
                    DispatchOutcome::ProtocolFailure
                }
            };
            delay.record(&outcome);

            match outcome {
                DispatchOutcome::Sent => return BatchResult::Sent,
                DispatchOutcome::RateLimited { retry_after } => {
                    let wait = Duration::from_secs(
                        retry_after.unwrap_or(self.config.default_rate_limit_wait_s),
                    );
                    tracing::warn!(
                        "Rate limited; waiting {}s before retrying album {}",
                        wait.as_secs(),
                        batch.index + 1
                    );
                    observer.rate_limited(wait);
                    tokio::time::sleep(wait).await;
                }
                DispatchOutcome::NetworkFailure => {
                    network_failures += 1;
                    if network_failures >= self.config.max_network_attempts {
                        tracing::error!(
                            "Album {}: giving up after {network_failures} network failures",
                            batch.index + 1
                        );
                        return BatchResult::Failed;
                    }
                    let backoff =
                        backoff_duration(network_failures - 1, self.config.backoff_base_ms);
                    tracing::info!("Retrying album {} in {:?}", batch.index + 1, backoff);
                    tokio::time::sleep(backoff).await;
                }
                DispatchOutcome::ProtocolFailure => return BatchResult::Failed,
            }
        }
    }

    /// Read every asset's bytes for a single send attempt.
    async fn load_batch(&self, batch: &Batch) -> Result<Vec<AlbumItem>, std::io::Error> {
        let mut items = Vec::with_capacity(batch.assets.len());
        for asset in &batch.assets {
            let bytes = tokio::fs::read(&asset.path).await?;
            let file_name = asset
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image.jpg")
                .to_string();
            items.push(AlbumItem { file_name, bytes });
        }
        Ok(items)
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DelayConfig;
    use crate::observer::NullObserver;
    use crate::types::NormalizedAsset;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// A configurable mock transport for testing dispatcher behavior.
    ///
    /// Each call to `send_album` invokes the response factory with the
    /// current call index, allowing callers to script a different result
    /// per attempt.
    struct MockTransport {
        response_fn: Box<dyn Fn(u32) -> Result<(), TransportError> + Send + Sync>,
        call_count: Arc<AtomicU32>,
        item_counts: Mutex<Vec<usize>>,
    }

    impl MockTransport {
        fn scripted<F>(f: F) -> Self
        where
            F: Fn(u32) -> Result<(), TransportError> + Send + Sync + 'static,
        {
            Self {
                response_fn: Box::new(f),
                call_count: Arc::new(AtomicU32::new(0)),
                item_counts: Mutex::new(Vec::new()),
            }
        }

        fn always_ok() -> Self {
            Self::scripted(|_| Ok(()))
        }

        fn call_count_handle(&self) -> Arc<AtomicU32> {
            self.call_count.clone()
        }
    }

    #[async_trait]
    impl ChannelTransport for MockTransport {
        fn name(&self) -> &str {
            "mock"
        }

        async fn send_album(
            &self,
            _channel: &str,
            items: Vec<AlbumItem>,
        ) -> Result<(), TransportError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.item_counts.lock().unwrap().push(items.len());
            (self.response_fn)(idx)
        }
    }

    /// Observer that records dispatch progress and batch failures.
    #[derive(Default)]
    struct Recorder {
        progress: Mutex<Vec<(usize, usize)>>,
        failed: Mutex<Vec<usize>>,
    }

    impl ProgressObserver for Recorder {
        fn dispatch_progress(&self, sent: usize, total: usize) {
            self.progress.lock().unwrap().push((sent, total));
        }

        fn batch_failed(&self, index: usize, _len: usize) {
            self.failed.lock().unwrap().push(index);
        }
    }

    /// Write `n` dummy asset files into `dir` and wrap them in a batch.
    fn batch_with_files(dir: &Path, index: usize, n: usize) -> Batch {
        let assets = (0..n)
            .map(|i| {
                let path = dir.join(format!("{:05}-img{index}.jpg", index * 100 + i));
                std::fs::write(&path, b"jpegbytes").unwrap();
                NormalizedAsset {
                    path,
                    size: 9,
                    width: 10,
                    height: 10,
                }
            })
            .collect();
        Batch { index, assets }
    }

    fn delay_20_120_5() -> DelayController {
        DelayController::new(&DelayConfig {
            floor_s: 20,
            ceiling_s: 120,
            step_s: 5,
        })
    }

    fn fast_config() -> DispatchConfig {
        DispatchConfig {
            album_size: 10,
            max_network_attempts: 3,
            backoff_base_ms: 100,
            default_rate_limit_wait_s: 5,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sent_batches_delete_assets_and_advance_progress() {
        let dir = tempfile::tempdir().unwrap();
        let batches = vec![
            batch_with_files(dir.path(), 0, 2),
            batch_with_files(dir.path(), 1, 1),
        ];

        let transport = Arc::new(MockTransport::always_ok());
        let dispatcher = Dispatcher::new(transport, fast_config());
        let observer = Recorder::default();
        let mut delay = delay_20_120_5();

        let stats = dispatcher
            .dispatch_all(
                &batches,
                "@chan",
                &mut delay,
                3,
                &observer,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(stats.sent_assets, 3);
        assert_eq!(stats.failed_assets, 0);
        for batch in &batches {
            for asset in &batch.assets {
                assert!(!asset.path.exists(), "sent asset should be deleted");
            }
        }
        // Progress advanced one per asset, in order
        assert_eq!(
            *observer.progress.lock().unwrap(),
            vec![(1, 3), (2, 3), (3, 3)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_same_batch_then_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let batches = vec![batch_with_files(dir.path(), 0, 2)];

        // First attempt rate-limited with a 5s hint, second succeeds
        let transport = Arc::new(MockTransport::scripted(|idx| {
            if idx == 0 {
                Err(TransportError::RateLimited {
                    retry_after: Some(5),
                })
            } else {
                Ok(())
            }
        }));
        let calls = transport.call_count_handle();
        let dispatcher = Dispatcher::new(transport, fast_config());
        let mut delay = delay_20_120_5();

        let stats = dispatcher
            .dispatch_all(
                &batches,
                "@chan",
                &mut delay,
                2,
                &NullObserver,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(stats.sent_assets, 2);
        // 20 → 25 on the rate limit, 25 → 20 on the send
        assert_eq!(delay.current(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failures_exhaust_into_failed_batch() {
        let dir = tempfile::tempdir().unwrap();
        let batches = vec![
            batch_with_files(dir.path(), 0, 2),
            batch_with_files(dir.path(), 1, 1),
        ];

        // Batch 0 always times out; batch 1 (attempt index 3) succeeds
        let transport = Arc::new(MockTransport::scripted(|idx| {
            if idx < 3 {
                Err(TransportError::Network {
                    message: "connection timed out".to_string(),
                })
            } else {
                Ok(())
            }
        }));
        let calls = transport.call_count_handle();
        let dispatcher = Dispatcher::new(transport, fast_config());
        let observer = Recorder::default();
        let mut delay = delay_20_120_5();

        let stats = dispatcher
            .dispatch_all(
                &batches,
                "@chan",
                &mut delay,
                3,
                &observer,
                &CancellationToken::new(),
            )
            .await;

        // 3 network attempts for batch 0, then 1 successful for batch 1
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(stats.failed_assets, 2);
        assert_eq!(stats.sent_assets, 1);
        assert_eq!(*observer.failed.lock().unwrap(), vec![0]);
        // Failed batch keeps its scratch files for cleanup to remove
        assert!(batches[0].assets[0].path.exists());
        assert!(!batches[1].assets[0].path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_protocol_failure_is_terminal_without_retry() {
        let dir = tempfile::tempdir().unwrap();
        let batches = vec![
            batch_with_files(dir.path(), 0, 3),
            batch_with_files(dir.path(), 1, 2),
        ];

        let transport = Arc::new(MockTransport::scripted(|idx| {
            if idx == 0 {
                Err(TransportError::Protocol {
                    message: "chat not found".to_string(),
                })
            } else {
                Ok(())
            }
        }));
        let calls = transport.call_count_handle();
        let dispatcher = Dispatcher::new(transport, fast_config());
        let observer = Recorder::default();
        let mut delay = delay_20_120_5();

        let stats = dispatcher
            .dispatch_all(
                &batches,
                "@chan",
                &mut delay,
                5,
                &observer,
                &CancellationToken::new(),
            )
            .await;

        // Exactly one attempt for the rejected batch, run continues
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(stats.failed_assets, 3);
        assert_eq!(stats.sent_assets, 2);
        assert_eq!(*observer.failed.lock().unwrap(), vec![0]);
        // Protocol rejection does not move the delay
        assert_eq!(delay.current(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_before_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let batches = vec![batch_with_files(dir.path(), 0, 1)];

        let transport = Arc::new(MockTransport::always_ok());
        let calls = transport.call_count_handle();
        let dispatcher = Dispatcher::new(transport, fast_config());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut delay = delay_20_120_5();

        let stats = dispatcher
            .dispatch_all(&batches, "@chan", &mut delay, 1, &NullObserver, &cancel)
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(stats.sent_assets, 0);
        assert_eq!(stats.failed_assets, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_without_hint_uses_default_wait() {
        let dir = tempfile::tempdir().unwrap();
        let batches = vec![batch_with_files(dir.path(), 0, 1)];

        let transport = Arc::new(MockTransport::scripted(|idx| {
            if idx == 0 {
                Err(TransportError::RateLimited { retry_after: None })
            } else {
                Ok(())
            }
        }));
        let dispatcher = Dispatcher::new(transport, fast_config());
        let mut delay = delay_20_120_5();

        let start = tokio::time::Instant::now();
        let stats = dispatcher
            .dispatch_all(
                &batches,
                "@chan",
                &mut delay,
                1,
                &NullObserver,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(stats.sent_assets, 1);
        // The configured 5s default elapsed before the retry
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_whole_album_sent_as_one_call() {
        let dir = tempfile::tempdir().unwrap();
        let batches = vec![batch_with_files(dir.path(), 0, 4)];

        let transport = Arc::new(MockTransport::always_ok());
        let dispatcher = Dispatcher::new(Arc::clone(&transport) as Arc<dyn ChannelTransport>, fast_config());
        let mut delay = delay_20_120_5();

        dispatcher
            .dispatch_all(
                &batches,
                "@chan",
                &mut delay,
                4,
                &NullObserver,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(*transport.item_counts.lock().unwrap(), vec![4]);
    }

    #[test]
    fn test_backoff_exponential() {
        assert_eq!(backoff_duration(0, 1000), Duration::from_millis(1000));
        assert_eq!(backoff_duration(1, 1000), Duration::from_millis(2000));
        assert_eq!(backoff_duration(2, 1000), Duration::from_millis(4000));
        assert_eq!(backoff_duration(3, 1000), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_capped_at_30s() {
        assert_eq!(backoff_duration(10, 1000), Duration::from_millis(30_000));
    }
}
