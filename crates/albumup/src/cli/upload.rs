//! The `albumup upload` command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use albumup_core::{Config, ProgressObserver, RunSummary, TelegramTransport, Uploader};

/// Arguments for the `upload` command.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Directory of images to upload
    #[arg(required = true)]
    pub root: PathBuf,

    /// Channel or chat to post to (e.g. "@my_channel" or "-1001234567890")
    #[arg(short, long)]
    pub channel: String,

    /// Bot token (falls back to the ALBUMUP_BOT_TOKEN environment variable)
    #[arg(long, env = "ALBUMUP_BOT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Images per album (1-10)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub album_size: Option<u8>,

    /// Minimum delay between albums, in seconds
    #[arg(long)]
    pub delay_floor: Option<u64>,

    /// Maximum delay between albums, in seconds
    #[arg(long)]
    pub delay_ceiling: Option<u64>,

    /// How far the delay moves after each album, in seconds
    #[arg(long)]
    pub delay_step: Option<u64>,
}

/// Execute the upload command.
pub async fn execute(args: UploadArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(n) = args.album_size {
        config.dispatch.album_size = n as usize;
    }
    if let Some(s) = args.delay_floor {
        config.delay.floor_s = s;
    }
    if let Some(s) = args.delay_ceiling {
        config.delay.ceiling_s = s;
    }
    if let Some(s) = args.delay_step {
        config.delay.step_s = s;
    }
    if config.delay.floor_s == 0 || config.delay.step_s == 0 {
        anyhow::bail!("delay floor and step must be positive");
    }
    if config.delay.floor_s > config.delay.ceiling_s {
        anyhow::bail!(
            "delay floor ({}s) must not exceed ceiling ({}s)",
            config.delay.floor_s,
            config.delay.ceiling_s
        );
    }

    // Ctrl-C requests a cooperative stop between pipeline steps
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received; stopping after the current step");
            interrupt.cancel();
        }
    });

    let transport = Arc::new(TelegramTransport::new(&args.token));
    let uploader = Uploader::new(config, transport);
    let observer = ProgressBars::new();

    let summary = uploader
        .run(&args.root, &args.channel, &observer, &cancel)
        .await?;

    observer.clear();
    print_summary(&summary);
    Ok(())
}

// ── Progress rendering ─────────────────────────────────────────────────────

/// Renders pipeline progress as indicatif bars.
struct ProgressBars {
    multi: MultiProgress,
    normalize: ProgressBar,
    upload: ProgressBar,
}

impl ProgressBars {
    fn new() -> Self {
        let multi = MultiProgress::new();
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap()
            .progress_chars("##-");

        let normalize = multi.add(
            ProgressBar::new(0)
                .with_style(style.clone())
                .with_message("normalizing"),
        );
        let upload = multi.add(ProgressBar::new(0).with_style(style).with_message("uploading"));

        Self {
            multi,
            normalize,
            upload,
        }
    }

    fn clear(&self) {
        self.normalize.finish_and_clear();
        self.upload.finish_and_clear();
        let _ = self.multi.clear();
    }
}

impl ProgressObserver for ProgressBars {
    fn discovered(&self, count: usize) {
        self.normalize.set_length(count as u64);
    }

    fn normalize_progress(&self, done: usize, total: usize) {
        self.normalize.set_length(total as u64);
        self.normalize.set_position(done as u64);
    }

    fn dispatch_progress(&self, sent: usize, total: usize) {
        self.upload.set_length(total as u64);
        self.upload.set_position(sent as u64);
        self.upload.set_message("uploading");
    }

    fn rate_limited(&self, wait: std::time::Duration) {
        self.upload
            .set_message(format!("rate limited, waiting {}s", wait.as_secs()));
    }

    fn batch_failed(&self, index: usize, len: usize) {
        self.upload
            .set_message(format!("album {} failed ({len} image(s))", index + 1));
    }
}

/// Print a formatted summary table after the run.
fn print_summary(summary: &RunSummary) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Discovered:   {:>8}", summary.discovered);
    eprintln!("    Normalized:   {:>8}", summary.normalized);
    eprintln!("    Sent:         {:>8}", summary.sent);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    let skipped = summary.discovered - summary.normalized;
    if skipped > 0 {
        eprintln!("    Skipped:      {:>8}", skipped);
    }
    eprintln!("  ====================================");
}
