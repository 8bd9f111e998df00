//! Logging initialization: stderr for humans, a run log file for the record.
//!
//! Uses the `tracing` ecosystem. Stderr gets pretty (or JSON) output
//! filtered by `RUST_LOG`/verbosity; the run log file, when configured,
//! receives one append-only `timestamp | LEVEL | message` line per event.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

/// One event per line: `timestamp | LEVEL | message`.
struct PipeFormat;

impl<S, N> FormatEvent<S, N> for PipeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        // WARNING rather than WARN, matching the historical log format
        let level = match *event.metadata().level() {
            Level::ERROR => "ERROR",
            Level::WARN => "WARNING",
            Level::INFO => "INFO",
            Level::DEBUG => "DEBUG",
            Level::TRACE => "TRACE",
        };
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        write!(writer, "{now} | {level} | ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `verbose` - If true, enables DEBUG level logging; otherwise INFO level.
/// * `json_format` - If true, stderr output is structured JSON.
/// * `log_file` - Append-only run log path; `None` disables the file sink.
///
/// # Notes
///
/// - Stderr is the human-facing sink; the file keeps the durable record
/// - The RUST_LOG environment variable can override the log level
pub fn init(verbose: bool, json_format: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let run_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(Arc::new(file))
        }
        None => None,
    };

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(run_log.map(|file| {
                fmt::layer()
                    .event_format(PipeFormat)
                    .with_ansi(false)
                    .with_writer(file)
                    .with_filter(EnvFilter::new("info"))
            }))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .with(run_log.map(|file| {
                fmt::layer()
                    .event_format(PipeFormat)
                    .with_ansi(false)
                    .with_writer(file)
                    .with_filter(EnvFilter::new("info"))
            }))
            .init();
    }
    Ok(())
}

/// Initialize logging with settings from the config file, honoring CLI
/// overrides.
pub fn init_from_config(
    config: &albumup_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) -> anyhow::Result<()> {
    let verbose =
        verbose_override || config.logging.level == "debug" || config.logging.level == "trace";
    let log_file = (!config.logging.file.is_empty()).then(|| PathBuf::from(&config.logging.file));
    init(verbose, json_logs_override, log_file.as_deref())
}
