//! Albumup CLI - bulk image upload to a messaging channel, one album at a time.
//!
//! Albumup walks a folder of images, re-encodes each into a bounded JPEG,
//! and posts them to a channel in fixed-size albums, adapting its pace to
//! the channel's rate limits.
//!
//! # Usage
//!
//! ```bash
//! # Upload a folder as 10-image albums
//! albumup upload ./photos --channel @my_channel
//!
//! # Smaller albums, more patient pacing
//! albumup upload ./photos --channel -1001234567890 --album-size 5 --delay-floor 30
//!
//! # View configuration
//! albumup config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Albumup - bulk image upload to a messaging channel.
#[derive(Parser, Debug)]
#[command(name = "albumup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output stderr logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a directory of images to a channel as albums
    Upload(cli::upload::UploadArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI overrides.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match albumup_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `albumup config path`."
            );
            albumup_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs)?;

    tracing::debug!("albumup v{}", albumup_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Upload(args) => cli::upload::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
