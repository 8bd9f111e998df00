//! Albumup Core - batch image upload pipeline for messaging channels.
//!
//! Takes a directory of images, normalizes each into a bounded JPEG, groups
//! them into fixed-size albums, and posts them to a channel one album at a
//! time, pacing itself against the channel's rate limits.
//!
//! # Architecture
//!
//! ```text
//! Discover → Normalize → Batch → {Dispatch ⇄ Delay control} → Cleanup
//! ```
//!
//! The pipeline reports progress through [`ProgressObserver`] and talks to
//! the wire only through [`ChannelTransport`], so front-ends and transports
//! stay out of the core.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use albumup_core::{Config, NullObserver, TelegramTransport, Uploader};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> albumup_core::Result<()> {
//!     let config = Config::load()?;
//!     let transport = Arc::new(TelegramTransport::new("BOT_TOKEN"));
//!     let uploader = Uploader::new(config, transport);
//!
//!     let summary = uploader
//!         .run("./photos".as_ref(), "@my_channel", &NullObserver, &CancellationToken::new())
//!         .await?;
//!     println!("Sent {} of {}", summary.sent, summary.discovered);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod observer;
pub mod pipeline;
pub mod scratch;
pub mod transport;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    AlbumupError, ConfigError, PipelineError, PipelineResult, Result, TransportError,
};
pub use observer::{NullObserver, ProgressObserver};
pub use pipeline::{DelayController, Dispatcher, FileDiscovery, Normalizer, Uploader};
pub use scratch::ScratchDir;
pub use transport::{AlbumItem, ChannelTransport, TelegramTransport};
pub use types::{Batch, DispatchOutcome, NormalizedAsset, RunSummary, SourceImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
