//! Upload pipeline stages.
//!
//! - **discovery**: find candidate images under the upload root
//! - **normalize**: decode, bound, and re-encode into scratch storage
//! - **batch**: partition assets into album-sized groups
//! - **delay**: adaptive inter-batch pacing
//! - **dispatch**: rate-aware, retrying album sends
//! - **uploader**: orchestrates the full run

pub mod batch;
pub mod delay;
pub mod discovery;
pub mod dispatch;
pub mod normalize;
pub mod uploader;

// Re-exports for convenient access
pub use batch::into_batches;
pub use delay::DelayController;
pub use discovery::FileDiscovery;
pub use dispatch::{backoff_duration, BatchResult, DispatchStats, Dispatcher};
pub use normalize::Normalizer;
pub use uploader::Uploader;
