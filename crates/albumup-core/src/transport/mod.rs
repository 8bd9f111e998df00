//! Channel transport abstraction.
//!
//! The dispatcher sees the remote channel through [`ChannelTransport`]
//! only: one operation that posts an ordered album and yields success or
//! one of the [`TransportError`] classes. Everything else about the wire
//! protocol stays behind the implementation.
//!
//! [`TransportError`]: crate::error::TransportError

pub mod telegram;

pub use telegram::TelegramTransport;

use crate::error::TransportError;
use async_trait::async_trait;

/// One image payload within an album post.
#[derive(Debug, Clone)]
pub struct AlbumItem {
    /// File name reported to the channel
    pub file_name: String,
    /// Encoded image bytes
    pub bytes: Vec<u8>,
}

/// Trait implemented by channel transports.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the dispatcher holds an `Arc<dyn ChannelTransport>`).
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Transport name for logging (e.g., "telegram").
    fn name(&self) -> &str;

    /// Post `items` to `channel` as a single multi-item album.
    ///
    /// Items arrive in order and the album posts or fails as one unit.
    async fn send_album(
        &self,
        channel: &str,
        items: Vec<AlbumItem>,
    ) -> Result<(), TransportError>;
}
