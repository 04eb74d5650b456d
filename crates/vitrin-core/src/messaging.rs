//! Messaging transport collaborator.

use crate::error::Result;
use async_trait::async_trait;

/// Upper bound on items in one album send, imposed by the transport.
pub const ALBUM_LIMIT: usize = 10;

/// An abstract chat transport for announcements and replies.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Sends plain text to a chat.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()>;

    /// Sends a single photo with a caption.
    async fn send_photo(&self, chat_id: &str, url: &str, caption: &str) -> Result<()>;

    /// Sends up to [`ALBUM_LIMIT`] photos as one album. The transport does
    /// not support a caption spanning the group, so the caption is attached
    /// to the first item only.
    async fn send_album(&self, chat_id: &str, urls: &[String], caption: &str) -> Result<()>;
}
