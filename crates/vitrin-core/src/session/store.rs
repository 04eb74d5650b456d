//! Session store trait.
//!
//! Defines the interface for per-conversation draft persistence.

use crate::draft::ProductDraft;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract store holding one draft per conversation id with a fixed
/// idle TTL.
///
/// No read-modify-write atomicity is provided: a caller must load, mutate
/// locally, then save within the same turn. Two concurrent turns for the
/// same id race and the last save wins.
///
/// Implementations must return a fresh empty draft for absent or expired
/// keys, never an error; errors are reserved for the store itself being
/// unavailable, which aborts the turn.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the draft for a conversation.
    ///
    /// # Returns
    ///
    /// - `Ok(draft)`: the stored draft, or an empty default when the key is
    ///   absent or its TTL has elapsed
    /// - `Err(_)`: the store is unavailable
    async fn load(&self, session_id: &str) -> Result<ProductDraft>;

    /// Overwrites the draft for a conversation and refreshes its TTL.
    async fn save(&self, session_id: &str, draft: &ProductDraft) -> Result<()>;

    /// Deletes the session. Deleting an absent session is not an error.
    async fn delete(&self, session_id: &str) -> Result<()>;
}
