//! In-memory session store with idle TTL eviction.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use vitrin_core::draft::ProductDraft;
use vitrin_core::error::Result;
use vitrin_core::session::SessionStore;

/// Default idle TTL for a conversation draft.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

struct Entry {
    draft: ProductDraft,
    touched_at: Instant,
}

/// Keyed in-memory storage of one draft per conversation id.
///
/// Expired or absent keys load as a fresh empty draft, never an error.
/// Saves overwrite wholesale and refresh the TTL; a save also sweeps any
/// entries whose TTL elapsed. There is no per-key locking: two concurrent
/// turns for the same id race and the last save wins.
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl MemorySessionStore {
    /// Creates a store with the given idle TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of live (unexpired) sessions.
    pub async fn len(&self) -> usize {
        let ttl = self.ttl;
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|entry| entry.touched_at.elapsed() < ttl)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<ProductDraft> {
        let entries = self.entries.read().await;
        match entries.get(session_id) {
            Some(entry) if entry.touched_at.elapsed() < self.ttl => Ok(entry.draft.clone()),
            Some(_) => {
                tracing::debug!(session_id, "session expired, starting fresh draft");
                Ok(ProductDraft::default())
            }
            None => Ok(ProductDraft::default()),
        }
    }

    async fn save(&self, session_id: &str, draft: &ProductDraft) -> Result<()> {
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.touched_at.elapsed() < ttl);
        entries.insert(
            session_id.to_string(),
            Entry {
                draft: draft.clone(),
                touched_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(session_id);
        Ok(())
    }
}
