//! Raw image fetching.

use crate::error::Result;
use async_trait::async_trait;

/// Fetches raw image bytes from a URL.
///
/// Kept behind a trait so the optimize tool's per-session fetch cache can
/// be exercised without network access.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
