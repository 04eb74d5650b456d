//! Content-generation collaborator.
//!
//! The external service that turns a raw draft into SEO copy, suggests
//! product ideas from trend signals, and writes channel-post text. Consumed
//! through this trait only; the HTTP client lives in `vitrin-infrastructure`.

use crate::commerce::CatalogEntry;
use crate::draft::{GeneratedContent, ProductDraft};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Store-level context sent alongside the draft so the generator can write
/// grounded copy: contact links for the description footer, the merchant's
/// keyword guide, the category list to pick from, and recent search-trend
/// signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoreContext {
    pub contact_links: String,
    pub keyword_guide: String,
    #[serde(default)]
    pub category_names: Vec<String>,
    #[serde(default)]
    pub trend_signals: Vec<String>,
}

/// One ranked product idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub reason: String,
}

/// An abstract client for the content-generation service.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generates the full content block for a draft. Replaces any previous
    /// generation wholesale; partial results are never returned.
    async fn generate(&self, draft: &ProductDraft, context: &StoreContext)
    -> Result<GeneratedContent>;

    /// Suggests three ranked product ideas from trend signals.
    async fn suggest(&self, trend_signals: &[String]) -> Result<Vec<Suggestion>>;

    /// Writes channel-post text for an existing entry.
    async fn generate_post(
        &self,
        entry: &CatalogEntry,
        topic: &str,
        tone: Option<&str>,
    ) -> Result<String>;
}
