//! Merchant settings collaborator (read-only).

use crate::error::Result;
use async_trait::async_trait;
use vitrin_imaging::WatermarkSpec;

/// Read-only merchant configuration consumed by the tools: contact links
/// and keyword guide for the generator, trend signals for suggestions, the
/// announcement channel, and the optional upload watermark.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreSettings {
    pub contact_links: String,
    pub keyword_guide: String,
    pub trend_signals: Vec<String>,
    /// Chat id of the announcement channel, if one is configured
    pub channel_chat_id: Option<String>,
    pub watermark: Option<WatermarkSpec>,
}

/// Provides the current settings snapshot.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn load(&self) -> Result<StoreSettings>;
}
