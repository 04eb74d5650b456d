//! TOML-backed merchant settings.
//!
//! Reads the read-only settings record from a TOML file. The watermark
//! image is referenced by path (relative paths resolve against the settings
//! file's directory) and its bytes are loaded on every snapshot; settings
//! change rarely and the file is small.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use vitrin_core::error::{Result, VitrinError};
use vitrin_core::settings::{SettingsProvider, StoreSettings};
use vitrin_imaging::{Placement, WatermarkSpec};

/// Settings stored as a TOML file on disk.
pub struct TomlSettingsRepository {
    path: PathBuf,
}

impl TomlSettingsRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The conventional settings location under the platform config dir.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| VitrinError::config("could not determine config directory"))?;
        Ok(config_dir.join("vitrin").join("settings.toml"))
    }
}

#[async_trait]
impl SettingsProvider for TomlSettingsRepository {
    async fn load(&self) -> Result<StoreSettings> {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "settings file missing, using defaults");
            return Ok(StoreSettings::default());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let dto: SettingsDto = toml::from_str(&content)?;

        let base_dir = self.path.parent().unwrap_or(Path::new("."));
        let watermark = match dto.watermark {
            Some(wm) => Some(wm.into_spec(base_dir).await?),
            None => None,
        };

        Ok(StoreSettings {
            contact_links: dto.contact_links,
            keyword_guide: dto.keyword_guide,
            trend_signals: dto.trend_signals,
            channel_chat_id: dto.channel_chat_id,
            watermark,
        })
    }
}

#[derive(Deserialize)]
struct SettingsDto {
    #[serde(default)]
    contact_links: String,
    #[serde(default)]
    keyword_guide: String,
    #[serde(default)]
    trend_signals: Vec<String>,
    #[serde(default)]
    channel_chat_id: Option<String>,
    #[serde(default)]
    watermark: Option<WatermarkDto>,
}

#[derive(Deserialize)]
struct WatermarkDto {
    image_path: PathBuf,
    #[serde(default)]
    placement: Placement,
    scale_pct: Option<f32>,
    opacity: Option<f32>,
    padding_pct: Option<f32>,
}

impl WatermarkDto {
    async fn into_spec(self, base_dir: &Path) -> Result<WatermarkSpec> {
        let path = if self.image_path.is_absolute() {
            self.image_path
        } else {
            base_dir.join(self.image_path)
        };
        let image_bytes = tokio::fs::read(&path).await.map_err(|err| {
            VitrinError::config(format!(
                "failed to read watermark image {}: {err}",
                path.display()
            ))
        })?;

        let defaults = WatermarkSpec {
            image_bytes,
            placement: self.placement,
            scale_pct: 0.0,
            opacity: 0.0,
            padding_pct: 0.0,
        };
        Ok(WatermarkSpec {
            scale_pct: self.scale_pct.unwrap_or(20.0),
            opacity: self.opacity.unwrap_or(0.6),
            padding_pct: self.padding_pct.unwrap_or(4.0),
            ..defaults
        }
        .clamped())
    }
}
