//! The mutable in-progress record of one authoring conversation.
//!
//! A `ProductDraft` accumulates merchant-supplied fields across turns until
//! the optimize tool can run, then carries the generated content until the
//! entry is saved to the commerce store. The orchestrator owns the working
//! copy during a turn; the session store owns the serialized form between
//! turns.

use serde::{Deserialize, Serialize};

/// One in-progress catalog entry, keyed by conversation id at the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProductDraft {
    /// Product name as the merchant typed it
    pub raw_name: Option<String>,
    /// Price in minor currency units
    pub price_minor: Option<i64>,
    /// Material, if supplied or read from an edited entry's attributes
    pub material: Option<String>,
    /// Localized display name, if distinct from `raw_name`
    pub localized_name: Option<String>,
    /// SEO focus keywords
    #[serde(default)]
    pub focus_keywords: Vec<String>,
    /// Product photos, staged this session or copied from an edited entry
    #[serde(default)]
    pub images: Vec<ImageRef>,
    /// Output of the last optimize call. Only the optimize tool writes this,
    /// and only when name, price and at least one image were present.
    pub generated: Option<GeneratedContent>,
    /// Set when the conversation edits an existing catalog entry
    pub edit_target_id: Option<u64>,
}

impl ProductDraft {
    /// True when no field has been supplied yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the optimize tool's precondition is satisfied.
    pub fn ready_for_optimize(&self) -> bool {
        self.raw_name.is_some() && self.price_minor.is_some() && !self.images.is_empty()
    }

    /// Names of the required fields still missing for optimization.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.raw_name.is_none() {
            missing.push("name");
        }
        if self.price_minor.is_none() {
            missing.push("price");
        }
        if self.images.is_empty() {
            missing.push("photo");
        }
        missing
    }

    /// Merges the non-empty fields of `patch` into the draft and returns the
    /// names of the fields that were updated. Fields absent from the patch
    /// are left untouched; there is no cross-field validation.
    pub fn apply(&mut self, patch: DetailPatch) -> Vec<&'static str> {
        let mut touched = Vec::new();
        if let Some(name) = patch.raw_name {
            self.raw_name = Some(name);
            touched.push("name");
        }
        if let Some(price) = patch.price_minor {
            self.price_minor = Some(price);
            touched.push("price");
        }
        if let Some(material) = patch.material {
            self.material = Some(material);
            touched.push("material");
        }
        if let Some(localized) = patch.localized_name {
            self.localized_name = Some(localized);
            touched.push("localized name");
        }
        if let Some(keywords) = patch.focus_keywords {
            self.focus_keywords = keywords;
            touched.push("keywords");
        }
        if !patch.images.is_empty() {
            self.images.extend(patch.images);
            touched.push("photos");
        }
        touched
    }

    /// The best name available for display: generated, localized, or raw.
    pub fn display_name(&self) -> Option<&str> {
        self.generated
            .as_ref()
            .map(|g| g.name.as_str())
            .or(self.localized_name.as_deref())
            .or(self.raw_name.as_deref())
    }
}

/// A partial update to a draft. Only present fields are merged; `images`
/// are appended rather than replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DetailPatch {
    pub raw_name: Option<String>,
    pub price_minor: Option<i64>,
    pub material: Option<String>,
    pub localized_name: Option<String>,
    pub focus_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

impl DetailPatch {
    /// True when the patch carries nothing to merge.
    pub fn is_empty(&self) -> bool {
        self.raw_name.is_none()
            && self.price_minor.is_none()
            && self.material.is_none()
            && self.localized_name.is_none()
            && self.focus_keywords.is_none()
            && self.images.is_empty()
    }
}

/// One product photo.
///
/// An image without `external_id` has not been persisted to the commerce
/// store yet. `is_new_upload` distinguishes images staged this session from
/// ones already attached to an entry being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub external_id: Option<u64>,
    pub source: ImageSource,
    pub alt_text: Option<String>,
    pub is_new_upload: bool,
}

impl ImageRef {
    /// An image freshly uploaded in this conversation.
    pub fn staged(bytes: Vec<u8>) -> Self {
        Self {
            external_id: None,
            source: ImageSource::Bytes(bytes),
            alt_text: None,
            is_new_upload: true,
        }
    }

    /// An image already attached to an existing catalog entry.
    pub fn existing(external_id: u64, url: String, alt_text: Option<String>) -> Self {
        Self {
            external_id: Some(external_id),
            source: ImageSource::Url(url),
            alt_text,
            is_new_upload: false,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.source {
            ImageSource::Url(url) => Some(url),
            ImageSource::Bytes(_) => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.source {
            ImageSource::Url(_) => None,
            ImageSource::Bytes(bytes) => Some(bytes),
        }
    }
}

/// Where the pixel data for an image currently lives.
///
/// Fetched bytes replace a `Url` source in place, which doubles as the
/// per-session, per-image fetch cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageSource {
    Url(String),
    Bytes(Vec<u8>),
}

/// Content produced by one optimize call.
///
/// Produced atomically: a second optimize call replaces the whole value,
/// never merges into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeneratedContent {
    pub name: String,
    pub sku: Option<String>,
    pub slug: Option<String>,
    pub description: String,
    pub short_description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<AttributePair>,
    #[serde(default)]
    pub image_alts: Vec<String>,
    #[serde(default)]
    pub meta_fields: Vec<MetaField>,
    pub price_minor: Option<i64>,
}

/// A named attribute value, e.g. `material = oak`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributePair {
    pub name: String,
    pub value: String,
}

/// An opaque key/value pair passed through to the commerce store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaField {
    pub key: String,
    pub value: String,
}
