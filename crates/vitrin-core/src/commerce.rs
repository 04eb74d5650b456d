//! Commerce catalog collaborator.
//!
//! Narrow interface to the external commerce store: fetch and save catalog
//! entries, list categories, upload images. The REST client lives in
//! `vitrin-infrastructure`.

use crate::draft::{AttributePair, MetaField};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Publication status of a catalog entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryStatus {
    Published,
    #[default]
    Draft,
}

/// A category as known to the commerce store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// A category reference in a save payload: an existing id, or a bare name
/// the store should create on the fly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id { id: u64 },
    Name { name: String },
}

/// An image reference in a save payload. Exactly one of `id` and `url`
/// should be set: `id` for already-uploaded media, `url` for media the
/// store should pull itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A named attribute with its values, as the commerce store models them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributePayload {
    pub name: String,
    pub values: Vec<String>,
}

impl From<AttributePair> for AttributePayload {
    fn from(pair: AttributePair) -> Self {
        Self {
            name: pair.name,
            values: vec![pair.value],
        }
    }
}

/// The create/update payload for a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntryPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Price in minor currency units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_minor: Option<i64>,
    pub description: String,
    pub short_description: String,
    pub status: EntryStatus,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    /// Tags by name
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImagePayload>,
    #[serde(default)]
    pub attributes: Vec<AttributePayload>,
    #[serde(default)]
    pub meta_fields: Vec<MetaField>,
}

/// An image already attached to a stored catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryImage {
    pub id: u64,
    pub url: String,
    pub alt: Option<String>,
}

/// A catalog entry as returned by the commerce store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub name: String,
    pub sku: Option<String>,
    pub slug: Option<String>,
    /// Price in minor currency units
    pub price_minor: Option<i64>,
    pub description: String,
    pub short_description: String,
    pub status: EntryStatus,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<EntryImage>,
    #[serde(default)]
    pub attributes: Vec<AttributePayload>,
    #[serde(default)]
    pub meta_fields: Vec<MetaField>,
}

impl CatalogEntry {
    /// Looks up an attribute value by case-insensitive name.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .and_then(|attr| attr.values.first())
            .map(String::as_str)
    }

    /// Looks up a meta field value by case-insensitive key.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta_fields
            .iter()
            .find(|field| field.key.eq_ignore_ascii_case(key))
            .map(|field| field.value.as_str())
    }
}

/// A freshly uploaded media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub id: u64,
    pub url: String,
}

/// An abstract client for the commerce catalog API.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Fetches an entry by id. `Ok(None)` when the entry does not exist.
    async fn get_entry(&self, id: u64) -> Result<Option<CatalogEntry>>;

    /// Creates a new entry and returns the stored form.
    async fn create_entry(&self, payload: &EntryPayload) -> Result<CatalogEntry>;

    /// Updates an existing entry and returns the stored form.
    async fn update_entry(&self, id: u64, payload: &EntryPayload) -> Result<CatalogEntry>;

    /// Lists every category known to the store.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Uploads an image and returns its id and public URL.
    async fn upload_image(&self, bytes: Vec<u8>, file_name: &str) -> Result<UploadedImage>;
}
