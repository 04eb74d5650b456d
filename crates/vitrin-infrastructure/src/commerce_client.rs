//! REST client for the commerce catalog API.
//!
//! Talks to the store's JSON API with key/secret basic auth. Wire prices
//! are decimal strings; the domain works in minor currency units, so the
//! conversion lives here and nowhere else.

use crate::http;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, multipart};
use serde::{Deserialize, Serialize};
use vitrin_core::commerce::{
    AttributePayload, CatalogEntry, Category, CategoryRef, CommerceApi, EntryImage, EntryPayload,
    EntryStatus, UploadedImage,
};
use vitrin_core::draft::MetaField;
use vitrin_core::error::Result;

const SERVICE: &str = "commerce";

/// REST client for the commerce store.
pub struct RestCommerceClient {
    client: Client,
    base_url: String,
    key: String,
    secret: String,
}

impl RestCommerceClient {
    /// Creates a client for the store at `base_url` with key/secret auth.
    pub fn new(
        base_url: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            secret: secret.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.key, Some(&self.secret))
    }
}

#[async_trait]
impl CommerceApi for RestCommerceClient {
    async fn get_entry(&self, id: u64) -> Result<Option<CatalogEntry>> {
        let response = self
            .request(self.client.get(self.url(&format!("/entries/{id}"))))
            .send()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(http::error_from_response(SERVICE, response).await);
        }

        let dto: EntryDto = response
            .json()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;
        Ok(Some(dto.into_entry()))
    }

    async fn create_entry(&self, payload: &EntryPayload) -> Result<CatalogEntry> {
        let response = self
            .request(self.client.post(self.url("/entries")))
            .json(&PayloadDto::from_payload(payload))
            .send()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(SERVICE, response).await);
        }
        let dto: EntryDto = response
            .json()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;
        tracing::info!(entry_id = dto.id, "created catalog entry");
        Ok(dto.into_entry())
    }

    async fn update_entry(&self, id: u64, payload: &EntryPayload) -> Result<CatalogEntry> {
        let response = self
            .request(self.client.put(self.url(&format!("/entries/{id}"))))
            .json(&PayloadDto::from_payload(payload))
            .send()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(SERVICE, response).await);
        }
        let dto: EntryDto = response
            .json()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;
        tracing::info!(entry_id = id, "updated catalog entry");
        Ok(dto.into_entry())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let response = self
            .request(self.client.get(self.url("/categories")))
            .send()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(SERVICE, response).await);
        }
        let dtos: Vec<CategoryDto> = response
            .json()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;
        Ok(dtos
            .into_iter()
            .map(|dto| Category {
                id: dto.id,
                name: dto.name,
            })
            .collect())
    }

    async fn upload_image(&self, bytes: Vec<u8>, file_name: &str) -> Result<UploadedImage> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")
            .map_err(|err| http::request_error(SERVICE, err))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .request(self.client.post(self.url("/images")))
            .multipart(form)
            .send()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(SERVICE, response).await);
        }
        let dto: UploadDto = response
            .json()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;
        tracing::debug!(image_id = dto.id, "uploaded image");
        Ok(UploadedImage {
            id: dto.id,
            url: dto.src,
        })
    }
}

// ============================================================================
// Wire DTOs
// ============================================================================

#[derive(Deserialize)]
struct EntryDto {
    id: u64,
    name: String,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    status: EntryStatus,
    #[serde(default)]
    categories: Vec<CategoryDto>,
    #[serde(default)]
    tags: Vec<TagDto>,
    #[serde(default)]
    images: Vec<ImageDto>,
    #[serde(default)]
    attributes: Vec<AttributeDto>,
    #[serde(default)]
    meta_data: Vec<MetaDto>,
}

impl EntryDto {
    fn into_entry(self) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            name: self.name,
            sku: self.sku,
            slug: self.slug,
            price_minor: self.price.as_deref().and_then(parse_price_minor),
            description: self.description,
            short_description: self.short_description,
            status: self.status,
            categories: self
                .categories
                .into_iter()
                .map(|dto| Category {
                    id: dto.id,
                    name: dto.name,
                })
                .collect(),
            tags: self.tags.into_iter().map(|dto| dto.name).collect(),
            images: self
                .images
                .into_iter()
                .map(|dto| EntryImage {
                    id: dto.id,
                    url: dto.src,
                    alt: dto.alt,
                })
                .collect(),
            attributes: self
                .attributes
                .into_iter()
                .map(|dto| AttributePayload {
                    name: dto.name,
                    values: dto.options,
                })
                .collect(),
            meta_fields: self
                .meta_data
                .into_iter()
                .map(|dto| MetaField {
                    key: dto.key,
                    value: dto.value,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct PayloadDto<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sku: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<String>,
    // Empty content fields are omitted rather than sent: a PUT with an
    // absent field leaves the stored value untouched, so an edit that never
    // regenerated content cannot blank out what the store already has.
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    short_description: &'a str,
    status: EntryStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    categories: Vec<&'a CategoryRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<TagDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<ImagePayloadDto<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<AttributeDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    meta_data: Vec<MetaDto>,
}

impl<'a> PayloadDto<'a> {
    fn from_payload(payload: &'a EntryPayload) -> Self {
        Self {
            name: &payload.name,
            sku: payload.sku.as_deref(),
            slug: payload.slug.as_deref(),
            price: payload.price_minor.map(price_minor_to_string),
            description: &payload.description,
            short_description: &payload.short_description,
            status: payload.status,
            categories: payload.categories.iter().collect(),
            tags: payload
                .tags
                .iter()
                .map(|name| TagDto { name: name.clone() })
                .collect(),
            images: payload
                .images
                .iter()
                .map(|image| ImagePayloadDto {
                    id: image.id,
                    src: image.url.as_deref(),
                    alt: image.alt.as_deref(),
                })
                .collect(),
            attributes: payload
                .attributes
                .iter()
                .map(|attr| AttributeDto {
                    name: attr.name.clone(),
                    options: attr.values.clone(),
                })
                .collect(),
            meta_data: payload
                .meta_fields
                .iter()
                .map(|field| MetaDto {
                    key: field.key.clone(),
                    value: field.value.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CategoryDto {
    id: u64,
    name: String,
}

#[derive(Serialize, Deserialize)]
struct TagDto {
    name: String,
}

#[derive(Deserialize)]
struct ImageDto {
    id: u64,
    src: String,
    #[serde(default)]
    alt: Option<String>,
}

#[derive(Serialize)]
struct ImagePayloadDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    src: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alt: Option<&'a str>,
}

#[derive(Serialize, Deserialize)]
struct AttributeDto {
    name: String,
    #[serde(default)]
    options: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct MetaDto {
    key: String,
    value: String,
}

#[derive(Deserialize)]
struct UploadDto {
    id: u64,
    src: String,
}

// ============================================================================
// Price conversion
// ============================================================================

/// Parses a wire price like `"4200.50"` into minor units (`420050`).
/// Thousands separators and surrounding whitespace are tolerated.
pub fn parse_price_minor(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    Some((value * 100.0).round() as i64)
}

/// Formats minor units back into the wire's decimal-string form.
pub fn price_minor_to_string(minor: i64) -> String {
    format!("{}.{:02}", minor / 100, (minor % 100).abs())
}
