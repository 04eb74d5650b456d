//! HTTP client for the content-generation service.
//!
//! Ships the draft (with image bytes base64-encoded) plus store context to
//! the generator and maps its JSON answers back into domain types. Rate
//! limits surface as `RateLimited` via the shared HTTP mapping.

use crate::http;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vitrin_core::commerce::CatalogEntry;
use vitrin_core::draft::{GeneratedContent, ProductDraft};
use vitrin_core::error::Result;
use vitrin_core::generation::{ContentGenerator, StoreContext, Suggestion};

const SERVICE: &str = "generator";
const SUGGESTION_COUNT: usize = 3;

/// JSON HTTP client for the generation service.
pub struct HttpContentGenerator {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpContentGenerator {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(SERVICE, response).await);
        }
        response
            .json()
            .await
            .map_err(|err| http::request_error(SERVICE, err))
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate(
        &self,
        draft: &ProductDraft,
        context: &StoreContext,
    ) -> Result<GeneratedContent> {
        let request = GenerateRequest::from_draft(draft, context);
        tracing::debug!(
            images = request.images.len(),
            "requesting content generation"
        );
        self.post("/v1/generate", &request).await
    }

    async fn suggest(&self, trend_signals: &[String]) -> Result<Vec<Suggestion>> {
        let response: SuggestResponse = self
            .post(
                "/v1/suggest",
                &SuggestRequest {
                    trend_signals,
                    count: SUGGESTION_COUNT,
                },
            )
            .await?;
        let mut suggestions = response.suggestions;
        suggestions.truncate(SUGGESTION_COUNT);
        Ok(suggestions)
    }

    async fn generate_post(
        &self,
        entry: &CatalogEntry,
        topic: &str,
        tone: Option<&str>,
    ) -> Result<String> {
        let response: PostResponse = self
            .post(
                "/v1/posts",
                &PostRequest {
                    entry_name: &entry.name,
                    description: &entry.short_description,
                    topic,
                    tone,
                },
            )
            .await?;
        Ok(response.text)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    raw_name: Option<&'a str>,
    price_minor: Option<i64>,
    material: Option<&'a str>,
    localized_name: Option<&'a str>,
    focus_keywords: &'a [String],
    /// Base64-encoded bytes for every image that has pixel data locally
    images: Vec<String>,
    context: &'a StoreContext,
    editing: bool,
}

impl<'a> GenerateRequest<'a> {
    fn from_draft(draft: &'a ProductDraft, context: &'a StoreContext) -> Self {
        Self {
            raw_name: draft.raw_name.as_deref(),
            price_minor: draft.price_minor,
            material: draft.material.as_deref(),
            localized_name: draft.localized_name.as_deref(),
            focus_keywords: &draft.focus_keywords,
            images: draft
                .images
                .iter()
                .filter_map(|image| image.bytes())
                .map(|bytes| BASE64_STANDARD.encode(bytes))
                .collect(),
            context,
            editing: draft.edit_target_id.is_some(),
        }
    }
}

#[derive(Serialize)]
struct SuggestRequest<'a> {
    trend_signals: &'a [String],
    count: usize,
}

#[derive(Deserialize)]
struct SuggestResponse {
    suggestions: Vec<Suggestion>,
}

#[derive(Serialize)]
struct PostRequest<'a> {
    entry_name: &'a str,
    description: &'a str,
    topic: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tone: Option<&'a str>,
}

#[derive(Deserialize)]
struct PostResponse {
    text: String,
}
