//! HTTP-backed intent resolver.
//!
//! Sends the user's text plus a compact draft-state summary to the external
//! classifier and expects back either one tagged tool request or nothing.
//! The closed `ToolRequest` set is the whole contract: the service cannot
//! ask for anything outside it.

use crate::http;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vitrin_core::draft::ProductDraft;
use vitrin_core::error::Result;
use vitrin_core::intent::IntentResolver;
use vitrin_core::tool::ToolRequest;

const SERVICE: &str = "intent resolver";

/// JSON HTTP client for the intent classification service.
pub struct HttpIntentResolver {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpIntentResolver {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl IntentResolver for HttpIntentResolver {
    async fn resolve(&self, text: &str, draft: &ProductDraft) -> Result<Option<ToolRequest>> {
        let request = IntentRequest {
            text,
            state: DraftState::summarize(draft),
        };
        let response = self
            .client
            .post(format!("{}/v1/intent", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(SERVICE, response).await);
        }
        let parsed: IntentResponse = response
            .json()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;
        Ok(parsed.tool_call)
    }
}

#[derive(Serialize)]
struct IntentRequest<'a> {
    text: &'a str,
    state: DraftState,
}

/// What the classifier is allowed to know about the draft: shape, not
/// content.
#[derive(Serialize)]
struct DraftState {
    has_name: bool,
    has_price: bool,
    image_count: usize,
    has_generated: bool,
    editing: bool,
}

impl DraftState {
    fn summarize(draft: &ProductDraft) -> Self {
        Self {
            has_name: draft.raw_name.is_some(),
            has_price: draft.price_minor.is_some(),
            image_count: draft.images.len(),
            has_generated: draft.generated.is_some(),
            editing: draft.edit_target_id.is_some(),
        }
    }
}

#[derive(Deserialize)]
struct IntentResponse {
    tool_call: Option<ToolRequest>,
}
