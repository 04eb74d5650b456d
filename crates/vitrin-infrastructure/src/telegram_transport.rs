//! Telegram Bot API messaging transport.

use crate::http;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use vitrin_core::error::Result;
use vitrin_core::messaging::{ALBUM_LIMIT, MessagingTransport};

const SERVICE: &str = "messaging";

/// Messaging transport backed by the Telegram Bot API.
pub struct TelegramTransport {
    client: Client,
    base_url: String,
}

impl TelegramTransport {
    pub fn new(bot_token: &str) -> Self {
        Self::with_base_url(format!("https://api.telegram.org/bot{bot_token}"))
    }

    /// Mainly for tests pointing at a local stub server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn call<B: Serialize>(&self, method: &str, body: &B) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(SERVICE, response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingTransport for TelegramTransport {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        self.call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    async fn send_photo(&self, chat_id: &str, url: &str, caption: &str) -> Result<()> {
        self.call(
            "sendPhoto",
            &json!({ "chat_id": chat_id, "photo": url, "caption": caption }),
        )
        .await
    }

    async fn send_album(&self, chat_id: &str, urls: &[String], caption: &str) -> Result<()> {
        let media = build_media_group(urls, caption);
        tracing::debug!(items = media.len(), "sending media group");
        self.call(
            "sendMediaGroup",
            &json!({ "chat_id": chat_id, "media": media }),
        )
        .await
    }
}

/// Builds the `sendMediaGroup` media array: at most [`ALBUM_LIMIT`] photos,
/// caption attached to the first item only because the API has no
/// album-wide caption.
fn build_media_group(urls: &[String], caption: &str) -> Vec<serde_json::Value> {
    urls.iter()
        .take(ALBUM_LIMIT)
        .enumerate()
        .map(|(index, url)| {
            if index == 0 {
                json!({ "type": "photo", "media": url, "caption": caption })
            } else {
                json!({ "type": "photo", "media": url })
            }
        })
        .collect()
}
