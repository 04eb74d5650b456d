//! HTTP image fetcher.

use crate::http;
use async_trait::async_trait;
use reqwest::Client;
use vitrin_core::error::Result;
use vitrin_core::fetch::ImageFetcher;

const SERVICE: &str = "image fetch";

/// Fetches image bytes over plain HTTP GET.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(SERVICE, response).await);
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| http::request_error(SERVICE, err))?;
        Ok(bytes.to_vec())
    }
}
