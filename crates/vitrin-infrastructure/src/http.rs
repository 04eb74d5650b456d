//! Shared HTTP error mapping for the collaborator clients.
//!
//! Every client funnels non-success responses through here so rate limits
//! come back as the distinguished `RateLimited` variant with a retry-after
//! duration, and everything else as an `External` error carrying the
//! upstream message.

use reqwest::{Response, StatusCode, header::HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use vitrin_core::VitrinError;

/// Fallback when a 429 arrives without a Retry-After header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(alias = "description")]
    message: Option<String>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a transport-level failure (connect, timeout) to an `External` error.
pub(crate) fn request_error(service: &'static str, err: reqwest::Error) -> VitrinError {
    VitrinError::external(service, err.to_string())
}

/// Consumes a non-success response and maps it to the error taxonomy.
pub(crate) async fn error_from_response(service: &'static str, response: Response) -> VitrinError {
    let status = response.status();
    let retry_after = parse_retry_after(response.headers().get("retry-after"));
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error body".to_string());
    map_http_error(service, status, body, retry_after)
}

fn map_http_error(
    service: &'static str,
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> VitrinError {
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.message.or(envelope.error.map(|e| e.message)))
        .unwrap_or_else(|| body.clone());
    let message = format!("{} ({})", message.trim(), status.as_u16());

    if status == StatusCode::TOO_MANY_REQUESTS {
        return VitrinError::rate_limited(
            service,
            retry_after.unwrap_or(DEFAULT_RETRY_AFTER),
            message,
        );
    }

    VitrinError::external(service, message)
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // Retry-After HTTP-date parsing is omitted for simplicity
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_becomes_rate_limited_with_header_duration() {
        let err = map_http_error(
            "generator",
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"message":"slow down"}"#.to_string(),
            Some(Duration::from_secs(12)),
        );
        assert_eq!(err.retry_after(), Some(Duration::from_secs(12)));
        assert!(err.upstream_message().contains("slow down"));
    }

    #[test]
    fn rate_limit_without_header_uses_the_default_backoff() {
        let err = map_http_error(
            "commerce",
            StatusCode::TOO_MANY_REQUESTS,
            String::new(),
            None,
        );
        assert_eq!(err.retry_after(), Some(DEFAULT_RETRY_AFTER));
    }

    #[test]
    fn other_statuses_become_external_errors_with_the_upstream_message() {
        let err = map_http_error(
            "commerce",
            StatusCode::BAD_GATEWAY,
            r#"{"error":{"message":"upstream exploded"}}"#.to_string(),
            None,
        );
        assert!(!err.is_rate_limited());
        assert!(err.upstream_message().contains("upstream exploded"));
        assert!(err.upstream_message().contains("502"));
    }

    #[test]
    fn non_json_bodies_pass_through_verbatim() {
        let err = map_http_error(
            "messaging",
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>oops</html>".to_string(),
            None,
        );
        assert!(err.upstream_message().contains("<html>oops</html>"));
    }
}
