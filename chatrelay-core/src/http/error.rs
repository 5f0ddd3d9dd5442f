//! HTTP error mapping utilities

use crate::protocol::wire::WireError;
use crate::providers::ProviderError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Map an HTTP status code and response body to a ProviderError
pub fn map_http_error(
    status: StatusCode,
    headers: Option<&HeaderMap>,
    body: Option<String>,
    request_id: Uuid,
) -> ProviderError {
    let error_details = body.as_deref().and_then(extract_error_details);

    let error_message = error_details
        .as_ref()
        .map(|d| d.message.clone())
        .or_else(|| body.clone().filter(|b| !b.trim().is_empty()))
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

    // Include request ID in error message
    let message_with_id = format!("{} [request_id: {}]", error_message, request_id);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Authentication(message_with_id)
        }

        StatusCode::TOO_MANY_REQUESTS => {
            // Header wins over a hint in the body
            let retry_after = headers
                .and_then(|h| h.get(RETRY_AFTER))
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after)
                .or_else(|| {
                    error_details
                        .and_then(|d| d.retry_after_seconds)
                        .map(Duration::from_secs)
                });

            ProviderError::RateLimit {
                message: message_with_id,
                retry_after,
            }
        }

        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::Timeout(message_with_id)
        }

        status if status.is_server_error() => ProviderError::ServerError {
            status: status.as_u16(),
            message: message_with_id,
        },

        status if status.is_client_error() => ProviderError::InvalidRequest(message_with_id),

        _ => ProviderError::Network(format!(
            "Unexpected HTTP status {}: {}",
            status.as_u16(),
            message_with_id
        )),
    }
}

/// Error details extracted from response body
struct ErrorDetails {
    message: String,
    retry_after_seconds: Option<u64>,
}

/// Extract error details from a JSON error body
fn extract_error_details(body: &str) -> Option<ErrorDetails> {
    let json: Value = serde_json::from_str(body).ok()?;

    // OpenAI/OpenRouter format: { "error": { "message": "...", "code": ... } }
    if let Ok(wire) = serde_json::from_value::<WireError>(json.clone()) {
        return Some(ErrorDetails {
            message: wire.error.message,
            retry_after_seconds: json
                .pointer("/error/metadata/retry_after")
                .or_else(|| json.pointer("/error/retry_after"))
                .and_then(Value::as_u64),
        });
    }

    // Generic format: { "message": "...", "retry_after": 5 }
    if let Some(message) = json.get("message").and_then(Value::as_str) {
        return Some(ErrorDetails {
            message: message.to_string(),
            retry_after_seconds: json.get("retry_after").and_then(Value::as_u64),
        });
    }

    if let Some(error) = json.get("error").and_then(Value::as_str) {
        return Some(ErrorDetails {
            message: error.to_string(),
            retry_after_seconds: None,
        });
    }

    None
}

/// Parse Retry-After header value
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    // Only delta-seconds; HTTP dates are ignored
    header_value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use test_case::test_case;

    #[test_case(401 ; "unauthorized")]
    #[test_case(403 ; "forbidden")]
    fn test_auth_statuses(code: u16) {
        let status = StatusCode::from_u16(code).unwrap();
        assert!(matches!(
            map_http_error(status, None, None, Uuid::new_v4()),
            ProviderError::Authentication(_)
        ));
    }

    #[test_case(500 ; "internal")]
    #[test_case(502 ; "bad gateway")]
    #[test_case(503 ; "unavailable")]
    fn test_server_statuses(code: u16) {
        let status = StatusCode::from_u16(code).unwrap();
        let error = map_http_error(status, None, None, Uuid::new_v4());
        assert!(matches!(error, ProviderError::ServerError { status, .. } if status == code));
    }

    #[test_case(408 ; "request timeout")]
    #[test_case(504 ; "gateway timeout")]
    fn test_timeout_statuses(code: u16) {
        let status = StatusCode::from_u16(code).unwrap();
        assert!(matches!(
            map_http_error(status, None, None, Uuid::new_v4()),
            ProviderError::Timeout(_)
        ));
    }

    #[test]
    fn test_error_message_from_body() {
        let body = r#"{"error": {"message": "model not found", "code": 400}}"#;
        let request_id = Uuid::new_v4();
        let error = map_http_error(
            StatusCode::BAD_REQUEST,
            None,
            Some(body.to_string()),
            request_id,
        );
        match error {
            ProviderError::InvalidRequest(message) => {
                assert!(message.starts_with("model not found"));
                assert!(message.contains(&request_id.to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        let error = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            Some(&headers),
            None,
            Uuid::new_v4(),
        );
        assert_eq!(error.retry_delay(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("30"), Some(Duration::from_secs(30)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}
