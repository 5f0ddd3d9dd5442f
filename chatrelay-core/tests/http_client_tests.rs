//! Tests for HTTP client functionality with mocking

use chatrelay_core::converter::MessageConverter;
use chatrelay_core::http::{ChatOptions, HttpClient, HttpClientConfig};
use chatrelay_core::protocol::{ToolSchema, WireMessage};
use chatrelay_core::providers::ProviderError;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> HttpClient {
    HttpClient::new(HttpClientConfig::new(
        server.uri(),
        "sk-or-test-key",
        "test/model",
    ))
    .unwrap()
}

fn test_messages() -> Vec<WireMessage> {
    MessageConverter::to_wire_messages(&[MessageConverter::create_user_message("Test message")])
}

fn test_response() -> Value {
    json!({
        "id": "gen-123",
        "model": "test/model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Test response"},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_successful_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-or-test-key"))
        .and(header("Content-Type", "application/json"))
        .and(header_exists("X-Request-ID"))
        .and(body_json(json!({
            "model": "test/model",
            "messages": [{"role": "user", "content": "Test message"}],
            "max_tokens": 10000,
            "temperature": 0.4
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let raw = client
        .send_chat_request(&test_messages(), None, &ChatOptions::default())
        .await
        .unwrap();

    assert_eq!(raw, test_response());
}

#[tokio::test]
async fn test_request_id_header_matches_options() {
    let mock_server = MockServer::start().await;
    let request_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(header("X-Request-ID", request_id.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = ChatOptions::default().with_request_id(request_id);
    let result = test_client(&mock_server)
        .send_chat_request(&test_messages(), None, &options)
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_tools_and_options_in_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_json(json!({
            "model": "test/model",
            "messages": [{"role": "user", "content": "Test message"}],
            "max_tokens": 256,
            "temperature": 0.0,
            "tools": [{
                "type": "function",
                "function": {
                    "name": "search",
                    "description": "Search the web",
                    "parameters": {"type": "object"}
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tools = vec![ToolSchema {
        name: "search".to_string(),
        description: "Search the web".to_string(),
        input_schema: json!({"type": "object"}),
    }];
    let options = ChatOptions::default()
        .with_max_tokens(256)
        .with_temperature(0.0);

    let result = test_client(&mock_server)
        .send_chat_request(&test_messages(), Some(&tools), &options)
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "No auth credentials found", "code": 401}
        })))
        .mount(&mock_server)
        .await;

    let result = test_client(&mock_server)
        .send_chat_request(&test_messages(), None, &ChatOptions::default())
        .await;

    match result {
        Err(ProviderError::Authentication(message)) => {
            assert!(message.contains("No auth credentials found"));
        }
        other => panic!("Expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_error_with_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "2")
                .set_body_json(json!({"error": {"message": "Rate limit exceeded"}})),
        )
        .mount(&mock_server)
        .await;

    let result = test_client(&mock_server)
        .send_chat_request(&test_messages(), None, &ChatOptions::default())
        .await;

    match result {
        Err(ProviderError::RateLimit { retry_after, .. }) => {
            assert_eq!(retry_after, Some(Duration::from_secs(2)));
        }
        other => panic!("Expected rate limit error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let result = test_client(&mock_server)
        .send_chat_request(&test_messages(), None, &ChatOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(ProviderError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_bad_request_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "test/model is not a valid model ID", "code": 400}
        })))
        .mount(&mock_server)
        .await;

    let result = test_client(&mock_server)
        .send_chat_request(&test_messages(), None, &ChatOptions::default())
        .await;

    match result {
        Err(ProviderError::InvalidRequest(message)) => {
            assert!(message.contains("not a valid model ID"));
        }
        other => panic!("Expected invalid request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .set_body_string("{not json"),
        )
        .mount(&mock_server)
        .await;

    let result = test_client(&mock_server)
        .send_chat_request(&test_messages(), None, &ChatOptions::default())
        .await;

    assert!(matches!(result, Err(ProviderError::Parse(_))));
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(test_response())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let options = ChatOptions::default().with_timeout(Duration::from_millis(100));
    let result = test_client(&mock_server)
        .send_chat_request(&test_messages(), None, &options)
        .await;

    assert!(matches!(result, Err(ProviderError::Timeout(_))));
}

#[tokio::test]
async fn test_connection_refused() {
    // Nothing listens on the discard port
    let client = HttpClient::new(HttpClientConfig::new(
        "http://127.0.0.1:9",
        "sk-or-test-key",
        "test/model",
    ))
    .unwrap();

    let result = client
        .send_chat_request(&test_messages(), None, &ChatOptions::default())
        .await;

    assert!(matches!(result, Err(ProviderError::Network(_))));
}
