//! HTTP client implementation using reqwest

use crate::config::{SecretString, Settings};
use crate::converter::MessageConverter;
use crate::http::{ChatOptions, CHAT_COMPLETIONS_PATH};
use crate::protocol::{ToolSchema, WireMessage, WireRequest};
use crate::providers::{ProviderError, ProviderResult};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("chatrelay/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_idle_per_host: usize,
}

impl HttpClientConfig {
    /// Config with default timeouts
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<SecretString>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_idle_per_host: 10,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: settings.provider.base_url.clone(),
            api_key: settings.provider.api_key.clone(),
            model: settings.provider.model.clone(),
            connect_timeout: Duration::from_millis(settings.connection.connect_timeout_ms),
            request_timeout: Duration::from_millis(settings.connection.request_timeout_ms),
            max_idle_per_host: settings.connection.max_idle_per_host,
        }
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Shared HTTP client with connection pooling
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    base_url: String,
    api_key: SecretString,
    model: String,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: HttpClientConfig) -> ProviderResult<Self> {
        if config.api_key.is_empty() {
            return Err(ProviderError::Configuration(
                "OpenRouter API key is required".to_string(),
            ));
        }

        let client = ClientBuilder::new()
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Create a client from loaded settings
    pub fn from_settings(settings: &Settings) -> ProviderResult<Self> {
        Self::new(HttpClientConfig::from_settings(settings))
    }

    /// Model sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH)
    }

    /// Assemble the request body
    fn build_request(
        &self,
        messages: &[WireMessage],
        tools: Option<&[ToolSchema]>,
        options: &ChatOptions,
    ) -> WireRequest {
        let tools = tools
            .filter(|tools| !tools.is_empty())
            .map(|tools| tools.iter().map(MessageConverter::tool_to_wire).collect());

        WireRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            max_tokens: Some(options.max_tokens),
            temperature: Some(options.temperature),
            tools,
        }
    }

    /// Check response size to prevent OOM
    fn check_content_length(&self, response: &Response) -> ProviderResult<()> {
        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(ProviderError::Parse(format!(
                    "Response size {} exceeds maximum {}",
                    content_length, self.max_response_size
                )));
            }
        }

        Ok(())
    }

    /// POST a chat completion request and return the raw JSON response
    pub async fn send_chat_request(
        &self,
        messages: &[WireMessage],
        tools: Option<&[ToolSchema]>,
        options: &ChatOptions,
    ) -> ProviderResult<Value> {
        let request_id = options.request_id;
        let url = self.chat_url();

        info!(
            "Sending chat request with {} message(s) to {} [request_id: {}]",
            messages.len(),
            self.model,
            request_id
        );
        debug!("Request URL: {}", url);

        let body = self.build_request(messages, tools, options);

        let mut req_builder = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key.expose_secret()))
            .header(CONTENT_TYPE, "application/json")
            // Request ID header for correlation
            .header("X-Request-ID", request_id.to_string())
            .json(&body);

        if let Some(timeout) = options.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Request timeout [request_id: {}]", request_id);
                ProviderError::Timeout(format!(
                    "Request to OpenRouter timed out [request_id: {}]",
                    request_id
                ))
            } else if e.is_connect() {
                error!("Connection error [request_id: {}]: {}", request_id, e);
                ProviderError::Network(format!(
                    "Connection failed: {} [request_id: {}]",
                    e, request_id
                ))
            } else {
                error!("Request error [request_id: {}]: {}", request_id, e);
                ProviderError::Network(format!("{} [request_id: {}]", e, request_id))
            }
        })?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if !status.is_success() {
            // Capture headers for retry-after parsing
            let headers = response.headers().clone();
            let body = response.text().await.ok();

            warn!(
                "Request failed with status {} [request_id: {}]",
                status, request_id
            );

            return Err(crate::http::error::map_http_error(
                status,
                Some(&headers),
                body,
                request_id,
            ));
        }

        self.check_content_length(&response)?;

        let response_text = response.text().await.map_err(|e| {
            ProviderError::Network(format!(
                "Failed to read response body: {} [request_id: {}]",
                e, request_id
            ))
        })?;

        if response_text.len() > self.max_response_size {
            return Err(ProviderError::Parse(format!(
                "Response size {} exceeds maximum {} [request_id: {}]",
                response_text.len(),
                self.max_response_size,
                request_id
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
            error!(
                "Failed to parse response body [request_id: {}]: {}",
                request_id, e
            );
            ProviderError::Parse(format!(
                "Invalid response body: {} [request_id: {}]",
                e, request_id
            ))
        })?;

        info!("Chat request completed [request_id: {}]", request_id);

        Ok(response_json)
    }
}
