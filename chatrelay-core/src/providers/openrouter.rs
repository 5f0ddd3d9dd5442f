//! OpenRouter provider implementation

use crate::config::Settings;
use crate::converter::MessageConverter;
use crate::http::{ChatOptions, HttpClient};
use crate::protocol::{ChatMessage, LlmResponse, ToolSchema};
use crate::providers::{LlmProvider, ProviderResult, RetryExecutor, RetryPolicy};
use async_trait::async_trait;
use tracing::{debug, info};

/// Name reported by [`LlmProvider::provider_name`]
pub const PROVIDER_NAME: &str = "OpenRouter";

/// Provider for OpenRouter's OpenAI-compatible chat API
///
/// `chat_once` is a single request. The [`LlmProvider`] implementation goes
/// through `chat_with_retry`, so retryable failures are retried per the
/// configured [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: HttpClient,
    retry: RetryExecutor,
}

impl OpenRouterProvider {
    /// Create a provider using the default retry policy
    pub fn new(client: HttpClient) -> Self {
        Self::with_retry_policy(client, RetryPolicy::default())
    }

    pub fn with_retry_policy(client: HttpClient, policy: RetryPolicy) -> Self {
        Self {
            client,
            retry: RetryExecutor::new(policy),
        }
    }

    /// Build the HTTP client and retry policy from settings
    pub fn from_settings(settings: &Settings) -> ProviderResult<Self> {
        let client = HttpClient::from_settings(settings)?;
        Ok(Self::with_retry_policy(
            client,
            RetryPolicy::from(&settings.retry),
        ))
    }

    /// Send one request without retrying
    pub async fn chat_once(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        options: &ChatOptions,
    ) -> ProviderResult<LlmResponse> {
        let wire_messages = MessageConverter::to_wire_messages(messages);
        let raw = self
            .client
            .send_chat_request(&wire_messages, tools, options)
            .await?;

        let response = MessageConverter::from_wire_response(&raw)?;
        debug!(
            "Response stop_reason={:?} tool_calls={} [request_id: {}]",
            response.stop_reason,
            response.tool_calls().len(),
            options.request_id
        );
        Ok(response)
    }

    /// Send a request, retrying retryable failures with backoff
    pub async fn chat_with_retry(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        options: &ChatOptions,
    ) -> ProviderResult<LlmResponse> {
        let outcome = self
            .retry
            .execute(|| self.chat_once(messages, tools, options))
            .await;

        if outcome.attempts > 0 {
            info!(
                "Request finished after {} retr{} [request_id: {}]",
                outcome.attempts,
                if outcome.attempts == 1 { "y" } else { "ies" },
                options.request_id
            );
        }

        outcome.into_result()
    }

    /// Send a tiny request to reduce first-request latency; failures are ignored
    pub async fn warmup(&self) {
        let messages = [MessageConverter::create_user_message("Hello")];
        let options = ChatOptions::default().with_max_tokens(10);

        match self.chat_once(&messages, None, &options).await {
            Ok(_) => info!("Model {} warmed up", self.client.model()),
            Err(e) => debug!("Warmup request failed: {}", e),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        options: &ChatOptions,
    ) -> ProviderResult<LlmResponse> {
        self.chat_with_retry(messages, tools, options).await
    }

    fn model(&self) -> &str {
        self.client.model()
    }

    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }
}
