//! Provider abstraction
//!
//! Everything above the HTTP layer talks to the model through
//! [`LlmProvider`], which lets the chat service run against a fake in tests.

use crate::http::ChatOptions;
use crate::protocol::{ChatMessage, LlmResponse, ToolSchema};
use crate::providers::ProviderResult;
use async_trait::async_trait;

/// An LLM backend that answers one conversation turn at a time
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the conversation and return the parsed response
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        options: &ChatOptions,
    ) -> ProviderResult<LlmResponse>;

    /// Model identifier used for requests
    fn model(&self) -> &str;

    /// Human-readable provider name
    fn provider_name(&self) -> &str;
}
