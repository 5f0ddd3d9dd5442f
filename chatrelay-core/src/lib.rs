//! Chatrelay Core Library
//!
//! This crate provides the message normalization layer and provider client
//! for relaying prompts to an OpenAI-compatible chat completions API.
//!
//! - [`protocol`]: message, content block and wire types
//! - [`converter`]: [`MessageConverter`], mapping between message shapes
//! - [`http`]: the pooled HTTP client
//! - [`providers`]: the [`LlmProvider`] trait, OpenRouter and retries
//! - [`config`]: settings from YAML and the environment
//! - [`chat`]: the conversation loop used by the frontends

pub mod chat;
pub mod config;
pub mod converter;
pub mod http;
pub mod protocol;
pub mod providers;

pub use chat::{ChatError, ChatReply, ChatRequest, ChatService, ToolExecutor};
pub use converter::{AssistantReply, ConversionError, ConversionResult, MessageConverter};
pub use protocol::{ChatMessage, Content, ContentBlock, LlmResponse, Role};
pub use providers::{LlmProvider, OpenRouterProvider, ProviderError};

/// Returns the version of the Chatrelay Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
