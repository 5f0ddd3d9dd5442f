//! Conversation loop shared by the server and the CLI
//!
//! [`ChatService`] turns one prompt into a final answer: it calls the
//! provider, runs any requested tools through a [`ToolExecutor`], and feeds
//! the results back until the model stops or the iteration cap is hit.

mod error;
mod service;

pub use error::{ChatError, ChatResult};
pub use service::ChatService;

use crate::protocol::{ToolCall, ToolResult, ToolSchema, Usage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reply text used when the model never produced any text
pub const NO_RESPONSE: &str = "No response generated";

/// Executes tool calls requested by the model
///
/// Failures are reported in-band through [`ToolResult::error`] so the model
/// can see them.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Tools offered to the model
    fn tools(&self) -> Vec<ToolSchema>;

    /// Run one tool call
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}

/// One user query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

/// Final outcome of a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Last non-empty text from the model, or [`NO_RESPONSE`]
    pub response: String,

    /// Number of provider calls made
    pub iterations: u32,

    /// Number of tool calls executed
    pub tools_called: usize,

    /// Names of executed tools, in call order
    pub tool_names: Vec<String>,

    /// Stop reason of the last response
    pub stop_reason: Option<String>,

    pub max_iterations_reached: bool,

    /// Token usage summed over all iterations
    pub usage: Usage,

    pub model: String,
}
