//! Wire types for the OpenAI-compatible chat completions API
//!
//! These types match the provider's JSON format and are used for
//! serialization/deserialization at the network boundary only.

use super::types::{Content, Role, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message exactly as the chat API expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: Content,
}

/// Tool definition in provider format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub tool_type: String,

    pub function: WireFunction,
}

/// Function definition in provider format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunction {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct WireRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    pub choices: Vec<WireChoice>,

    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct WireChoice {
    #[serde(default)]
    pub index: usize,

    pub message: WireChoiceMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message of a completion choice
///
/// `content` is required but may be `null` when the model only calls tools.
#[derive(Debug, Deserialize)]
pub struct WireChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,

    pub content: Value,

    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

/// Tool call in provider format
#[derive(Debug, Deserialize)]
pub struct WireToolCall {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type", default)]
    pub tool_type: Option<String>,

    pub function: WireFunctionCall,
}

/// Function call in provider format; `arguments` is usually a JSON string
#[derive(Debug, Deserialize)]
pub struct WireFunctionCall {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub arguments: Value,
}

/// Error body returned by the provider
#[derive(Debug, Deserialize)]
pub struct WireError {
    pub error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct WireErrorDetail {
    pub message: String,

    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    #[serde(default)]
    pub code: Option<Value>,
}
