//! Conversion between chat messages and the provider wire format
//!
//! `MessageConverter` is the single place where message shapes are mapped:
//! plain text, content block lists, and the structured provider response.
//! Every function is pure; callers may use them from any number of tasks.
//!
//! Typical flow for one chat turn:
//!
//! 1. `create_user_message(prompt)` and append it to the conversation
//! 2. `to_wire_messages(&conversation)` right before the HTTP call
//! 3. `from_wire_response(&raw_json)` on the provider's answer
//! 4. `create_assistant_message(response)` and append it

mod error;

pub use error::{ConversionError, ConversionResult};

use crate::protocol::wire::{WireFunction, WireResponse, WireToolCall};
use crate::protocol::{
    ChatMessage, Content, ContentBlock, LlmResponse, Role, ToolCall, ToolResult, ToolSchema,
    WireMessage, WireTool, CONTENT_TYPE_TEXT, STOP_REASON_TOOL_USE,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// OpenAI finish reason for tool calls, reported to callers as `tool_use`
const FINISH_REASON_TOOL_CALLS: &str = "tool_calls";

/// Input accepted by [`MessageConverter::create_assistant_message`]
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantReply {
    /// Raw content that still needs normalizing
    Content(Content),
    /// A parsed provider response whose content is already normalized
    Response(LlmResponse),
}

impl From<LlmResponse> for AssistantReply {
    fn from(response: LlmResponse) -> Self {
        AssistantReply::Response(response)
    }
}

impl From<Content> for AssistantReply {
    fn from(content: Content) -> Self {
        AssistantReply::Content(content)
    }
}

impl From<&str> for AssistantReply {
    fn from(text: &str) -> Self {
        AssistantReply::Content(text.into())
    }
}

impl From<String> for AssistantReply {
    fn from(text: String) -> Self {
        AssistantReply::Content(text.into())
    }
}

impl From<Vec<ContentBlock>> for AssistantReply {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        AssistantReply::Content(blocks.into())
    }
}

/// Stateless message format conversion
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageConverter;

impl MessageConverter {
    // -- Content extraction --

    /// Extract plain text from message content
    ///
    /// Text is returned unchanged; for block lists the `text` blocks are
    /// joined with a single space and the result is trimmed. Content without
    /// text blocks yields `""`.
    pub fn extract_text(content: &Content) -> String {
        match content {
            Content::Text(text) => text.clone(),
            Content::Blocks(blocks) => join_text(blocks.iter().filter_map(ContentBlock::as_text)),
        }
    }

    /// Extract text from raw JSON content of unknown shape
    ///
    /// Never fails: values that are neither a string nor an array are
    /// rendered as JSON text.
    pub fn extract_text_from_json(content: &Value) -> String {
        match content {
            Value::String(text) => text.clone(),
            Value::Array(items) => join_text(items.iter().filter_map(|item| {
                (item.get("type").and_then(Value::as_str) == Some(CONTENT_TYPE_TEXT))
                    .then(|| item.get("text").and_then(Value::as_str).unwrap_or(""))
            })),
            other => other.to_string(),
        }
    }

    /// Extract tool calls from `tool_use` blocks
    pub fn extract_tool_calls(content: &Content) -> Vec<ToolCall> {
        let Some(blocks) = content.blocks() else {
            return Vec::new();
        };

        blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse(tool_use) => Some(ToolCall {
                    id: tool_use.id.clone(),
                    name: tool_use.name.clone(),
                    input: tool_use.input.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    // -- Message construction --

    /// Create a user message
    pub fn create_user_message(content: impl Into<Content>) -> ChatMessage {
        ChatMessage::new(Role::User, normalize_content(content.into()))
    }

    /// Create an assistant message from content or a parsed provider response
    pub fn create_assistant_message(reply: impl Into<AssistantReply>) -> ChatMessage {
        let content = match reply.into() {
            AssistantReply::Response(response) => response.content,
            AssistantReply::Content(content) => normalize_content(content),
        };

        ChatMessage::new(Role::Assistant, content)
    }

    /// Create a user message carrying tool execution results
    pub fn create_tool_result_message(results: &[ToolResult]) -> ChatMessage {
        let blocks: Vec<ContentBlock> = results
            .iter()
            .map(|result| {
                ContentBlock::tool_result(
                    result.tool_use_id.clone(),
                    result.content.clone(),
                    result.is_error,
                )
            })
            .collect();

        debug!("Created tool result message with {} block(s)", blocks.len());

        ChatMessage::new(Role::User, Content::Blocks(blocks))
    }

    /// Parse an inbound JSON message (`{"role": ..., "content": ...}`)
    pub fn message_from_json(value: &Value) -> ConversionResult<ChatMessage> {
        Self::validate_message(value)?;

        // validate_message guarantees both fields exist and the role is known
        let role = value
            .get("role")
            .and_then(Value::as_str)
            .and_then(Role::parse)
            .ok_or_else(|| ConversionError::InvalidMessage("Invalid role".to_string()))?;

        let content = match value.get("content") {
            Some(Value::String(text)) => Content::Text(text.clone()),
            Some(Value::Array(items)) => Content::Blocks(
                items.iter().cloned().map(ContentBlock::from_value).collect(),
            ),
            Some(other) => {
                return Err(ConversionError::UnrecognizedContentShape(format!(
                    "expected a string or a list of blocks, got {}",
                    json_kind(other)
                )))
            }
            None => {
                return Err(ConversionError::InvalidMessage(
                    "Message must have a 'content' field".to_string(),
                ))
            }
        };

        Ok(ChatMessage::new(role, normalize_content(content)))
    }

    /// Validate the structure of a raw JSON message
    pub fn validate_message(value: &Value) -> ConversionResult<()> {
        let Some(object) = value.as_object() else {
            return Err(ConversionError::InvalidMessage(
                "Message must be a JSON object".to_string(),
            ));
        };

        let Some(role) = object.get("role") else {
            return Err(ConversionError::InvalidMessage(
                "Message must have a 'role' field".to_string(),
            ));
        };

        if role.as_str().and_then(Role::parse).is_none() {
            return Err(ConversionError::InvalidMessage(format!("Invalid role: {}", role)));
        }

        if !object.contains_key("content") {
            return Err(ConversionError::InvalidMessage(
                "Message must have a 'content' field".to_string(),
            ));
        }

        Ok(())
    }

    // -- Wire format --

    /// Convert a message to provider format
    pub fn to_wire_message(message: &ChatMessage) -> WireMessage {
        WireMessage {
            role: message.role(),
            content: message.content().clone(),
        }
    }

    /// Convert a conversation to provider format, preserving order
    pub fn to_wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
        messages.iter().map(Self::to_wire_message).collect()
    }

    /// Convert a tool schema to provider format
    pub fn tool_to_wire(tool: &ToolSchema) -> WireTool {
        WireTool {
            tool_type: "function".to_string(),
            function: WireFunction {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                parameters: Some(tool.input_schema.clone()),
            },
        }
    }

    /// Convert a raw provider response to an [`LlmResponse`]
    pub fn from_wire_response(raw: &Value) -> ConversionResult<LlmResponse> {
        let response = WireResponse::deserialize(raw)
            .map_err(|e| ConversionError::MalformedResponse(e.to_string()))?;

        Self::from_response(response)
    }

    /// Convert an already-deserialized provider response
    pub fn from_response(response: WireResponse) -> ConversionResult<LlmResponse> {
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(ConversionError::MalformedResponse(
                "No choices in provider response".to_string(),
            ));
        };

        let message = choice.message;
        let mut blocks = content_to_blocks(message.content);

        if let Some(tool_calls) = message.tool_calls {
            blocks.extend(tool_calls.into_iter().map(tool_call_to_block));
        }

        let stop_reason = choice.finish_reason.map(|reason| {
            if reason == FINISH_REASON_TOOL_CALLS {
                STOP_REASON_TOOL_USE.to_string()
            } else {
                reason
            }
        });

        let parsed = LlmResponse {
            content: Content::Blocks(blocks),
            stop_reason,
            usage: response.usage,
            model: response.model,
        };

        debug!(
            "Parsed provider response: {} block(s), stop_reason={:?}",
            parsed.content.blocks().map_or(0, <[ContentBlock]>::len),
            parsed.stop_reason
        );

        Ok(parsed)
    }
}

/// Normalize content for a new message
///
/// Text passes through. A list led by a tool result block is a tool payload
/// and is kept verbatim; other lists are kept as they are, except that an
/// empty list becomes empty text.
fn normalize_content(content: Content) -> Content {
    match content {
        Content::Text(text) => Content::Text(text),
        Content::Blocks(blocks) if is_tool_result_payload(&blocks) => {
            debug!("Keeping tool result payload of {} block(s) verbatim", blocks.len());
            Content::Blocks(blocks)
        }
        Content::Blocks(blocks) if blocks.is_empty() => Content::Text(String::new()),
        Content::Blocks(blocks) => Content::Blocks(blocks),
    }
}

fn is_tool_result_payload(blocks: &[ContentBlock]) -> bool {
    blocks.first().is_some_and(ContentBlock::is_tool_result)
}

fn join_text<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts.collect::<Vec<_>>().join(" ").trim().to_string()
}

/// Map response message content onto blocks
fn content_to_blocks(content: Value) -> Vec<ContentBlock> {
    match content {
        Value::String(text) => vec![ContentBlock::text(text)],
        Value::Array(items) => items.into_iter().map(ContentBlock::from_value).collect(),
        Value::Null => Vec::new(),
        other => {
            warn!("Unexpected {} content in provider response, keeping it as text", json_kind(&other));
            vec![ContentBlock::text(other.to_string())]
        }
    }
}

/// Convert an OpenAI-style tool call into a `tool_use` block
fn tool_call_to_block(call: WireToolCall) -> ContentBlock {
    let input = match call.function.arguments {
        Value::String(arguments) => serde_json::from_str(&arguments).unwrap_or_else(|e| {
            warn!("Tool call {} has unparseable arguments: {}", call.id, e);
            json!({})
        }),
        Value::Null => json!({}),
        other => other,
    };

    ContentBlock::tool_use(call.id, call.function.name, input)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
