//! Core value types for chat conversations
//!
//! Everything here is an immutable value object built per request. Message
//! content is either plain text or an ordered list of typed content blocks;
//! block types the relay does not model are kept as raw JSON so they can be
//! forwarded to the provider untouched.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Block type tag for text content
pub const CONTENT_TYPE_TEXT: &str = "text";
/// Block type tag for a tool invocation requested by the model
pub const CONTENT_TYPE_TOOL_USE: &str = "tool_use";
/// Block type tag for the result of a tool invocation
pub const CONTENT_TYPE_TOOL_RESULT: &str = "tool_result";

/// Stop reason reported when the model wants tools executed
pub const STOP_REASON_TOOL_USE: &str = "tool_use";
/// Stop reason reported at the natural end of a turn
pub const STOP_REASON_END_TURN: &str = "end_turn";

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions sent ahead of the conversation
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a wire role name
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,

    /// Provider-specific fields (e.g. cache hints) carried along unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUseBlock {
    pub id: String,
    pub name: String,
    pub input: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a tool invocation, sent back to the model as user content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultBlock {
    pub tool_use_id: String,

    /// Either a string or a list of content blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tagged unit of message content
///
/// `text`, `tool_use` and `tool_result` blocks are parsed into typed variants.
/// Anything else, including a known tag whose required fields are missing,
/// is kept verbatim in [`ContentBlock::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(TextBlock),
    ToolUse(ToolUseBlock),
    ToolResult(ToolResultBlock),
    Other(Value),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedBlock<'a> {
    Text(&'a TextBlock),
    ToolUse(&'a ToolUseBlock),
    ToolResult(&'a ToolResultBlock),
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(TextBlock {
            text: text.into(),
            extra: Map::new(),
        })
    }

    /// Create a tool use block
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentBlock::ToolUse(ToolUseBlock {
            id: id.into(),
            name: name.into(),
            input,
            extra: Map::new(),
        })
    }

    /// Create a tool result block
    pub fn tool_result(tool_use_id: impl Into<String>, content: Value, is_error: bool) -> Self {
        ContentBlock::ToolResult(ToolResultBlock {
            tool_use_id: tool_use_id.into(),
            content: Some(content),
            is_error: Some(is_error),
            extra: Map::new(),
        })
    }

    /// Build a block from raw JSON, falling back to an opaque block
    ///
    /// The typed variant is used only when it reproduces `value` unchanged.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = &value else {
            return ContentBlock::Other(value);
        };

        let mut fields = map.clone();
        let kind = fields.remove("type");
        let fields = Value::Object(fields);

        let parsed = match kind.as_ref().and_then(Value::as_str) {
            Some(CONTENT_TYPE_TEXT) => serde_json::from_value(fields).map(ContentBlock::Text),
            Some(CONTENT_TYPE_TOOL_USE) => {
                serde_json::from_value(fields).map(ContentBlock::ToolUse)
            }
            Some(CONTENT_TYPE_TOOL_RESULT) => {
                serde_json::from_value(fields).map(ContentBlock::ToolResult)
            }
            _ => return ContentBlock::Other(value),
        };

        // A typed block must serialize back to exactly the input, so explicit
        // nulls and other lossy shapes stay opaque
        match parsed {
            Ok(block) if serde_json::to_value(&block).is_ok_and(|typed| typed == value) => block,
            _ => ContentBlock::Other(value),
        }
    }

    /// The block's `type` tag, if it has one
    pub fn block_type(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(_) => Some(CONTENT_TYPE_TEXT),
            ContentBlock::ToolUse(_) => Some(CONTENT_TYPE_TOOL_USE),
            ContentBlock::ToolResult(_) => Some(CONTENT_TYPE_TOOL_RESULT),
            ContentBlock::Other(value) => value.get("type").and_then(Value::as_str),
        }
    }

    /// Text carried by a `text` block; `""` when the block has no text field
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(block) => Some(&block.text),
            ContentBlock::Other(value) if self.block_type() == Some(CONTENT_TYPE_TEXT) => {
                Some(value.get("text").and_then(Value::as_str).unwrap_or(""))
            }
            _ => None,
        }
    }

    /// Whether this block carries a tool result payload
    pub fn is_tool_result(&self) -> bool {
        self.block_type() == Some(CONTENT_TYPE_TOOL_RESULT)
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentBlock::Text(block) => TaggedBlock::Text(block).serialize(serializer),
            ContentBlock::ToolUse(block) => TaggedBlock::ToolUse(block).serialize(serializer),
            ContentBlock::ToolResult(block) => TaggedBlock::ToolResult(block).serialize(serializer),
            ContentBlock::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ContentBlock::from_value)
    }
}

/// Content of a message: plain text or an ordered list of blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text content
    Text(String),
    /// Ordered content blocks (may be empty)
    Blocks(Vec<ContentBlock>),
}

impl Content {
    /// Blocks of this content, if it is a block list
    pub fn blocks(&self) -> Option<&[ContentBlock]> {
        match self {
            Content::Text(_) => None,
            Content::Blocks(blocks) => Some(blocks),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Vec<ContentBlock>> for Content {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        Content::Blocks(blocks)
    }
}

/// A message in the conversation
///
/// The role is fixed at creation. Replacing content yields a new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    content: Content,
}

impl ChatMessage {
    /// Create a message with the given role and content
    pub fn new(role: Role, content: impl Into<Content>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, Content::Text(text.into()))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Produce a new message with the same role and different content
    pub fn with_content(&self, content: impl Into<Content>) -> Self {
        Self::new(self.role, content)
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Tool definition offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool input
    pub input_schema: Value,
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// Outcome of executing one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_use_id: String,
    /// String or structured JSON output
    pub content: Value,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(tool_use_id: impl Into<String>, content: impl Into<Value>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(tool_use_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: Value::String(message.into()),
            is_error: true,
        }
    }
}

/// Parsed result of one provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: Content,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl LlmResponse {
    pub fn new(content: impl Into<Content>, stop_reason: Option<String>) -> Self {
        Self {
            content: content.into(),
            stop_reason,
            usage: None,
            model: None,
        }
    }

    /// All text of the response, space-joined
    pub fn text(&self) -> String {
        crate::converter::MessageConverter::extract_text(&self.content)
    }

    /// Tool calls requested in the response
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        crate::converter::MessageConverter::extract_tool_calls(&self.content)
    }

    pub fn has_tool_calls(&self) -> bool {
        self.content
            .blocks()
            .is_some_and(|blocks| blocks.iter().any(|b| matches!(b, ContentBlock::ToolUse(_))))
    }
}
