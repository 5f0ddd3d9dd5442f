//! Protocol module for chat messages and the provider wire format
//!
//! `types` holds the internal representation used everywhere in the relay;
//! `wire` holds the JSON shapes exchanged with the chat completions API.

pub mod types;
pub mod wire;

pub use types::{
    ChatMessage, Content, ContentBlock, LlmResponse, Role, TextBlock, ToolCall, ToolResult,
    ToolResultBlock, ToolSchema, ToolUseBlock, Usage, CONTENT_TYPE_TEXT, CONTENT_TYPE_TOOL_RESULT,
    CONTENT_TYPE_TOOL_USE, STOP_REASON_END_TURN, STOP_REASON_TOOL_USE,
};
pub use wire::{WireMessage, WireRequest, WireResponse, WireTool};
