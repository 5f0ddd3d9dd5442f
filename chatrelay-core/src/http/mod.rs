//! HTTP client module for the chat completions API
//!
//! This module implements the HTTP layer of the relay, handling:
//! - Connection pooling and client management
//! - Request body assembly from wire messages and tool schemas
//! - Error mapping and retry hints
//! - Request ID generation and correlation

pub mod client;
pub mod error;

pub use client::{HttpClient, HttpClientConfig};

use std::time::Duration;
use uuid::Uuid;

/// Path of the chat completions endpoint, relative to the base URL
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Default generation limit for one response
pub const DEFAULT_MAX_TOKENS: u32 = 10_000;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.4;

/// Options for one chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f64,

    /// Per-request timeout; the client's timeout applies when unset
    pub timeout: Option<Duration>,

    /// Unique request ID for correlation
    pub request_id: Uuid,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
            request_id: Uuid::new_v4(),
        }
    }
}

impl ChatOptions {
    /// Create options with defaults and a fresh request ID
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the timeout for this request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reuse a caller-supplied request ID
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }
}
