//! Provider error types and handling

use crate::converter::ConversionError;
use std::time::Duration;
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur when interacting with the LLM provider
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication failed (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Invalid request that should not be retried (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Temporary server error (5xx)
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response body was not valid JSON
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider answered but the answer could not be converted
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl ProviderError {
    /// Determine if this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimit { .. } => true,
            Self::Timeout(_) => true,
            Self::ServerError { .. } => true,
            Self::Network(_) => true,
            Self::Authentication(_) => false,
            Self::InvalidRequest(_) => false,
            Self::Parse(_) => false,
            Self::Configuration(_) => false,
            Self::Conversion(_) => false,
        }
    }

    /// Delay requested by the provider, if any
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Short machine-readable kind, used in logs and API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network_error",
            Self::Authentication(_) => "authentication_error",
            Self::RateLimit { .. } => "rate_limit",
            Self::InvalidRequest(_) => "invalid_request",
            Self::ServerError { .. } => "server_error",
            Self::Timeout(_) => "timeout",
            Self::Parse(_) => "parse_error",
            Self::Configuration(_) => "configuration_error",
            Self::Conversion(ConversionError::MalformedResponse(_)) => "malformed_response",
            Self::Conversion(_) => "conversion_error",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_connect() {
            ProviderError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err.to_string())
    }
}
