//! Chat service error types

use crate::providers::ProviderError;
use thiserror::Error;

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors returned by [`super::ChatService::process_query`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    /// The request itself is unusable (e.g. empty prompt)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider call failed after retries
    #[error("Conversation failed at iteration {iteration}: {source}")]
    Provider {
        iteration: u32,
        #[source]
        source: ProviderError,
    },
}

impl ChatError {
    /// The underlying provider error, if any
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            ChatError::Provider { source, .. } => Some(source),
            ChatError::InvalidRequest(_) => None,
        }
    }
}
