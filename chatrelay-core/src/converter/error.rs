//! Conversion error types

use thiserror::Error;

/// Result type for message conversion
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Errors raised while converting between message shapes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The provider response is missing a required field or has no choices
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Content is neither a string nor a list of blocks
    #[error("Unrecognized content shape: {0}")]
    UnrecognizedContentShape(String),

    /// An inbound message failed structural validation
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}
