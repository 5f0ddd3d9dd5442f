//! Errors raised while loading relay settings

use std::fmt;
use thiserror::Error;

/// Result type for settings loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure to produce a usable [`super::Settings`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML that does not match the settings schema, including unknown keys
    #[error("invalid settings in '{path}'{}: {message}", location(.line, .column))]
    ParseError {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error(transparent)]
    ValidationError(#[from] ValidationError),

    /// A `${VAR}` reference in the settings file names an unset variable
    #[error("environment variable '{var}' referenced in settings is not set")]
    EnvVarNotFound { var: String },

    /// A `CHATRELAY_*` override could not be parsed into its field's type
    #[error("cannot apply {var}={value}: {message}")]
    InvalidEnvOverride {
        var: String,
        value: String,
        message: String,
    },
}

fn location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" at {line}:{column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

/// A settings value that parsed but is not acceptable
#[derive(Debug, Error)]
pub struct ValidationError {
    /// Dotted path of the offending setting, e.g. `retry.max_delay_ms`
    pub field_path: String,
    pub kind: ValidationErrorKind,
    /// How to fix it, when there is an obvious remedy
    pub hint: Option<&'static str>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "setting '{}' {}", self.field_path, self.kind)?;
        match self.hint {
            Some(hint) => write!(f, " ({hint})"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum ValidationErrorKind {
    #[error("is required")]
    RequiredFieldMissing,

    #[error("must be one of {expected}, got '{actual}'")]
    InvalidValue { expected: String, actual: String },

    #[error("is out of range: {message}")]
    OutOfRange { message: String },

    #[error("is malformed: {message}")]
    InvalidFormat { message: String },

    /// Conflicts with another setting
    #[error("conflicts with another setting: {message}")]
    Incompatible { message: String },

    #[error("is not a usable URL: {message}")]
    InvalidUrl { message: String },
}

impl ValidationError {
    fn new(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn required(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::RequiredFieldMissing)
    }

    pub fn invalid_value(
        field_path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidValue {
                expected: expected.into(),
                actual: actual.into(),
            },
        )
    }

    pub fn out_of_range(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::OutOfRange {
                message: message.into(),
            },
        )
    }

    pub fn invalid_format(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidFormat {
                message: message.into(),
            },
        )
    }

    pub fn incompatible(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::Incompatible {
                message: message.into(),
            },
        )
    }

    pub fn invalid_url(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidUrl {
                message: message.into(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_the_setting() {
        let err = ValidationError::required("provider.api_key").with_hint("set CHATRELAY_API_KEY");
        assert_eq!(
            err.to_string(),
            "setting 'provider.api_key' is required (set CHATRELAY_API_KEY)"
        );

        let err = ValidationError::incompatible("retry.max_delay_ms", "must be >= initial_delay_ms");
        assert_eq!(
            ConfigError::from(err).to_string(),
            "setting 'retry.max_delay_ms' conflicts with another setting: must be >= initial_delay_ms"
        );
    }

    #[test]
    fn test_parse_error_location() {
        let err = ConfigError::ParseError {
            path: "relay.yaml".to_string(),
            line: Some(3),
            column: Some(7),
            message: "unknown field".to_string(),
        };
        assert_eq!(err.to_string(), "invalid settings in 'relay.yaml' at 3:7: unknown field");

        let err = ConfigError::ParseError {
            path: "inline".to_string(),
            line: None,
            column: None,
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "invalid settings in 'inline': bad");
    }
}
