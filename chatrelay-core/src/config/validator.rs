//! Configuration validation utilities

use super::env::ENV_VAR_PATTERN;
use super::error::ValidationError;
use super::schema::Settings;
use tracing::warn;

/// Configuration validator with additional validation rules
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate settings with extended rules
    pub fn validate(&self, settings: &Settings) -> Result<(), ValidationError> {
        // First run the built-in validation
        settings.validate()?;

        self.validate_no_placeholders(settings)?;
        self.validate_api_key(settings)?;
        self.check_cors(settings);

        Ok(())
    }

    /// Placeholders left after interpolation mean a value was never resolved
    fn validate_no_placeholders(&self, settings: &Settings) -> Result<(), ValidationError> {
        let fields = [
            ("provider.api_key", settings.provider.api_key.expose_secret()),
            ("provider.base_url", settings.provider.base_url.as_str()),
            ("provider.model", settings.provider.model.as_str()),
        ];

        for (path, value) in fields {
            let vars = self.extract_env_vars(value);
            if !vars.is_empty() {
                return Err(ValidationError::invalid_format(
                    path,
                    format!("unresolved environment variable ${{{}}}", vars[0]),
                ));
            }
        }

        Ok(())
    }

    fn validate_api_key(&self, settings: &Settings) -> Result<(), ValidationError> {
        let key = settings.provider.api_key.expose_secret();

        if key.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format(
                "provider.api_key",
                "must not contain whitespace",
            ));
        }

        if !key.starts_with("sk-") {
            warn!(
                "API key {} does not look like an OpenRouter key",
                settings.provider.api_key.partial_redact()
            );
        }

        Ok(())
    }

    fn check_cors(&self, settings: &Settings) {
        if settings.server.cors_origins.iter().any(|origin| origin == "*")
            && settings.server.cors_origins.len() > 1
        {
            warn!("CORS origin '*' allows any origin; other entries are ignored");
        }
    }

    /// Extract environment variable names from a string
    pub fn extract_env_vars(&self, text: &str) -> Vec<String> {
        ENV_VAR_PATTERN
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}
