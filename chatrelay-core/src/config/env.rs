//! Environment variable interpolation and overrides for configuration

use super::error::ConfigError;
use super::schema::Settings;
use super::secrets::SecretString;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// Prefix of every override variable
pub const ENV_PREFIX: &str = "CHATRELAY_";

/// Variable consulted for the API key when no override is set
pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";

pub(crate) static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
});

/// Interpolate `${VAR}` references in a configuration string
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    interpolate_with(content, |name| std::env::var(name).ok())
}

/// Interpolate `${VAR}` references using the given lookup
pub fn interpolate_with<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = content.to_string();

    for cap in ENV_VAR_PATTERN.captures_iter(content) {
        let var_name = &cap[1];
        let value = lookup(var_name).ok_or_else(|| ConfigError::EnvVarNotFound {
            var: var_name.to_string(),
        })?;
        result = result.replace(&cap[0], &value);
    }

    Ok(result)
}

/// Apply `CHATRELAY_*` overrides from the process environment
pub fn apply_env_overrides(settings: &mut Settings) -> Result<(), ConfigError> {
    apply_overrides_with(settings, |name| std::env::var(name).ok())
}

/// Apply `CHATRELAY_*` overrides using the given lookup
///
/// `OPENROUTER_API_KEY` fills the API key only when neither the file nor
/// `CHATRELAY_API_KEY` provides one.
pub fn apply_overrides_with<F>(settings: &mut Settings, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| {
        let name = format!("{}{}", ENV_PREFIX, suffix);
        lookup(&name).map(|value| (name, value))
    };

    if let Some((_, value)) = var("APP_NAME") {
        settings.app.name = value;
    }
    if let Some((_, value)) = var("LOG_LEVEL") {
        settings.app.log_level = value;
    }
    if let Some((_, value)) = var("HOST") {
        settings.server.host = value;
    }
    if let Some((name, value)) = var("PORT") {
        settings.server.port = parse_override(&name, &value)?;
    }
    if let Some((_, value)) = var("BASE_URL") {
        settings.provider.base_url = value;
    }
    if let Some((_, value)) = var("MODEL") {
        settings.provider.model = value;
    }
    if let Some((_, value)) = var("API_KEY") {
        settings.provider.api_key = SecretString::new(value);
    } else if settings.provider.api_key.is_empty() {
        if let Some(value) = lookup(OPENROUTER_API_KEY_VAR) {
            settings.provider.api_key = SecretString::new(value);
        }
    }
    if let Some((name, value)) = var("TIMEOUT_MS") {
        settings.connection.request_timeout_ms = parse_override(&name, &value)?;
    }
    if let Some((name, value)) = var("MAX_RETRIES") {
        settings.retry.max_retries = parse_override(&name, &value)?;
    }
    if let Some((name, value)) = var("MAX_TOKENS") {
        settings.chat.max_tokens = parse_override(&name, &value)?;
    }
    if let Some((name, value)) = var("TEMPERATURE") {
        settings.chat.temperature = parse_override(&name, &value)?;
    }
    if let Some((name, value)) = var("MAX_ITERATIONS") {
        settings.chat.max_iterations = parse_override(&name, &value)?;
    }
    if let Some((_, value)) = var("SYSTEM_PROMPT") {
        settings.chat.system_prompt = Some(value);
    }

    Ok(())
}

fn parse_override<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvOverride {
            var: var.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}
