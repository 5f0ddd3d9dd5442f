//! Configuration for the relay
//!
//! Settings are resolved in three layers: the YAML file (with `${VAR}`
//! interpolation), then `CHATRELAY_*` environment overrides, then validation.

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use env::{
    apply_env_overrides, apply_overrides_with, interpolate_env_vars, interpolate_with, ENV_PREFIX,
    OPENROUTER_API_KEY_VAR,
};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{
    AppConfig, ChatDefaults, ConnectionConfig, ProviderConfig, RetryConfig, ServerConfig,
    Settings, DEFAULT_MODEL, LOG_LEVELS, OPENROUTER_BASE_URL,
};
pub use secrets::SecretString;
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;
use tracing::debug;

/// Load settings from a YAML file, then apply environment overrides
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<Settings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    let mut settings = parse_yaml(&content, &path.to_string_lossy())?;
    apply_env_overrides(&mut settings)?;

    ConfigValidator::new().validate(&settings)?;
    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings from defaults and the environment only
pub fn load_from_env() -> ConfigResult<Settings> {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings)?;

    ConfigValidator::new().validate(&settings)?;
    Ok(settings)
}

/// Load settings from an optional file
pub fn load(path: Option<&Path>) -> ConfigResult<Settings> {
    match path {
        Some(path) => load_from_yaml(path),
        None => load_from_env(),
    }
}

/// Parse YAML settings text, interpolating `${VAR}` references first
///
/// No environment overrides or validation are applied.
pub fn parse_yaml(content: &str, origin: &str) -> ConfigResult<Settings> {
    let interpolated = interpolate_env_vars(content)?;

    // An empty document means "all defaults"
    if interpolated.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
        path: origin.to_string(),
        line: e.location().map(|l| l.line()),
        column: e.location().map(|l| l.column()),
        message: e.to_string(),
    })
}
