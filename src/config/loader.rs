//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::schema::{LogFormat, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value '{value}' for environment variable {key}")]
    Env { key: &'static str, value: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`], reading variables through `lookup` instead of
/// the process environment.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = lookup("SERVICE_NAME") {
        config.service.name = name;
    }
    if let Some(version) = lookup("SERVICE_VERSION") {
        config.service.version = version;
    }
    if let Some(env) = lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
        config.service.environment = env;
    }
    if let Some(host) = lookup("HOST") {
        config.listener.host = host;
    }
    if let Some(port) = parse_var(&lookup, "PORT")? {
        config.listener.port = port;
    }
    if let Some(secs) = parse_var(&lookup, "REQUEST_TIMEOUT_SECS")? {
        config.timeouts.request_secs = secs;
    }
    if let Some(size) = parse_var(&lookup, "MAX_BODY_SIZE")? {
        config.security.max_body_size = size;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = parse_var::<LogFormat, _>(&lookup, "LOG_FORMAT")? {
        config.observability.log_format = format;
    }
    if let Some(enabled) = parse_var(&lookup, "METRICS_ENABLED")? {
        config.observability.metrics_enabled = enabled;
    }
    if let Some(header) = lookup("CORRELATION_HEADER") {
        config.observability.correlation_header = header;
    }
    if let Some(ms) = parse_var(&lookup, "READINESS_TIMEOUT_MS")? {
        config.readiness.timeout_ms = ms;
    }
    if let Some(secs) = parse_var(&lookup, "SHUTDOWN_GRACE_SECS")? {
        config.lifecycle.shutdown_grace_secs = secs;
    }
    if let Some(expose) = parse_var(&lookup, "EXPOSE_ERROR_DETAILS")? {
        config.errors.expose_details = Some(expose);
    }

    Ok(())
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { key, value }),
    }
}
