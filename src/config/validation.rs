//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check header names and dependency addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderName;
use tracing::Level;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::new("service.name", "must not be empty"));
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::new("listener.port", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }
    if config.readiness.timeout_ms == 0 {
        errors.push(ValidationError::new("readiness.timeout_ms", "must be greater than 0"));
    }
    if config.observability.log_level.parse::<Level>().is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if HeaderName::try_from(config.observability.correlation_header.as_str()).is_err() {
        errors.push(ValidationError::new(
            "observability.correlation_header",
            format!("invalid header name '{}'", config.observability.correlation_header),
        ));
    }

    for (i, dep) in config.readiness.dependencies.iter().enumerate() {
        let field = format!("readiness.dependencies[{}]", i);
        if dep.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.name", field), "must not be empty"));
        }
        // Only the syntax is checked here; resolution happens at probe time.
        if !has_host_and_port(&dep.address) {
            errors.push(ValidationError::new(
                format!("{}.address", field),
                format!("expected host:port, got '{}'", dep.address),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn has_host_and_port(address: &str) -> bool {
    if address.parse::<std::net::SocketAddr>().is_ok() {
        return true;
    }
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok_and(|p| p > 0),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DependencyConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.service.name = " ".into();
        config.listener.port = 0;
        config.security.max_body_size = 0;
        config.observability.log_level = "loud".into();
        config.observability.correlation_header = "bad header".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "service.name",
                "listener.port",
                "security.max_body_size",
                "observability.log_level",
                "observability.correlation_header",
            ]
        );
    }

    #[test]
    fn test_dependency_addresses() {
        let mut config = ServiceConfig::default();
        config.readiness.dependencies = vec![
            DependencyConfig { name: "postgres".into(), address: "db.internal:5432".into() },
            DependencyConfig { name: "redis".into(), address: "127.0.0.1:6379".into() },
            DependencyConfig { name: "kafka".into(), address: "kafka".into() },
            DependencyConfig { name: "".into(), address: "[::1]:9092".into() },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "readiness.dependencies[2].address");
        assert_eq!(errors[1].field, "readiness.dependencies[3].name");
    }
}
