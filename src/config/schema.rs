//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service identity reported by health and status endpoints.
    pub service: ServiceSection,

    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Response headers and request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Readiness probe settings.
    pub readiness: ReadinessConfig,

    /// Shutdown behaviour.
    pub lifecycle: LifecycleConfig,

    /// Item resource settings.
    pub items: ItemsConfig,

    /// Error response policy.
    pub errors: ErrorConfig,
}

impl ServiceConfig {
    /// How much detail server-side failures reveal to callers.
    ///
    /// An explicit `errors.expose_details` wins; otherwise production
    /// environments get generic messages.
    pub fn error_verbosity(&self) -> ErrorVerbosity {
        match self.errors.expose_details {
            Some(true) => ErrorVerbosity::Detailed,
            Some(false) => ErrorVerbosity::Generic,
            None if self.service.is_production() => ErrorVerbosity::Generic,
            None => ErrorVerbosity::Detailed,
        }
    }
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSection {
    /// Name reported in health payloads and logs.
    pub name: String,

    /// Version reported by `/health` and `/api/v1/status`.
    pub version: String,

    /// Environment label (development, staging, production, ...).
    pub environment: String,
}

impl ServiceSection {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
            || self.environment.eq_ignore_ascii_case("prod")
    }
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: "item-service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// Socket address string passed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security response headers.
    pub enable_headers: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Mount the `/metrics` endpoint.
    pub metrics_enabled: bool,

    /// Header carrying the correlation id in both directions.
    pub correlation_header: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: true,
            correlation_header: "x-request-id".to_string(),
        }
    }
}

/// Readiness probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Upper bound for each dependency check in milliseconds.
    pub timeout_ms: u64,

    /// Downstream dependencies that must be reachable before reporting ready.
    pub dependencies: Vec<DependencyConfig>,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            dependencies: Vec::new(),
        }
    }
}

/// A TCP-reachable dependency (database, cache, broker).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DependencyConfig {
    /// Name reported in readiness failures.
    pub name: String,

    /// Address as `host:port`.
    pub address: String,
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Time in-flight requests get to finish after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 30,
        }
    }
}

/// Item resource configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemsConfig {
    /// Start the store with the illustrative sample items.
    pub seed_samples: bool,
}

impl Default for ItemsConfig {
    fn default() -> Self {
        Self { seed_samples: true }
    }
}

/// Error response configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ErrorConfig {
    /// Force detailed (`true`) or generic (`false`) server error messages.
    /// Unset derives the policy from the environment label.
    pub expose_details: Option<bool>,
}

/// Detail level of server error messages shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorVerbosity {
    /// Replace server error messages with a fixed generic one.
    Generic,
    /// Surface the real message.
    Detailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.listener.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.security.max_body_size, 10 * 1024 * 1024);
        assert_eq!(config.observability.correlation_header, "x-request-id");
        assert!(config.items.seed_samples);
    }

    #[test]
    fn test_error_verbosity_follows_environment() {
        let mut config = ServiceConfig::default();
        assert_eq!(config.error_verbosity(), ErrorVerbosity::Detailed);

        config.service.environment = "Production".into();
        assert_eq!(config.error_verbosity(), ErrorVerbosity::Generic);

        config.errors.expose_details = Some(true);
        assert_eq!(config.error_verbosity(), ErrorVerbosity::Detailed);
    }

    #[test]
    fn test_partial_toml() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [listener]
            port = 8080

            [[readiness.dependencies]]
            name = "postgres"
            address = "127.0.0.1:5432"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.readiness.dependencies.len(), 1);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
