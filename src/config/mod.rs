//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! compiled defaults
//!     → loader.rs (optional TOML file, then environment overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to HttpServer, which derives per-subsystem state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Environment variables override the file so containers need no file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, load_config_with, ConfigError};
pub use schema::{
    DependencyConfig, ErrorVerbosity, ListenerConfig, LogFormat, ObservabilityConfig,
    ServiceConfig,
};
pub use validation::{validate_config, ValidationError};
