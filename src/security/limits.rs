//! Request size limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size for body extractors
//!
//! # Design Decisions
//! - Applied once at the router so every extractor shares one limit
//! - Oversized bodies surface as 413 through the error envelope

use axum::extract::DefaultBodyLimit;

use crate::config::schema::SecurityConfig;

/// Body limit layer for the configured maximum size.
pub fn body_limit(config: &SecurityConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.max_body_size)
}
