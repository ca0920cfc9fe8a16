//! Item service library.
//!
//! A small HTTP service with orchestrator probes, Prometheus metrics,
//! request correlation and an in-memory item resource.

pub mod api;
pub mod config;
pub mod health;
pub mod http;
pub mod items;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
