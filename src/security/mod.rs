//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (cap request body size)
//!     → handler
//! Outgoing response:
//!     → headers.rs (add security headers)
//! ```
//!
//! # Design Decisions
//! - Defense in depth: headers on every response, including errors
//! - No trust in client input

pub mod headers;
pub mod limits;
