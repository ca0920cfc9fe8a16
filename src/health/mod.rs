//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health  → handlers.rs (process alive, no dependencies)
//! GET /ready   → handlers.rs → readiness.rs (bounded dependency checks)
//! GET /metrics → handlers.rs → observability::metrics (+ runtime.rs gauges)
//! ```
//!
//! # Design Decisions
//! - Liveness and readiness are independent; a failing dependency never
//!   fails liveness
//! - Process facts come from an injected `RuntimeInfo`, not globals

pub mod handlers;
pub mod readiness;
pub mod runtime;

pub use readiness::{CheckResult, ReadinessCheck, ReadinessProbe, TcpDependencyCheck};
pub use runtime::{ProcessSample, RuntimeInfo, StaticRuntime, SystemRuntime};
