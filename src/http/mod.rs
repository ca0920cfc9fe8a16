//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware pipeline)
//!     → request.rs (assign/echo correlation id)
//!     → body.rs (decode JSON or form bodies)
//!     → handlers (health, api)
//!     → response.rs (envelopes, central error translation)
//!     → Send to client
//! ```

pub mod body;
pub mod request;
pub mod response;
pub mod server;

pub use body::Payload;
pub use request::{RequestContext, RequestIdExt, X_REQUEST_ID};
pub use response::{ApiError, Envelope, ErrorBody};
pub use server::{AppState, HttpServer};
