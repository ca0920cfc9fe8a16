//! Request correlation.
//!
//! # Responsibilities
//! - Reuse the inbound correlation id or generate one (UUID v4)
//! - Replace inbound ids that are not visible ASCII
//! - Echo the id on every response
//! - Expose the id to handlers and middleware
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An inbound id is passed through verbatim, never rewritten

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, Extensions, HeaderName, Request},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Default correlation header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Placeholder used when no id is attached (handlers mounted without the
/// correlation layers, e.g. in isolated tests).
const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Read access to the correlation id assigned by [`SetRequestIdLayer`].
pub trait RequestIdExt {
    fn request_id(&self) -> String;
}

impl RequestIdExt for Extensions {
    fn request_id(&self) -> String {
        self.get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .unwrap_or(UNKNOWN_REQUEST_ID)
            .to_string()
    }
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> String {
        self.extensions().request_id()
    }
}

/// Per-request context available to handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            request_id: parts.extensions.request_id(),
        })
    }
}

/// Layer assigning the correlation id on the way in.
pub fn set_request_id(header: HeaderName) -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(header, MakeRequestUuid)
}

/// Drop an inbound correlation header that is not visible ASCII so a fresh
/// id is generated. Mounted outside [`set_request_id`].
pub async fn discard_invalid_request_id(
    State(header): State<HeaderName>,
    mut request: axum::extract::Request,
    next: Next,
) -> Response {
    let invalid = request
        .headers()
        .get(&header)
        .is_some_and(|value| value.to_str().is_err());
    if invalid {
        tracing::debug!(header = %header, "Discarding non-ASCII correlation id");
        request.headers_mut().remove(&header);
    }
    next.run(request).await
}

/// Layer copying the correlation id onto the response.
pub fn propagate_request_id(header: HeaderName) -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(header)
}
