//! Response envelopes and central error translation.
//!
//! # Responsibilities
//! - Define the success and failure JSON envelopes
//! - Map handler failures to status codes (`ApiError`)
//! - Translate every failure into the envelope in one place
//! - Log failures with the request correlation id
//!
//! # Design Decisions
//! - `ApiError::into_response` only tags the response; the envelope
//!   middleware owns the body so that logging and verbosity live together
//! - Server error messages are hidden under `ErrorVerbosity::Generic`;
//!   client error messages are always shown

use std::backtrace::{Backtrace, BacktraceStatus};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::config::ErrorVerbosity;
use crate::http::request::RequestIdExt;
use crate::items::InvalidItem;
use crate::observability::metrics;

/// Message shown instead of server error details in generic mode.
pub const GENERIC_ERROR_MESSAGE: &str = "Internal server error";

/// Current UTC time in RFC 3339 with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Success envelope: `{success, data, count?, requestId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub request_id: String,
}

impl<T> Envelope<T> {
    pub fn new(data: T, request_id: String) -> Self {
        Self {
            success: true,
            data,
            count: None,
            request_id,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// Envelope for a sequence, with `count` set to its length.
    pub fn list(data: Vec<T>, request_id: String) -> Self {
        let count = data.len();
        Self {
            success: true,
            data,
            count: Some(count),
            request_id,
        }
    }
}

/// Failure envelope: `{success: false, error, requestId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub request_id: String,
}

/// Failures a handler can surface.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] InvalidItem),

    #[error("{0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Route not found")]
    RouteNotFound,

    #[error("Request timed out")]
    RequestTimeout,

    #[error("{message}")]
    Internal { message: String, trace: String },
}

impl ApiError {
    /// Build an internal error, capturing a backtrace when enabled
    /// (`RUST_BACKTRACE`).
    pub fn internal(message: impl Into<String>) -> Self {
        let backtrace = Backtrace::capture();
        let trace = match backtrace.status() {
            BacktraceStatus::Captured => backtrace.to_string(),
            _ => String::new(),
        };
        ApiError::Internal {
            message: message.into(),
            trace,
        }
    }

    /// The status code this error declares.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller under the given policy.
    pub fn public_message(&self, verbosity: ErrorVerbosity) -> String {
        if verbosity == ErrorVerbosity::Generic && self.status().is_server_error() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

/// Marker left on a response for the envelope middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport(pub Arc<ApiError>);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(ErrorReport(Arc::new(self)));
        response
    }
}

/// Central error translator.
///
/// Rewrites every response tagged with an [`ErrorReport`] into an
/// [`ErrorBody`] carrying the request's correlation id, and logs it.
pub async fn error_envelope(
    State(verbosity): State<ErrorVerbosity>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request.request_id();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let Some(ErrorReport(error)) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };

    match error.as_ref() {
        ApiError::Internal { message, trace } => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %message,
                backtrace = %trace,
                "Unhandled error"
            );
        }
        ApiError::RouteNotFound => {
            tracing::warn!(request_id = %request_id, method = %method, path = %path, "Route not found");
        }
        other => {
            tracing::info!(
                request_id = %request_id,
                path = %path,
                status = other.status().as_u16(),
                error = %other,
                "Request rejected"
            );
        }
    }

    let body = ErrorBody {
        success: false,
        error: error.public_message(verbosity),
        request_id,
    };
    (error.status(), Json(body)).into_response()
}

/// Tag the bare 408 produced by the timeout layer so the envelope
/// middleware renders it like any other failure.
pub async fn tag_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && response.extensions().get::<ErrorReport>().is_none()
    {
        return ApiError::RequestTimeout.into_response();
    }
    response
}

/// Fallback for unmatched paths and methods.
pub async fn not_found(method: axum::http::Method, uri: Uri) -> ApiError {
    metrics::record_unmatched(method.as_str());
    tracing::debug!(path = %uri.path(), "No route matched");
    ApiError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let missing = InvalidItem::MissingFields(vec!["name"]);
        assert_eq!(ApiError::from(missing).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ApiError::RouteNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::RequestTimeout.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(ApiError::internal("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_generic_verbosity_hides_server_errors_only() {
        let internal = ApiError::internal("connection pool exhausted");
        assert_eq!(internal.public_message(ErrorVerbosity::Generic), GENERIC_ERROR_MESSAGE);
        assert_eq!(
            internal.public_message(ErrorVerbosity::Detailed),
            "connection pool exhausted"
        );

        let bad = ApiError::BadRequest("Invalid JSON".into());
        assert_eq!(bad.public_message(ErrorVerbosity::Generic), "Invalid JSON");
    }

    #[test]
    fn test_envelope_shape() {
        let list = serde_json::to_value(Envelope::list(vec![1, 2], "abc".into())).unwrap();
        assert_eq!(
            list,
            serde_json::json!({"success": true, "data": [1, 2], "count": 2, "requestId": "abc"})
        );

        let single = serde_json::to_value(Envelope::new("x", "abc".into())).unwrap();
        assert!(single.get("count").is_none());
    }

    #[tokio::test]
    async fn test_timeout_response_is_tagged() {
        let tagged = tag_timeout(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        let report = tagged.extensions().get::<ErrorReport>().unwrap();
        assert!(matches!(report.0.as_ref(), ApiError::RequestTimeout));

        let untouched = tag_timeout(StatusCode::OK.into_response()).await;
        assert!(untouched.extensions().get::<ErrorReport>().is_none());
    }

    #[test]
    fn test_into_response_tags_report() {
        let response = ApiError::RouteNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorReport>().is_some());
    }
}
