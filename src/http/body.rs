//! Request body parsing.
//!
//! Accepts JSON and URL-encoded form bodies. Size limits are enforced by
//! `DefaultBodyLimit` in the router; exceeding them surfaces here as a
//! buffering rejection and is reported as 413.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, FormRejection, JsonRejection},
        FromRequest, Request,
    },
    http::{header, StatusCode},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::http::response::ApiError;

/// Body of a request decoded according to its `Content-Type`.
///
/// Bodies with no or an unrecognized content type are drained against the
/// size limit and then decode as an empty JSON object, so required-field
/// validation reports them.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Unparsed,
}

fn body_kind(request: &Request) -> BodyKind {
    let mime = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json")) {
        BodyKind::Json
    } else if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Unparsed
    }
}

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&request) {
            BodyKind::Json => {
                let Json(value) = Json::<T>::from_request(request, state).await?;
                Ok(Payload(value))
            }
            BodyKind::Form => {
                let Form(value) = Form::<T>::from_request(request, state).await?;
                Ok(Payload(value))
            }
            BodyKind::Unparsed => {
                let ignored = Bytes::from_request(request, state).await?;
                tracing::debug!(bytes = ignored.len(), "Unrecognized content type, treating body as empty");
                serde_json::from_str("{}")
                    .map(Payload)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
            }
        }
    }
}

fn rejection_to_error(status: StatusCode, text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else if status.is_client_error() {
        ApiError::BadRequest(text)
    } else {
        ApiError::internal(text)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        rejection_to_error(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        rejection_to_error(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        rejection_to_error(rejection.status(), rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Reading {
        name: Option<String>,
        value: Option<f64>,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn extract(req: Request) -> Result<Reading, ApiError> {
        Payload::<Reading>::from_request(req, &()).await.map(|Payload(p)| p)
    }

    #[tokio::test]
    async fn test_json_body() {
        let reading = extract(request(Some("application/json; charset=utf-8"), r#"{"name":"a","value":1.5}"#))
            .await
            .unwrap();
        assert_eq!(reading, Reading { name: Some("a".into()), value: Some(1.5) });
    }

    #[tokio::test]
    async fn test_form_body() {
        let reading = extract(request(Some("application/x-www-form-urlencoded"), "name=a&value=2.25"))
            .await
            .unwrap();
        assert_eq!(reading, Reading { name: Some("a".into()), value: Some(2.25) });
    }

    #[tokio::test]
    async fn test_unparsed_body_is_empty() {
        let reading = extract(request(Some("text/plain"), "name=a")).await.unwrap();
        assert_eq!(reading, Reading::default());

        let reading = extract(request(None, r#"{"name":"a"}"#)).await.unwrap();
        assert_eq!(reading, Reading::default());
    }

    #[tokio::test]
    async fn test_oversized_unparsed_body_is_too_large() {
        use axum::{extract::DefaultBodyLimit, routing::post, Router};
        use tower::ServiceExt;

        let app = Router::new()
            .route(
                "/",
                post(|Payload(reading): Payload<Reading>| async move {
                    format!("{:?}", reading.name)
                }),
            )
            .layer(DefaultBodyLimit::max(128));

        let oversized = "x".repeat(4096);
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "text/plain")
                    .body(Body::from(oversized.clone()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = app
            .oneshot(Request::builder().method("POST").uri("/").body(Body::from(oversized)).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let err = extract(request(Some("application/json"), "{not json")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
