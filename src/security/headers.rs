//! Security response headers.
//!
//! # Responsibilities
//! - Deny framing, disable MIME sniffing, restrict referrers and
//!   cross-origin embedding on every response
//!
//! # Design Decisions
//! - Headers a handler already set are left untouched
//! - Can be switched off (`security.enable_headers`) for local debugging

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Header set applied to responses.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("x-xss-protection", "0"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-permitted-cross-domain-policies", "none"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    (
        "content-security-policy",
        "default-src 'self'; frame-ancestors 'none'; object-src 'none'; base-uri 'self'",
    ),
];

pub async fn security_headers(
    State(enabled): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if !enabled {
        return response;
    }

    let headers = response.headers_mut();
    for &(name, value) in SECURITY_HEADERS {
        let name = HeaderName::from_static(name);
        if !headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(enabled: bool) -> Router {
        Router::new()
            .route(
                "/",
                get(|| async { ([("x-frame-options", "SAMEORIGIN")], "ok") }),
            )
            .layer(middleware::from_fn_with_state(enabled, security_headers))
    }

    #[tokio::test]
    async fn test_headers_added_without_overwriting() {
        let response = app(true)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["referrer-policy"], "no-referrer");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    }

    #[tokio::test]
    async fn test_disabled() {
        let response = app(false)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().get("x-content-type-options").is_none());
    }
}
