//! Versioned public API (`/api/v1`).

pub mod handlers;

use axum::{routing::get, Router};

use crate::http::server::AppState;
use self::handlers::*;

pub fn setup_api_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/items", get(list_items).post(create_item))
}
