use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::http::body::Payload;
use crate::http::request::RequestContext;
use crate::http::response::{timestamp, ApiError, Envelope};
use crate::http::server::AppState;
use crate::items::{CreateItemRequest, Item};

#[derive(Debug, Serialize)]
pub struct MemoryUsage {
    pub rss: u64,
    #[serde(rename = "virtual")]
    pub virtual_bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub version: String,
    pub environment: String,
    pub timestamp: String,
    /// Seconds since start.
    pub uptime: f64,
    pub memory: MemoryUsage,
    pub pid: u32,
}

pub async fn get_status(State(state): State<AppState>) -> Json<ServiceStatus> {
    let sample = state.runtime.sample();
    Json(ServiceStatus {
        service: state.service.name.clone(),
        version: state.service.version.clone(),
        environment: state.service.environment.clone(),
        timestamp: timestamp(),
        uptime: state.runtime.uptime().as_secs_f64(),
        memory: MemoryUsage {
            rss: sample.rss_bytes,
            virtual_bytes: sample.virtual_bytes,
        },
        pid: state.runtime.pid(),
    })
}

pub async fn list_items(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Json<Envelope<Vec<Item>>> {
    let items = state.items.list();
    tracing::debug!(request_id = %ctx.request_id, count = items.len(), "Listing items");
    Json(Envelope::list(items, ctx.request_id))
}

pub async fn create_item(
    State(state): State<AppState>,
    ctx: RequestContext,
    Payload(request): Payload<CreateItemRequest>,
) -> Result<(StatusCode, Json<Envelope<Item>>), ApiError> {
    let new_item = request.validate()?;
    let item = state.items.create(new_item);

    tracing::info!(request_id = %ctx.request_id, item_id = item.id, "Item created");
    Ok((StatusCode::CREATED, Json(Envelope::new(item, ctx.request_id))))
}
