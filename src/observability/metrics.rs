//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define service metrics (request counts, latency, in-flight requests)
//! - Refresh process gauges on scrape
//! - Render the Prometheus text exposition format
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `http_requests_in_flight` (gauge): requests currently being handled
//! - `process_*` (gauges): memory, CPU and uptime of this process
//!
//! # Design Decisions
//! - One recorder per process, shared by every server instance
//! - Labels use the matched route template to bound cardinality
//! - Histogram buckets tuned for typical web latencies

use std::sync::Mutex;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

use crate::health::runtime::RuntimeInfo;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const REQUESTS_IN_FLIGHT: &str = "http_requests_in_flight";

/// Route label for requests that matched nothing.
pub const UNMATCHED_ROUTE: &str = "unmatched";

const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Install the Prometheus recorder, or return the already installed one.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let mut handle = HANDLE.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(existing) = handle.as_ref() {
        return Ok(existing.clone());
    }

    let installed = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), LATENCY_BUCKETS)?
        .install_recorder()?;

    tracing::info!("Prometheus recorder installed");
    *handle = Some(installed.clone());
    Ok(installed)
}

/// Record a completed request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("path", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!(REQUESTS_TOTAL, &labels).increment(1);
    metrics::histogram!(REQUEST_DURATION, &labels).record(start.elapsed().as_secs_f64());
}

/// Count a request that matched no route.
pub fn record_unmatched(method: &str) {
    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => UNMATCHED_ROUTE,
        "status" => "404"
    )
    .increment(1);
}

/// Decrements the in-flight gauge when dropped, including on panic unwind.
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        metrics::gauge!(REQUESTS_IN_FLIGHT).increment(1.0);
        InFlight
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        metrics::gauge!(REQUESTS_IN_FLIGHT).decrement(1.0);
    }
}

/// Per-route instrumentation middleware (mounted with `route_layer`).
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let _guard = InFlight::enter();
    let response = next.run(request).await;

    record_request(&method, &route, response.status().as_u16(), start);
    response
}

/// Refresh process gauges and render the exposition text.
pub fn render(handle: &PrometheusHandle, runtime: &dyn RuntimeInfo) -> String {
    let sample = runtime.sample();
    metrics::gauge!("process_resident_memory_bytes").set(sample.rss_bytes as f64);
    metrics::gauge!("process_virtual_memory_bytes").set(sample.virtual_bytes as f64);
    metrics::gauge!("process_cpu_usage_percent").set(f64::from(sample.cpu_percent));
    metrics::gauge!("process_uptime_seconds").set(runtime.uptime().as_secs_f64());

    handle.run_upkeep();
    handle.render()
}
