//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up the request pipeline (correlation id, access log, security
//!   headers, CORS, compression, error envelope, timeout, body limit)
//! - Bind server to listener
//! - Graceful shutdown with a bounded grace period

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderName,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::api::setup_api_router;
use crate::config::schema::ServiceSection;
use crate::config::ServiceConfig;
use crate::health::handlers as health;
use crate::health::{ReadinessCheck, ReadinessProbe, RuntimeInfo, SystemRuntime};
use crate::http::request::{self, X_REQUEST_ID};
use crate::http::response::{error_envelope, not_found, tag_timeout, ApiError};
use crate::items::ItemStore;
use crate::observability::{logging, metrics};
use crate::security::{headers, limits};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ServiceSection>,
    pub items: Arc<ItemStore>,
    pub readiness: Arc<ReadinessProbe>,
    pub runtime: Arc<dyn RuntimeInfo>,
    pub metrics: Option<PrometheusHandle>,
}

/// HTTP server for the item service.
pub struct HttpServer {
    config: ServiceConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let metrics = if config.observability.metrics_enabled {
            match metrics::init_metrics() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install metrics recorder, /metrics disabled");
                    None
                }
            }
        } else {
            None
        };

        let items = if config.items.seed_samples {
            ItemStore::with_samples()
        } else {
            ItemStore::new()
        };

        let state = AppState {
            service: Arc::new(config.service.clone()),
            items: Arc::new(items),
            readiness: Arc::new(ReadinessProbe::from_config(&config.readiness)),
            runtime: Arc::new(SystemRuntime::new()),
            metrics,
        };

        Self { config, state }
    }

    /// Replace the runtime info provider.
    pub fn with_runtime_info(mut self, runtime: Arc<dyn RuntimeInfo>) -> Self {
        self.state.runtime = runtime;
        self
    }

    /// Register an additional readiness check.
    pub fn with_readiness_check(mut self, check: Arc<dyn ReadinessCheck>) -> Self {
        Arc::make_mut(&mut self.state.readiness).add(check);
        self
    }

    /// Shared handler state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn correlation_header(&self) -> HeaderName {
        HeaderName::try_from(self.config.observability.correlation_header.as_str()).unwrap_or_else(|_| {
            tracing::warn!(
                header = %self.config.observability.correlation_header,
                "Invalid correlation header, using x-request-id"
            );
            HeaderName::from_static(X_REQUEST_ID)
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers are listed innermost first; a request passes them bottom-up.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let header = self.correlation_header();

        let mut routes = Router::new()
            .route("/health", get(health::liveness))
            .route("/ready", get(health::readiness))
            .merge(setup_api_router());
        if self.state.metrics.is_some() {
            routes = routes.route("/metrics", get(health::metrics));
        }

        routes
            .route_layer(CatchPanicLayer::custom(panic_response))
            .route_layer(middleware::from_fn(metrics::track_metrics))
            .fallback(not_found)
            .method_not_allowed_fallback(not_found)
            .with_state(self.state.clone())
            .layer(limits::body_limit(&self.config.security))
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.timeouts.request_secs)))
            .layer(middleware::map_response(tag_timeout))
            .layer(middleware::from_fn_with_state(
                self.config.error_verbosity(),
                error_envelope,
            ))
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn_with_state(
                self.config.security.enable_headers,
                headers::security_headers,
            ))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(logging::request_span)
                    .on_request(logging::log_request_entry)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(LatencyUnit::Millis),
                    ),
            )
            .layer(request::propagate_request_id(header.clone()))
            .layer(request::set_request_id(header.clone()))
            .layer(middleware::from_fn_with_state(
                header,
                request::discard_invalid_request_id,
            ))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests
    /// for at most the configured grace period.
    ///
    /// A closed shutdown channel counts as a shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.state.service.name,
            environment = %self.state.service.environment,
            "HTTP server starting"
        );

        let app = self.router();
        let grace = Duration::from_secs(self.config.lifecycle.shutdown_grace_secs);

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                })
                .await
        });

        tokio::select! {
            result = &mut server => {
                tracing::warn!("HTTP server exited without a shutdown signal");
                return result.map_err(std::io::Error::other)?;
            }
            _ = shutdown.recv() => {
                tracing::info!(grace_secs = grace.as_secs(), "Stopped accepting connections, draining");
            }
        }

        let _ = stop_tx.send(());
        match tokio::time::timeout(grace, &mut server).await {
            Ok(result) => result.map_err(std::io::Error::other)??,
            Err(_) => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Grace period elapsed with requests in flight, forcing shutdown"
                );
                server.abort();
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Turn a handler panic into an internal error for the envelope middleware.
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::internal(format!("Handler panicked: {}", message)).into_response()
}
