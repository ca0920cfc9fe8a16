//! Item service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ correlation id ─▶ access log ─▶ security headers ─▶ CORS
//!                                                                         │
//!                      ┌──────────────────────────────────────────────────┘
//!                      ▼
//!                 compression ─▶ error envelope ─▶ timeout ─▶ body limit ─▶ router
//!                                                                           │
//!                  ┌────────────────────────┬──────────────────────────────┤
//!                  ▼                        ▼                              ▼
//!          /health /ready /metrics   /api/v1/status             /api/v1/items
//!             (health)              (runtime info)             (item store)
//!
//!     Cross-cutting: config (file + env), observability (tracing, metrics),
//!     lifecycle (signals, bounded graceful shutdown)
//! ```

use std::path::PathBuf;

use clap::Parser;

use item_service::config::load_config;
use item_service::lifecycle::{bind_listener, wait_for_termination, Shutdown};
use item_service::observability::logging::init_logging;
use item_service::HttpServer;

#[derive(Parser)]
#[command(name = "item-service")]
#[command(about = "Item service with health, readiness and metrics endpoints", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability)?;

    tracing::info!(
        service = %config.service.name,
        version = %config.service.version,
        environment = %config.service.environment,
        bind_address = %config.listener.bind_address(),
        request_timeout_secs = config.timeouts.request_secs,
        shutdown_grace_secs = config.lifecycle.shutdown_grace_secs,
        "Configuration loaded"
    );

    let listener = bind_listener(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_termination().await;
        trigger.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
