//! Graceful shutdown behaviour.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use item_service::health::ReadinessCheck;
use item_service::http::HttpServer;
use reqwest::StatusCode;

mod common;

/// Readiness check that takes a fixed time to pass.
struct SlowCheck(Duration);

#[async_trait]
impl ReadinessCheck for SlowCheck {
    fn name(&self) -> &str {
        "slow"
    }

    async fn check(&self) -> Result<(), String> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = common::start(common::test_config()).await;
    let client = common::client();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server should stop promptly")
        .unwrap();
    assert!(result.is_ok());

    assert!(client.get(format!("http://{}/health", server.addr)).send().await.is_err());
}

#[tokio::test]
async fn test_in_flight_request_completes_during_drain() {
    let mut config = common::test_config();
    config.readiness.timeout_ms = 5_000;
    config.lifecycle.shutdown_grace_secs = 10;
    let server = HttpServer::new(config)
        .with_readiness_check(Arc::new(SlowCheck(Duration::from_millis(500))));
    let server = common::start_server(server).await;

    let url = server.url("/ready");
    let in_flight = tokio::spawn(async move { common::client().get(url).send().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    server.shutdown.trigger();

    let res = in_flight.await.unwrap().expect("in-flight request should complete");
    assert_eq!(res.status(), StatusCode::OK);

    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server should stop after draining")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_grace_period_bounds_shutdown() {
    let mut config = common::test_config();
    config.readiness.timeout_ms = 60_000;
    config.lifecycle.shutdown_grace_secs = 1;
    let server = HttpServer::new(config)
        .with_readiness_check(Arc::new(SlowCheck(Duration::from_secs(30))));
    let server = common::start_server(server).await;

    let url = server.url("/ready");
    let _stuck = tokio::spawn(async move { common::client().get(url).send().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let start = Instant::now();
    server.shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(10), server.handle)
        .await
        .expect("grace period should bound shutdown")
        .unwrap();
    assert!(result.is_ok());
    assert!(start.elapsed() < Duration::from_secs(5));
}
