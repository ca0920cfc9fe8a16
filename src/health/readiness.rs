//! Readiness checks.
//!
//! # Responsibilities
//! - Define the dependency check interface
//! - Probe configured TCP dependencies (database, cache, broker)
//! - Run all checks concurrently, each under a bounded timeout
//!
//! # Design Decisions
//! - A hung dependency fails its check instead of hanging the probe
//! - Liveness never consults this module

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::Serialize;
use tokio::net::TcpStream;

use crate::config::schema::ReadinessConfig;

#[async_trait]
pub trait ReadinessCheck: Send + Sync {
    /// Name reported when the check fails.
    fn name(&self) -> &str;

    async fn check(&self) -> Result<(), String>;
}

/// Passes when a TCP connection to `address` can be opened.
pub struct TcpDependencyCheck {
    name: String,
    address: String,
}

impl TcpDependencyCheck {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

#[async_trait]
impl ReadinessCheck for TcpDependencyCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), String> {
        TcpStream::connect(&self.address)
            .await
            .map(|_| ())
            .map_err(|e| format!("{}: {}", self.address, e))
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The set of checks gating readiness.
#[derive(Clone)]
pub struct ReadinessProbe {
    checks: Vec<Arc<dyn ReadinessCheck>>,
    timeout: Duration,
}

impl ReadinessProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            checks: Vec::new(),
            timeout,
        }
    }

    /// One TCP check per configured dependency.
    pub fn from_config(config: &ReadinessConfig) -> Self {
        let mut probe = Self::new(Duration::from_millis(config.timeout_ms));
        for dep in &config.dependencies {
            probe.add(Arc::new(TcpDependencyCheck::new(&dep.name, &dep.address)));
        }
        probe
    }

    pub fn add(&mut self, check: Arc<dyn ReadinessCheck>) {
        self.checks.push(check);
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check concurrently. Results keep registration order.
    pub async fn run(&self) -> Vec<CheckResult> {
        let timeout = self.timeout;
        join_all(self.checks.iter().map(|check| async move {
            let outcome = tokio::time::timeout(timeout, check.check()).await;
            let error = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(_) => Some(format!("timed out after {}ms", timeout.as_millis())),
            };
            if let Some(error) = &error {
                tracing::warn!(check = check.name(), error = %error, "Readiness check failed");
            }
            CheckResult {
                name: check.name().to_string(),
                healthy: error.is_none(),
                error,
            }
        }))
        .await
    }
}
