//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener for the configured address
//! - Report bind failures with the address that failed
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last, after config and logging are ready

use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for startup operations.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the TCP listener described by `config`.
pub async fn bind_listener(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    if let Ok(local) = listener.local_addr() {
        tracing::info!(address = %local, "Listener bound");
    }
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let config = ListenerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        };
        let listener = bind_listener(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ListenerConfig {
            host: "127.0.0.1".into(),
            port: taken.local_addr().unwrap().port(),
        };
        let err = bind_listener(&config).await.unwrap_err();
        assert!(err.to_string().contains("127.0.0.1"));
    }
}
