//! Startup orchestration.
//!
//! Validate configuration, bind the listener, serve until a signal arrives.
//! Any startup error is fatal: nothing is served unless every step succeeds.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{validate, ConfigError, EdgeConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};

/// Errors that stop the process.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind the configured address.
pub async fn bind(address: SocketAddr) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}

/// Run the edge process until a termination signal.
pub async fn run(config: EdgeConfig) -> Result<(), StartupError> {
    let config = validate(&config)?;

    tracing::info!(
        bind_address = %config.bind_address,
        upstream = %config.upstream,
        static_root = %config.static_files.root.display(),
        "Configuration loaded"
    );

    let listener = bind(config.bind_address).await?;
    tracing::info!(
        "Server starting on http://localhost:{}",
        config.bind_address.port()
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown));

    HttpServer::from_validated(config)
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}
