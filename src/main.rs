//! Kodo Gateway - HTTP gateway for a Kodo-style object store
//!
//! Exposes file-management operations (upload, download links, delete,
//! list, copy, move) over a small JSON API and forwards each one to the
//! provider's S3-compatible interface.

mod config;
mod errors;
mod metrics;
mod model;
mod routes;
mod server;
mod storage;

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::server::Server;
use crate::storage::{KodoStore, ObjectStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with JSON output for structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kodo_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Initialize Prometheus metrics
    crate::metrics::init_metrics();

    info!("Starting Kodo Gateway");

    // Load configuration from environment and optional config file
    let config = Config::from_env()?;
    info!(
        bind_address = %config.server.bind_address,
        bucket = %config.kodo.bucket,
        region = %config.kodo.region,
        "Configuration loaded"
    );

    // One storage client for the whole process, shared across requests
    let storage: Arc<dyn ObjectStorage> = Arc::new(KodoStore::new(&config.kodo)?);
    info!("Storage client initialized");

    // Create and start the HTTP server
    let server = Server::new(config.clone(), storage);

    // Handle graceful shutdown
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal");
    };

    info!("Server starting on {}", config.server.bind_address);
    if let Err(e) = server.start(shutdown_signal).await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
