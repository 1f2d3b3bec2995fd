//! HTTP server implementation
//!
//! Sets up the Axum HTTP server with:
//! - File-management API routes
//! - Middleware (request tracing, timeout, compression, CORS)
//! - Graceful shutdown
//! - Health/readiness probes

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::errors::Result;
use crate::routes;
use crate::storage::ObjectStorage;

/// HTTP server for the gateway
pub struct Server {
    config: Config,
    storage: Arc<dyn ObjectStorage>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { config, storage }
    }

    /// Build the Axum router with all middleware
    fn build_router(&self) -> Router {
        routes::create_router(self.storage.clone()).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(std::time::Duration::from_secs(
                    self.config.server.timeout_secs,
                )))
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
    }

    /// Start the server and run until shutdown signal
    pub async fn start<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.build_router();

        let listener = tokio::net::TcpListener::bind(self.config.server.bind_address).await?;
        info!(address = %self.config.server.bind_address, "Server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
