//! HTTP routes for the file-management API
//!
//! - GET /api/v1/upload - upload a server-local file
//! - GET /api/v1/download - generate a public or private download link
//! - DELETE /api/v1/delete - delete an object
//! - GET /api/v1/list - list bucket contents with marker pagination
//! - POST /api/v1/copy - copy an object within the bucket
//! - POST /api/v1/move - move an object within the bucket
//!
//! Plus /healthz, /ready and /metrics service endpoints.

mod handlers;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::storage::ObjectStorage;

/// Create the API router
pub fn create_router(storage: Arc<dyn ObjectStorage>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .route("/api/v1/upload", get(handlers::upload_file))
        .route("/api/v1/download", get(handlers::download_link))
        .route("/api/v1/delete", delete(handlers::delete_file))
        .route("/api/v1/list", get(handlers::list_files))
        .route("/api/v1/copy", post(handlers::copy_file))
        .route("/api/v1/move", post(handlers::move_file))
        .with_state(storage)
}
