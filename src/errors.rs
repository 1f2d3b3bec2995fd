//! Error types for the gateway
//!
//! Provides structured error handling using thiserror. Errors fall into two
//! classes: client-input errors (missing or malformed query parameters, 400)
//! and downstream errors (storage provider or filesystem failures, 500).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::model::ApiResponse;

/// Main error type for gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A required query parameter is absent
    #[error("{0}")]
    MissingParam(&'static str),

    /// A query parameter is present but unparseable
    #[error("{0}")]
    InvalidParam(&'static str),

    /// Local file named in an upload request does not exist
    #[error("file does not exist: {0}")]
    FileNotFound(String),

    /// Copy or move refused because the destination is already taken
    #[error("destination object already exists: {0}")]
    DestinationExists(String),

    /// Storage provider operation failed
    #[error("storage error: {0}")]
    Storage(#[from] object_store::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation context wrapped around an underlying error
    #[error("{0}: {1}")]
    Context(&'static str, #[source] Box<GatewayError>),
}

impl GatewayError {
    /// Wrap the error with an operation-level message prefix
    pub fn context(self, context: &'static str) -> Self {
        GatewayError::Context(context, Box::new(self))
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingParam(_) | GatewayError::InvalidParam(_) => StatusCode::BAD_REQUEST,
            GatewayError::Context(_, inner) => inner.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiResponse::<()>::error(status.as_u16(), self.to_string());
        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GatewayError>;
