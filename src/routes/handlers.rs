//! Request handlers for the file-management API
//!
//! Each handler validates its query parameters, rejects missing or
//! malformed input with a 400 envelope before touching storage, then calls
//! the shared storage client and wraps the outcome in the JSON envelope.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::errors::{GatewayError, Result};
use crate::model::{ApiResponse, DownloadData, ListResponse};
use crate::storage::{ObjectStorage, MAX_LIST_LIMIT};

/// Validity window for private download links
const PRIVATE_URL_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Health check endpoint
#[instrument]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe endpoint
#[instrument]
pub async fn ready() -> impl IntoResponse {
    (StatusCode::OK, "Ready")
}

/// Prometheus metrics endpoint
#[instrument]
pub async fn metrics() -> impl IntoResponse {
    use crate::metrics::REGISTRY;
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Treat an absent or empty query value as missing
fn required(value: Option<String>, msg: &'static str) -> Result<String> {
    value.filter(|v| !v.is_empty()).ok_or(GatewayError::MissingParam(msg))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "objectName")]
    pub object_name: Option<String>,
}

/// Upload a server-local file - GET /api/v1/upload
#[instrument(skip(storage))]
pub async fn upload_file(
    State(storage): State<Arc<dyn ObjectStorage>>,
    Query(params): Query<UploadQuery>,
) -> Result<impl IntoResponse> {
    let file_path = required(params.file_path, "filePath and objectName are required parameters")?;
    let object_name = required(params.object_name, "filePath and objectName are required parameters")?;

    info!(file_path = %file_path, object_name = %object_name, "upload request");

    let stat = storage
        .upload(Path::new(&file_path), &object_name)
        .await
        .map_err(|e| {
            error!(error = %e, "upload failed");
            e.context("upload failed")
        })?;

    Ok(Json(ApiResponse::with_data("upload succeeded", stat)))
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(rename = "objectName")]
    pub object_name: Option<String>,
    #[serde(rename = "accessType")]
    pub access_type: Option<String>,
}

/// Generate a download link - GET /api/v1/download
///
/// accessType defaults to private; a private link is signed with the
/// account credentials and expires two hours after the request.
#[instrument(skip(storage))]
pub async fn download_link(
    State(storage): State<Arc<dyn ObjectStorage>>,
    Query(params): Query<DownloadQuery>,
) -> Result<impl IntoResponse> {
    let object_name = required(params.object_name, "objectName is a required parameter")?;
    let access_type = params.access_type.unwrap_or_else(|| "private".to_string());

    info!(object_name = %object_name, access_type = %access_type, "download link request");

    let download_url = if access_type == "private" {
        storage
            .presigned_url(&object_name, PRIVATE_URL_TTL)
            .await
            .map_err(|e| {
                error!(error = %e, "signing failed");
                e.context("failed to generate download link")
            })?
    } else {
        storage.public_url(&object_name)
    };

    Ok(Json(ApiResponse::with_data(
        "download link generated",
        DownloadData { download_url },
    )))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(rename = "objectName")]
    pub object_name: Option<String>,
}

/// Delete an object - DELETE /api/v1/delete
#[instrument(skip(storage))]
pub async fn delete_file(
    State(storage): State<Arc<dyn ObjectStorage>>,
    Query(params): Query<DeleteQuery>,
) -> Result<impl IntoResponse> {
    let object_name = required(params.object_name, "objectName is a required parameter")?;

    info!(object_name = %object_name, "delete request");

    storage.delete(&object_name).await.map_err(|e| {
        error!(error = %e, "delete failed");
        e.context("failed to delete file")
    })?;

    Ok(Json(ApiResponse::message("file deleted")))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub prefix: Option<String>,
    pub marker: Option<String>,
    /// Kept as a string so a bad value falls back to the default instead of
    /// rejecting the request
    pub limit: Option<String>,
}

/// List bucket contents - GET /api/v1/list
#[instrument(skip(storage))]
pub async fn list_files(
    State(storage): State<Arc<dyn ObjectStorage>>,
    Query(params): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let prefix = params.prefix.unwrap_or_default();
    let marker = params.marker.unwrap_or_default();
    let limit = params
        .limit
        .as_deref()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| (1..=MAX_LIST_LIMIT).contains(n))
        .unwrap_or(MAX_LIST_LIMIT);

    info!(prefix = %prefix, marker = %marker, limit, "list request");

    let page = storage.list(&prefix, &marker, limit).await.map_err(|e| {
        error!(error = %e, "list failed");
        e.context("error getting file list")
    })?;

    Ok(Json(ListResponse {
        code: 200,
        msg: "file list retrieved".into(),
        files: page.files,
        next_marker: page.next_marker,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TransferQuery {
    #[serde(rename = "srcObject")]
    pub src_object: Option<String>,
    #[serde(rename = "destObject")]
    pub dest_object: Option<String>,
    pub force: Option<String>,
}

/// Shared validation for copy and move
fn parse_transfer(params: TransferQuery) -> Result<(String, String, bool)> {
    let src = required(params.src_object, "srcObject and destObject are required parameters")?;
    let dest = required(params.dest_object, "srcObject and destObject are required parameters")?;
    let force = match params.force.as_deref() {
        None => false,
        Some(v) => v
            .parse::<bool>()
            .map_err(|_| GatewayError::InvalidParam("invalid value for force parameter"))?,
    };
    Ok((src, dest, force))
}

/// Copy an object - POST /api/v1/copy
#[instrument(skip(storage))]
pub async fn copy_file(
    State(storage): State<Arc<dyn ObjectStorage>>,
    Query(params): Query<TransferQuery>,
) -> Result<impl IntoResponse> {
    let (src, dest, force) = parse_transfer(params)?;

    info!(src = %src, dest = %dest, force, "copy request");

    storage.copy(&src, &dest, force).await.map_err(|e| {
        error!(error = %e, "copy failed");
        e.context("failed to copy file")
    })?;

    Ok(Json(ApiResponse::message("file copied")))
}

/// Move an object - POST /api/v1/move
#[instrument(skip(storage))]
pub async fn move_file(
    State(storage): State<Arc<dyn ObjectStorage>>,
    Query(params): Query<TransferQuery>,
) -> Result<impl IntoResponse> {
    let (src, dest, force) = parse_transfer(params)?;

    info!(src = %src, dest = %dest, force, "move request");

    storage.rename(&src, &dest, force).await.map_err(|e| {
        error!(error = %e, "move failed");
        e.context("failed to move file")
    })?;

    Ok(Json(ApiResponse::message("file moved")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileInfo, UploadInfo};
    use crate::routes;
    use crate::storage::ListPage;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Records every storage invocation so tests can assert the wrapper was
    /// never reached on input errors.
    #[derive(Default)]
    struct StubStorage {
        calls: AtomicUsize,
        last_limit: AtomicUsize,
        fail_delete: bool,
    }

    #[async_trait]
    impl ObjectStorage for StubStorage {
        async fn upload(&self, _local_path: &Path, _object: &str) -> Result<UploadInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(UploadInfo {
                content_length: 10,
                etag: "etag-1".into(),
                last_modified: Utc::now(),
            })
        }

        fn public_url(&self, object: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            format!("https://media.example.com/{object}")
        }

        async fn presigned_url(&self, object: &str, expires_in: Duration) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                "https://media.example.com/{object}?X-Amz-Expires={}",
                expires_in.as_secs()
            ))
        }

        async fn delete(&self, object: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete {
                return Err(GatewayError::Storage(object_store::Error::NotFound {
                    path: object.to_string(),
                    source: "no such key".into(),
                }));
            }
            Ok(())
        }

        async fn list(&self, _prefix: &str, _marker: &str, limit: usize) -> Result<ListPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_limit.store(limit, Ordering::SeqCst);
            Ok(ListPage {
                files: vec![FileInfo {
                    key: "a.txt".into(),
                    content_length: 3,
                    etag: "etag-a".into(),
                    last_modified: Utc::now(),
                }],
                next_marker: String::new(),
            })
        }

        async fn copy(&self, _src: &str, _dest: &str, _force: bool) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn rename(&self, _src: &str, _dest: &str, _force: bool) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn send(stub: Arc<StubStorage>, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let router = routes::create_router(stub);
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_upload_missing_params_never_hits_storage() {
        let stub = Arc::new(StubStorage::default());
        let (status, body) = send(stub.clone(), "GET", "/api/v1/upload?filePath=/tmp/a.txt").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert!(body["msg"].as_str().unwrap().contains("objectName"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upload_returns_metadata() {
        let stub = Arc::new(StubStorage::default());
        let (status, body) = send(
            stub.clone(),
            "GET",
            "/api/v1/upload?filePath=/tmp/a.txt&objectName=a.txt",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
        assert_eq!(body["data"]["content_length"], 10);
        assert_eq!(body["data"]["etag"], "etag-1");
    }

    #[tokio::test]
    async fn test_download_defaults_to_private_with_two_hour_expiry() {
        let stub = Arc::new(StubStorage::default());
        let (status, body) = send(stub, "GET", "/api/v1/download?objectName=a.txt").await;
        assert_eq!(status, StatusCode::OK);
        let url = body["data"]["downloadURL"].as_str().unwrap();
        assert!(url.contains("X-Amz-Expires=7200"));
    }

    #[tokio::test]
    async fn test_download_public_is_unsigned() {
        let stub = Arc::new(StubStorage::default());
        let (status, body) = send(stub, "GET", "/api/v1/download?objectName=a.txt&accessType=public").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["downloadURL"], "https://media.example.com/a.txt");
    }

    #[tokio::test]
    async fn test_download_missing_object_name() {
        let stub = Arc::new(StubStorage::default());
        let (status, body) = send(stub.clone(), "GET", "/api/v1/download").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["msg"].as_str().unwrap().contains("objectName"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_object_name() {
        let stub = Arc::new(StubStorage::default());
        let (status, _) = send(stub.clone(), "DELETE", "/api/v1/delete").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_wraps_downstream_error() {
        let stub = Arc::new(StubStorage {
            fail_delete: true,
            ..Default::default()
        });
        let (status, body) = send(stub, "DELETE", "/api/v1/delete?objectName=a.txt").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 500);
        assert!(body["msg"].as_str().unwrap().starts_with("failed to delete file:"));
    }

    #[tokio::test]
    async fn test_list_limit_fallback() {
        for query in [
            "/api/v1/list?limit=abc",
            "/api/v1/list?limit=5000",
            "/api/v1/list?limit=0",
            "/api/v1/list",
        ] {
            let stub = Arc::new(StubStorage::default());
            let (status, _) = send(stub.clone(), "GET", query).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(stub.last_limit.load(Ordering::SeqCst), MAX_LIST_LIMIT, "query: {query}");
        }
    }

    #[tokio::test]
    async fn test_list_passes_valid_limit() {
        let stub = Arc::new(StubStorage::default());
        let (status, body) = send(stub.clone(), "GET", "/api/v1/list?limit=25&prefix=docs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stub.last_limit.load(Ordering::SeqCst), 25);
        assert_eq!(body["files"][0]["key"], "a.txt");
        assert_eq!(body["next_marker"], "");
    }

    #[tokio::test]
    async fn test_copy_missing_params() {
        let stub = Arc::new(StubStorage::default());
        let (status, body) = send(stub.clone(), "POST", "/api/v1/copy?srcObject=a.txt").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["msg"].as_str().unwrap().contains("destObject"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_copy_rejects_bad_force() {
        let stub = Arc::new(StubStorage::default());
        let (status, body) = send(
            stub.clone(),
            "POST",
            "/api/v1/copy?srcObject=a.txt&destObject=b.txt&force=yes",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["msg"].as_str().unwrap().contains("force"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_move_succeeds() {
        let stub = Arc::new(StubStorage::default());
        let (status, body) = send(
            stub.clone(),
            "POST",
            "/api/v1/move?srcObject=a.txt&destObject=b.txt&force=true",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_responds() {
        let stub = Arc::new(StubStorage::default());
        let router = routes::create_router(stub);
        let response = router
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
