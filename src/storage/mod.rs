//! Storage client abstraction
//!
//! A single trait seam between the HTTP handlers and the object storage
//! provider. The production implementation talks to a Kodo-style bucket
//! through its S3-compatible interface; tests substitute a stub. The client
//! is constructed once at startup and shared read-only across requests.

mod kodo;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::errors::Result;
use crate::model::{FileInfo, UploadInfo};

pub use kodo::KodoStore;

/// Upper bound on entries returned by a single listing call
pub const MAX_LIST_LIMIT: usize = 1000;

/// One page of a bucket listing
#[derive(Debug)]
pub struct ListPage {
    pub files: Vec<FileInfo>,
    /// Continuation marker; empty when no further pages exist
    pub next_marker: String,
}

/// Object storage operations exposed to the handlers
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload a local file under the given object name and report the stored
    /// object's metadata
    async fn upload(&self, local_path: &Path, object: &str) -> Result<UploadInfo>;

    /// Unsigned download link for a publicly readable bucket
    fn public_url(&self, object: &str) -> String;

    /// Signed download link valid for the given window
    async fn presigned_url(&self, object: &str, expires_in: Duration) -> Result<String>;

    /// Delete an object
    async fn delete(&self, object: &str) -> Result<()>;

    /// List objects under a prefix, resuming after `marker` when non-empty
    async fn list(&self, prefix: &str, marker: &str, limit: usize) -> Result<ListPage>;

    /// Copy an object; refuses an existing destination unless `force` is set
    async fn copy(&self, src: &str, dest: &str, force: bool) -> Result<()>;

    /// Move an object; refuses an existing destination unless `force` is set
    async fn rename(&self, src: &str, dest: &str, force: bool) -> Result<()>;
}
