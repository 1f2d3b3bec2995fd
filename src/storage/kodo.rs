//! Kodo storage client
//!
//! Talks to the provider through its S3-compatible interface using
//! object_store::aws::AmazonS3 with static account credentials. One client
//! is built at startup from the loaded configuration; every request borrows
//! it, nothing here is mutated after construction.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions};
use std::sync::Arc;
use std::time::Duration;

use crate::config::KodoConfig;
use crate::errors::{GatewayError, Result};
use crate::metrics;
use crate::model::{FileInfo, UploadInfo};
use crate::storage::{ListPage, ObjectStorage, MAX_LIST_LIMIT};

/// Storage client bound to one bucket
pub struct KodoStore {
    store: Arc<AmazonS3>,
    /// Trimmed endpoint, reused as the public link base
    endpoint: String,
}

impl KodoStore {
    /// Build the client from provider settings
    ///
    /// Credentials are passed through as-is. Empty values are accepted and
    /// fail once the first provider call is made.
    pub fn new(config: &KodoConfig) -> Result<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key);

        if !config.endpoint.is_empty() {
            builder = builder.with_endpoint(&config.endpoint);
        }

        let store = builder.build()?;

        Ok(Self {
            store: Arc::new(store),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

/// Read a local file and put it under `object`, then ask the store for the
/// metadata of what was written. A direct head of the uploaded key recovers
/// size, ETag and timestamp without scanning the listing.
async fn store_file(store: &dyn ObjectStore, local_path: &std::path::Path, object: &Path) -> Result<UploadInfo> {
    let file_meta = match tokio::fs::metadata(local_path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(GatewayError::FileNotFound(local_path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    if !file_meta.is_file() {
        return Err(GatewayError::FileNotFound(local_path.display().to_string()));
    }

    let contents = tokio::fs::read(local_path).await?;

    let mime = mime_guess::from_path(local_path).first_or_octet_stream();
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, mime.to_string().into());
    let opts = PutOptions {
        attributes,
        ..Default::default()
    };

    store.put_opts(object, Bytes::from(contents).into(), opts).await?;

    let stored = store.head(object).await?;
    Ok(UploadInfo {
        content_length: stored.size as u64,
        etag: stored.e_tag.unwrap_or_default(),
        last_modified: stored.last_modified,
    })
}

/// Fetch one bounded page of the bucket listing
///
/// Entries strictly after `marker` are returned, at most `limit` of them.
/// `next_marker` is the key of the last returned entry when more pages
/// remain, and empty otherwise.
async fn list_page(store: &dyn ObjectStore, prefix: &str, marker: &str, limit: usize) -> Result<ListPage> {
    let limit = limit.clamp(1, MAX_LIST_LIMIT);
    let prefix_path = (!prefix.is_empty()).then(|| Path::from(prefix));

    let mut stream = if marker.is_empty() {
        store.list(prefix_path.as_ref())
    } else {
        store.list_with_offset(prefix_path.as_ref(), &Path::from(marker))
    };

    let mut files: Vec<FileInfo> = Vec::new();
    let mut next_marker = String::new();
    while let Some(entry) = stream.next().await {
        let entry = entry?;
        if files.len() == limit {
            // One entry past the page proves another page exists
            next_marker = files.last().map(|f| f.key.clone()).unwrap_or_default();
            break;
        }
        files.push(FileInfo::from(entry));
    }

    Ok(ListPage { files, next_marker })
}

/// Copy `src` to `dest`, optionally removing the source afterwards
///
/// With `force` unset the destination must be vacant; the check runs before
/// the copy, so the provider never overwrites silently.
async fn transfer(store: &dyn ObjectStore, src: &Path, dest: &Path, force: bool, remove_source: bool) -> Result<()> {
    if !force {
        match store.head(dest).await {
            Ok(_) => return Err(GatewayError::DestinationExists(dest.to_string())),
            Err(object_store::Error::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if remove_source {
        store.rename(src, dest).await?;
    } else {
        store.copy(src, dest).await?;
    }
    Ok(())
}

#[async_trait]
impl ObjectStorage for KodoStore {
    async fn upload(&self, local_path: &std::path::Path, object: &str) -> Result<UploadInfo> {
        let _timer = metrics::STORAGE_OPERATION_DURATION
            .with_label_values(&["upload"])
            .start_timer();
        let result = store_file(self.store.as_ref(), local_path, &Path::from(object)).await;
        metrics::record_operation("upload", result.is_ok());
        result
    }

    fn public_url(&self, object: &str) -> String {
        format!("{}/{}", self.endpoint, object)
    }

    async fn presigned_url(&self, object: &str, expires_in: Duration) -> Result<String> {
        let url = self
            .store
            .signed_url(Method::GET, &Path::from(object), expires_in)
            .await?;
        Ok(url.to_string())
    }

    async fn delete(&self, object: &str) -> Result<()> {
        let _timer = metrics::STORAGE_OPERATION_DURATION
            .with_label_values(&["delete"])
            .start_timer();
        let result = self.store.delete(&Path::from(object)).await;
        metrics::record_operation("delete", result.is_ok());
        result?;
        Ok(())
    }

    async fn list(&self, prefix: &str, marker: &str, limit: usize) -> Result<ListPage> {
        let _timer = metrics::STORAGE_OPERATION_DURATION
            .with_label_values(&["list"])
            .start_timer();
        let result = list_page(self.store.as_ref(), prefix, marker, limit).await;
        metrics::record_operation("list", result.is_ok());
        result
    }

    async fn copy(&self, src: &str, dest: &str, force: bool) -> Result<()> {
        let _timer = metrics::STORAGE_OPERATION_DURATION
            .with_label_values(&["copy"])
            .start_timer();
        let result = transfer(self.store.as_ref(), &Path::from(src), &Path::from(dest), force, false).await;
        metrics::record_operation("copy", result.is_ok());
        result
    }

    async fn rename(&self, src: &str, dest: &str, force: bool) -> Result<()> {
        let _timer = metrics::STORAGE_OPERATION_DURATION
            .with_label_values(&["move"])
            .start_timer();
        let result = transfer(self.store.as_ref(), &Path::from(src), &Path::from(dest), force, true).await;
        metrics::record_operation("move", result.is_ok());
        result
    }
}
