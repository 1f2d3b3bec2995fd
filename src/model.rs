//! JSON wire types shared by the handlers and the storage client

use chrono::{DateTime, Utc};
use object_store::ObjectMeta;
use serde::Serialize;

/// Response envelope carried by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ApiResponse<()> {
    /// Success envelope with a message and no payload
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            code: 200,
            msg: msg.into(),
            data: None,
        }
    }

    /// Error envelope mirroring the HTTP status in the body
    pub fn error(code: u16, msg: String) -> Self {
        Self { code, msg, data: None }
    }
}

impl<T> ApiResponse<T> {
    /// Success envelope with a payload
    pub fn with_data(msg: impl Into<String>, data: T) -> Self {
        Self {
            code: 200,
            msg: msg.into(),
            data: Some(data),
        }
    }
}

/// Listing response; files and continuation marker sit beside the envelope
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub code: u16,
    pub msg: String,
    pub files: Vec<FileInfo>,
    pub next_marker: String,
}

/// Download link payload
#[derive(Debug, Serialize)]
pub struct DownloadData {
    #[serde(rename = "downloadURL")]
    pub download_url: String,
}

/// Read-only projection of provider-reported object metadata
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub key: String,
    pub content_length: u64,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

impl From<ObjectMeta> for FileInfo {
    fn from(meta: ObjectMeta) -> Self {
        Self {
            key: meta.location.to_string(),
            content_length: meta.size as u64,
            etag: meta.e_tag.unwrap_or_default(),
            last_modified: meta.last_modified,
        }
    }
}

/// Metadata of a just-uploaded object
#[derive(Debug, Serialize)]
pub struct UploadInfo {
    pub content_length: u64,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_absent_data() {
        let value = serde_json::to_value(ApiResponse::message("file deleted")).unwrap();
        assert_eq!(value["code"], 200);
        assert_eq!(value["msg"], "file deleted");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_envelope_carries_data() {
        let value =
            serde_json::to_value(ApiResponse::with_data("ok", DownloadData {
                download_url: "https://media.example.com/a.txt".into(),
            }))
            .unwrap();
        assert_eq!(value["data"]["downloadURL"], "https://media.example.com/a.txt");
    }

    #[test]
    fn test_list_response_keeps_empty_marker() {
        let value = serde_json::to_value(ListResponse {
            code: 200,
            msg: "file list retrieved".into(),
            files: vec![],
            next_marker: String::new(),
        })
        .unwrap();
        assert_eq!(value["next_marker"], "");
        assert!(value["files"].as_array().unwrap().is_empty());
    }
}
