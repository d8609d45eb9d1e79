//! Wire types shared by the inkpost client and anything that speaks its API.
//!
//! The shapes mirror the two endpoints the publish pipeline talks to: the
//! multipart image upload endpoint and the JSON document-creation endpoint.

#![deny(clippy::all, clippy::pedantic)]

use serde::{Deserialize, Serialize};

/// Body of the document-creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub title: String,
    /// Rendered markup of the rewritten document.
    pub body: String,
    /// Unique tags in the order they were entered.
    pub tags: Vec<String>,
}

/// Response of the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub images: Vec<UploadedFile>,
}

/// One stored file, index-aligned with the submitted blobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Storage-relative reference; the client prefixes it with the media base path.
    pub file_url: String,
}

/// Identity of a freshly created document as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDocument {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Server timestamp, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_date: Option<String>,
}
