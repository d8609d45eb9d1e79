//! Traits describing the network and credential collaborators of the pipeline.

use async_trait::async_trait;
use inkpost_api_types::{CreatedDocument, PublishRequest};
use thiserror::Error;

use super::materialize::MultipartBody;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Network(String),
    #[error("non-success status {status}")]
    Server { status: u16, body: String },
    #[error("malformed response: {0}")]
    Protocol(String),
}

/// Stable references returned by the upload endpoint, index-aligned with the
/// blobs that were submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResult {
    references: Vec<String>,
}

impl UploadResult {
    pub fn new(references: Vec<String>) -> Self {
        Self { references }
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.references
    }
}

impl FromIterator<String> for UploadResult {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Stores a multipart unit of image blobs remotely.
///
/// Calls are not idempotent; a failed call must be treated as if nothing was stored.
#[async_trait]
pub trait UploadGateway: Send + Sync {
    async fn upload(&self, body: MultipartBody) -> Result<UploadResult, GatewayError>;
}

/// Creates the published document.
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    async fn create(&self, request: &PublishRequest) -> Result<CreatedDocument, GatewayError>;
}

/// Opaque source of the current authentication token.
pub trait CredentialSource: Send + Sync {
    fn token(&self) -> Option<String>;
}
