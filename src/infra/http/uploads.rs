use async_trait::async_trait;
use inkpost_api_types::UploadResponse;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::application::{
    materialize::MultipartBody,
    ports::{GatewayError, UploadGateway, UploadResult},
};

use super::ApiClient;

/// Posts every blob as a repeated part of one multipart request.
#[derive(Clone)]
pub struct HttpUploadGateway {
    api: ApiClient,
    path: String,
}

impl HttpUploadGateway {
    pub fn new(api: ApiClient, path: impl Into<String>) -> Self {
        Self {
            api,
            path: path.into(),
        }
    }
}

#[async_trait]
impl UploadGateway for HttpUploadGateway {
    async fn upload(&self, body: MultipartBody) -> Result<UploadResult, GatewayError> {
        let (field, blobs) = body.into_parts();
        let count = blobs.len();

        let mut form = Form::new();
        for blob in blobs {
            let part = Part::bytes(blob.bytes.to_vec())
                .file_name(blob.file_name)
                .mime_str(&blob.media_type)
                .map_err(|err| GatewayError::Protocol(format!("invalid media type: {err}")))?;
            form = form.part(field.clone(), part);
        }

        debug!(
            target = "inkpost::http::uploads",
            path = %self.path,
            parts = count,
            "Sending upload request"
        );
        let request = self.api.post(&self.path)?.multipart(form);
        let response: UploadResponse = ApiClient::send(request).await?;

        Ok(response
            .images
            .into_iter()
            .map(|file| file.file_url)
            .collect())
    }
}
