use async_trait::async_trait;
use inkpost_api_types::{CreatedDocument, PublishRequest};
use tracing::debug;

use crate::application::ports::{DocumentGateway, GatewayError};

use super::ApiClient;

#[derive(Clone)]
pub struct HttpDocumentGateway {
    api: ApiClient,
    path: String,
}

impl HttpDocumentGateway {
    pub fn new(api: ApiClient, path: impl Into<String>) -> Self {
        Self {
            api,
            path: path.into(),
        }
    }
}

#[async_trait]
impl DocumentGateway for HttpDocumentGateway {
    async fn create(&self, request: &PublishRequest) -> Result<CreatedDocument, GatewayError> {
        debug!(
            target = "inkpost::http::documents",
            path = %self.path,
            tags = request.tags.len(),
            body_bytes = request.body.len(),
            "Submitting document"
        );
        ApiClient::send(self.api.post(&self.path)?.json(request)).await
    }
}
