//! HTTP adapters for the upload and document-creation endpoints.

mod documents;
mod uploads;

use std::sync::Arc;

pub use documents::HttpDocumentGateway;
pub use uploads::HttpUploadGateway;

use reqwest::{
    Client, RequestBuilder, Response, Url,
    header::{AUTHORIZATION, HeaderValue},
};
use serde::de::DeserializeOwned;

use crate::{
    application::ports::{CredentialSource, GatewayError},
    config::ApiSettings,
};

use super::error::InfraError;

/// Shared client state: base URL, auth and a configured `reqwest` client.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    auth_scheme: String,
    credentials: Arc<dyn CredentialSource>,
}

impl ApiClient {
    pub fn new(
        base: Url,
        settings: &ApiSettings,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            base,
            auth_scheme: settings.auth_scheme.clone(),
            credentials,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("inkpost/", env!("CARGO_PKG_VERSION"))
    }

    pub fn url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|err| GatewayError::Protocol(format!("invalid endpoint `{path}`: {err}")))
    }

    /// `<scheme> <token>`, or `None` when no token is available.
    fn auth_header(&self) -> Result<Option<HeaderValue>, GatewayError> {
        let Some(token) = self.credentials.token() else {
            return Ok(None);
        };
        let mut value = HeaderValue::from_str(&format!("{} {token}", self.auth_scheme))
            .map_err(|err| GatewayError::Protocol(format!("invalid credential header: {err}")))?;
        value.set_sensitive(true);
        Ok(Some(value))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, GatewayError> {
        let request = self.client.post(self.url(path)?);
        Ok(match self.auth_header()? {
            Some(header) => request.header(AUTHORIZATION, header),
            None => request,
        })
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, GatewayError> {
        let response = request.send().await.map_err(network)?;
        Self::handle(response).await
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(network)?;
        if !status.is_success() {
            return Err(GatewayError::Server {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| GatewayError::Protocol(format!("failed to parse body: {err}")))
    }
}

fn network(err: reqwest::Error) -> GatewayError {
    GatewayError::Network(err.to_string())
}
