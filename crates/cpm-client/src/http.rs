//! Read-only backend access over HTTP

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::token::TokenSource;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::sync::Arc;

/// JSON GET access to the backend
///
/// `path` always starts with `/` and is relative to the configured origin.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetch `path` and decode the body as JSON
    ///
    /// # Errors
    /// - `ClientError::Status` on a non-2xx response
    /// - `ClientError::Transport` when the backend cannot be reached
    /// - `ClientError::Decode` when the body is not JSON
    async fn get_json(&self, path: &str) -> Result<Value, ClientError>;
}

#[async_trait]
impl<C: ApiClient + ?Sized> ApiClient for Arc<C> {
    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        (**self).get_json(path).await
    }
}

/// reqwest-backed client
#[derive(Debug)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Box<dyn TokenSource>,
}

impl HttpApiClient {
    /// Create from configuration
    ///
    /// # Errors
    /// `ClientError::Config` for an invalid base URL or client setup failure
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.normalized_base_url()?;
        let timeout = config.timeout();
        Self::with_token_source(base_url, timeout, config.token.into_source())
    }

    /// Create with an explicit token source
    ///
    /// # Errors
    /// `ClientError::Config` if the HTTP client cannot be built
    pub fn with_token_source(
        base_url: impl Into<String>,
        timeout: Option<std::time::Duration>,
        token: Box<dyn TokenSource>,
    ) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Backend origin
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let mut request = self
            .client
            .get(self.url(path))
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = self.token.token()? {
            let auth = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::Token("token is not a valid header value".into()))?;
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::transport(path, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("GET {} -> {}", path, status);
            return Err(ClientError::status(path, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(path, e))?;

        serde_json::from_slice(&body).map_err(|e| ClientError::decode(path, e.to_string()))
    }
}
