//! Client configuration

use crate::error::ClientError;
use crate::token::TokenConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default backend origin
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Backend client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, without trailing slash
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
    /// Where the bearer token is read from
    pub token: TokenConfig,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration from `CPM_API_*` environment variables
    ///
    /// - `CPM_API_BASE_URL`
    /// - `CPM_API_TIMEOUT_SECONDS`
    /// - `CPM_API_TOKEN_FILE` (preferred) or `CPM_API_TOKEN_ENV`
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("CPM_API_BASE_URL") {
            self.base_url = url;
        }
        if let Some(secs) = std::env::var("CPM_API_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.timeout_secs = Some(secs);
        }
        if let Ok(path) = std::env::var("CPM_API_TOKEN_FILE") {
            self.token = TokenConfig::File {
                path: PathBuf::from(path),
            };
        } else if let Ok(var) = std::env::var("CPM_API_TOKEN_ENV") {
            self.token = TokenConfig::Env { var };
        }
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// With token source
    #[inline]
    #[must_use]
    pub fn with_token(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Request timeout, if any
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Base URL with trailing slashes removed, validated
    ///
    /// # Errors
    /// `ClientError::Config` unless the URL starts with `http://` or `https://`
    pub fn normalized_base_url(&self) -> Result<String, ClientError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must be http(s): {:?}",
                self.base_url
            )));
        }
        Ok(trimmed.to_string())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            token: TokenConfig::None,
        }
    }
}
