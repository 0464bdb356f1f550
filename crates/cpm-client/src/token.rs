//! Bearer token sources
//!
//! Tokens live in storage owned by the outer application. They are read
//! fresh on every request and never cached here.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source of the bearer token attached to each request
pub trait TokenSource: Send + Sync + std::fmt::Debug {
    /// Current token, or `None` when no credentials are stored
    fn token(&self) -> Result<Option<String>, ClientError>;
}

/// Token configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenConfig {
    /// Send requests unauthenticated
    #[default]
    None,
    /// Read from an environment variable
    Env {
        /// Variable name
        var: String,
    },
    /// Read from a file written by the login flow
    File {
        /// Token file path
        path: PathBuf,
    },
    /// Fixed token
    Static {
        /// Token value
        value: String,
    },
}

impl TokenConfig {
    /// Build the configured source
    #[must_use]
    pub fn into_source(self) -> Box<dyn TokenSource> {
        match self {
            Self::None => Box::new(StaticToken::none()),
            Self::Env { var } => Box::new(EnvToken::new(var)),
            Self::File { path } => Box::new(FileToken::new(path)),
            Self::Static { value } => Box::new(StaticToken::new(value)),
        }
    }
}

/// Fixed token (or none)
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// Create with a token
    #[inline]
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Create without a token
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(self.0.clone())
    }
}

/// Token read from an environment variable on each call
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    /// Create for variable `var`
    #[inline]
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenSource for EnvToken {
    fn token(&self) -> Result<Option<String>, ClientError> {
        match std::env::var(&self.var) {
            Ok(value) => Ok(non_empty(&value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ClientError::Token(format!("{}: {e}", self.var))),
        }
    }
}

/// Token read from a file on each call
///
/// A missing file means "logged out" and yields `None`.
#[derive(Debug, Clone)]
pub struct FileToken {
    path: PathBuf,
}

impl FileToken {
    /// Create for `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenSource for FileToken {
    fn token(&self) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(non_empty(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Token(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
