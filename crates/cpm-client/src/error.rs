//! Error types for backend access
//!
//! Every failure the engine may absorb is expressed here:
//! - Non-success HTTP status
//! - Transport/network failure
//! - Undecodable response body
//! - Token source failure
//! - Client misconfiguration

/// Backend access error
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Backend answered with a non-success status
    #[error("GET {path} returned HTTP {status}")]
    Status {
        /// Request path
        path: String,
        /// HTTP status code
        status: u16,
    },

    /// Backend could not be reached
    #[error("GET {path} failed: {source}")]
    Transport {
        /// Request path
        path: String,
        /// Underlying I/O or HTTP-stack error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Response body was not valid JSON
    #[error("GET {path} returned an undecodable body: {message}")]
    Decode {
        /// Request path
        path: String,
        /// Decoder message
        message: String,
    },

    /// Bearer token could not be read
    #[error("token unavailable: {0}")]
    Token(String),

    /// Invalid client configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Create a status error
    #[inline]
    pub fn status(path: impl Into<String>, status: u16) -> Self {
        Self::Status {
            path: path.into(),
            status,
        }
    }

    /// Create a transport error
    #[inline]
    pub fn transport(
        path: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a decode error
    #[inline]
    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// HTTP status, if the backend answered at all
    #[inline]
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the backend reported the resource as missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(404)
    }

    /// Short machine-readable classification
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Status { .. } => "http_status",
            Self::Transport { .. } => "transport",
            Self::Decode { .. } => "decode",
            Self::Token(_) => "token",
            Self::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display() {
        let err = ClientError::status("/projects", 503);
        assert_eq!(err.to_string(), "GET /projects returned HTTP 503");
        assert_eq!(err.http_status(), Some(503));
        assert_eq!(err.code(), "http_status");
    }

    #[test]
    fn not_found_detection() {
        assert!(ClientError::status("/tasks", 404).is_not_found());
        assert!(!ClientError::status("/tasks", 500).is_not_found());
        assert!(!ClientError::decode("/tasks", "eof").is_not_found());
    }

    #[test]
    fn transport_error_wraps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ClientError::transport("/tasks", io);
        assert_eq!(err.code(), "transport");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.http_status(), None);
    }

    #[test]
    fn token_error_has_no_status() {
        let err = ClientError::Token("missing".to_string());
        assert_eq!(err.http_status(), None);
        assert!(err.to_string().contains("token unavailable"));
    }
}
