//! Error types for cost reconciliation
//!
//! Only conditions that abort a whole reconciliation run are errors.
//! Per-project and per-task failures are absorbed and surface as
//! [`Degradation`](crate::types::Degradation)s instead.

use cpm_client::ClientError;

/// Fatal reconciliation error
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    /// Project listing could not be fetched
    #[error("project list unavailable: {0}")]
    ProjectListUnavailable(#[source] ClientError),

    /// Project listing was fetched but has an unexpected shape
    #[error("malformed project list: {0}")]
    MalformedProjectList(String),

    /// Invalid engine configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ReconError {
    /// Check if the backend could be retried later with the same input
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProjectListUnavailable(e) => !matches!(
                e,
                ClientError::Config(_) | ClientError::Token(_)
            ),
            Self::MalformedProjectList(_) | Self::Config(_) => false,
        }
    }
}
