//! Engine configuration

use crate::error::ReconError;
use serde::{Deserialize, Serialize};

/// Reconciliation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Concurrent cost lookups within one project
    pub enrichment_concurrency: usize,
    /// Projects reconciled at once; `1` processes them strictly in sequence
    pub project_concurrency: usize,
}

impl ReconConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With enrichment concurrency
    #[inline]
    #[must_use]
    pub fn with_enrichment_concurrency(mut self, n: usize) -> Self {
        self.enrichment_concurrency = n;
        self
    }

    /// With project concurrency
    #[inline]
    #[must_use]
    pub fn with_project_concurrency(mut self, n: usize) -> Self {
        self.project_concurrency = n;
        self
    }

    /// Reject zero concurrency limits
    ///
    /// # Errors
    /// `ReconError::Config` naming the offending field
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.enrichment_concurrency == 0 {
            return Err(ReconError::Config(
                "enrichment_concurrency must be at least 1".into(),
            ));
        }
        if self.project_concurrency == 0 {
            return Err(ReconError::Config(
                "project_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            enrichment_concurrency: 8,
            project_concurrency: 1,
        }
    }
}
