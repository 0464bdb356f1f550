//! CPM Recon - client-side cost reconciliation
//!
//! The backend's aggregate budget/cost endpoints report wrong totals, so
//! project and portfolio figures are recomputed here from task data:
//! - [`normalize`]: canonical task records from any listing shape
//! - [`EndpointResolver`]: first non-empty result among candidate endpoints
//! - [`CostEnricher`]: per-task cost lookups, failures counted as zero
//! - [`aggregate()`]: pure per-project summary
//! - [`PortfolioReconciler`]: the run that ties it together
//!
//! # Example
//!
//! ```rust,ignore
//! use cpm_client::{ClientConfig, HttpApiClient};
//! use cpm_recon::{PortfolioReconciler, ReconConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(HttpApiClient::new(ClientConfig::from_env())?);
//! let reconciler = PortfolioReconciler::new(client, ReconConfig::new())?;
//!
//! let report = reconciler.reconcile_all().await?;
//! println!("{} projects, {:.2} realized", report.stats.total_projects, report.stats.realized_cost);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod config;
pub mod enricher;
pub mod error;
mod fields;
pub mod normalize;
pub mod portfolio;
pub mod resolver;
pub mod types;

pub use aggregate::{aggregate, is_done_status, progress_percentage, DONE_STATUSES};
pub use config::ReconConfig;
pub use enricher::{cost_report_path, CostEnricher, Enrichment, EnrichmentFailure};
pub use error::ReconError;
pub use normalize::{normalize, try_normalize, ProjectScope, SourceShape};
pub use portfolio::{parse_projects, PortfolioReconciler, PROJECTS_PATH};
pub use resolver::{default_sources, EndpointResolver, Resolution, TaskSource, MALFORMED_PAYLOAD};
pub use types::{
    Degradation, EnrichedTask, PortfolioStats, ProbeFailure, ProjectCostSummary, ProjectId,
    ProjectMeta, ReconciliationReport, TaskId, TaskRecord,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running a reconciliation
    pub use crate::{
        PortfolioReconciler, PortfolioStats, ProjectCostSummary, ReconConfig, ReconError,
        ReconciliationReport,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
