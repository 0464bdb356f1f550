//! Portfolio reducer
//!
//! The single entry point used by the dashboard and cost-management views.
//! One reconciliation run:
//! 1. Load the project list (the only fatal step)
//! 2. For each project: resolve tasks, enrich costs, aggregate
//! 3. Fold the summaries into portfolio totals
//!
//! Nothing is cached between runs; every call recomputes from the backend.

use crate::aggregate::aggregate;
use crate::config::ReconConfig;
use crate::enricher::CostEnricher;
use crate::error::ReconError;
use crate::fields::{first, id_text, number, text};
use crate::resolver::{EndpointResolver, Resolution, TaskSource};
use crate::types::{Degradation, ProjectCostSummary, ProjectMeta, ReconciliationReport};
use cpm_client::ApiClient;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;

/// Project listing endpoint
pub const PROJECTS_PATH: &str = "/projects";

/// Parse the project listing
///
/// Accepts a bare array or one wrapped under `projects`, `data` or `items`.
/// Entries without an id are skipped.
///
/// # Errors
/// `ReconError::MalformedProjectList` when no project array can be found
pub fn parse_projects(payload: &Value) -> Result<Vec<ProjectMeta>, ReconError> {
    let entries = match payload {
        Value::Array(items) => items,
        Value::Object(map) => ["projects", "data", "items"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .ok_or_else(|| {
                ReconError::MalformedProjectList("object without a project array".into())
            })?,
        other => {
            return Err(ReconError::MalformedProjectList(format!(
                "expected an array, got {}",
                json_kind(other)
            )))
        }
    };

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let project = project_meta(entry);
            if project.is_none() {
                tracing::warn!("Skipping project entry without id");
            }
            project
        })
        .collect())
}

fn project_meta(entry: &Value) -> Option<ProjectMeta> {
    let obj = entry.as_object()?;
    let id = first(obj, &["id", "_id", "projectId"]).and_then(id_text)?;
    let name = first(obj, &["name", "title"]).and_then(text).unwrap_or_default();
    let total_budget = first(obj, &["totalBudget", "total_budget", "budget"])
        .and_then(number)
        .unwrap_or(0.0);
    Some(ProjectMeta::new(id, name, total_budget))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Runs reconciliation across all projects
#[derive(Debug)]
pub struct PortfolioReconciler<C: ?Sized> {
    client: Arc<C>,
    resolver: EndpointResolver<C>,
    enricher: CostEnricher<C>,
    config: ReconConfig,
}

impl<C: ApiClient + ?Sized> PortfolioReconciler<C> {
    /// Create a reconciler
    ///
    /// # Errors
    /// `ReconError::Config` if `config` fails validation
    pub fn new(client: Arc<C>, config: ReconConfig) -> Result<Self, ReconError> {
        config.validate()?;
        Ok(Self::assemble(client, config))
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults(client: Arc<C>) -> Self {
        // Defaults always pass validation.
        Self::assemble(client, ReconConfig::default())
    }

    fn assemble(client: Arc<C>, config: ReconConfig) -> Self {
        Self {
            resolver: EndpointResolver::new(Arc::clone(&client)),
            enricher: CostEnricher::new(Arc::clone(&client), config.enrichment_concurrency),
            client,
            config,
        }
    }

    /// Replace the candidate task endpoints
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<TaskSource>) -> Self {
        self.resolver = EndpointResolver::with_sources(Arc::clone(&self.client), sources);
        self
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Candidate task endpoints in probe order
    #[inline]
    #[must_use]
    pub fn sources(&self) -> &[TaskSource] {
        self.resolver.sources()
    }

    /// Execute one reconciliation run
    ///
    /// # Errors
    /// Only when the project list cannot be loaded. Every per-project and
    /// per-task failure is absorbed into that project's degradations.
    pub async fn reconcile_all(&self) -> Result<ReconciliationReport, ReconError> {
        let started = std::time::Instant::now();

        let projects = self.load_projects().await?;
        tracing::info!("Reconciling {} projects", projects.len());

        let summaries: Vec<ProjectCostSummary> = stream::iter(&projects)
            .map(|project| self.reconcile_project(project))
            .buffered(self.config.project_concurrency)
            .collect()
            .await;

        let report = ReconciliationReport::from_projects(summaries);
        tracing::info!(
            "Reconciliation finished in {}ms: {} projects, {} tasks, realized {:.2} of {:.2}, {} degraded",
            started.elapsed().as_millis(),
            report.stats.total_projects,
            report.stats.total_tasks,
            report.stats.realized_cost,
            report.stats.total_budget,
            report.stats.degraded_projects
        );
        Ok(report)
    }

    /// Fetch and parse the project list
    ///
    /// # Errors
    /// `ReconError::ProjectListUnavailable` or `ReconError::MalformedProjectList`
    pub async fn load_projects(&self) -> Result<Vec<ProjectMeta>, ReconError> {
        let payload = self.client.get_json(PROJECTS_PATH).await.map_err(|e| {
            tracing::error!("Project list load failed: {}", e);
            ReconError::ProjectListUnavailable(e)
        })?;
        parse_projects(&payload)
    }

    /// Resolve, enrich and aggregate one project
    pub async fn reconcile_project(&self, project: &ProjectMeta) -> ProjectCostSummary {
        let resolution = self.resolver.resolve(project).await;
        let unreachable = resolution.all_failed();
        let Resolution {
            tasks,
            source,
            failed_probes,
            ..
        } = resolution;

        let enrichment = self.enricher.enrich(tasks).await;

        let mut summary = aggregate(project, &enrichment.tasks).with_task_source(source);
        if unreachable {
            summary = summary.with_degradation(Degradation::NoTaskSource { failed_probes });
        }
        if !enrichment.failures.is_empty() {
            summary = summary.with_degradation(Degradation::CostLookupFailed {
                task_ids: enrichment.failed_task_ids(),
            });
        }

        if summary.degraded {
            tracing::warn!(
                "Project {} ({}) degraded: {} degradation(s)",
                project.id,
                project.name,
                summary.degradations.len()
            );
        } else {
            tracing::debug!(
                "Project {}: {} tasks, realized {:.2}",
                project.id,
                summary.total_tasks,
                summary.realized_cost
            );
        }
        summary
    }
}
