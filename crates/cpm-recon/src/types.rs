//! Core types for cost reconciliation
//!
//! Defines the values produced by one reconciliation run:
//! - Task records before and after cost enrichment
//! - Project metadata from the project listing
//! - Per-project cost summaries and their degradations
//! - Portfolio-wide totals

use serde::{Deserialize, Serialize};

/// Backend project identifier
///
/// Numeric and string ids are both kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Create from any string-like id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Backend task identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create from any string-like id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Task as normalized from a listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Task id
    pub id: TaskId,
    /// Owning project
    pub project_id: ProjectId,
    /// Workflow status, own or inherited from a kanban column
    pub status: Option<String>,
    /// Precomputed cost; `None` until enriched
    pub total_cost: Option<f64>,
}

impl TaskRecord {
    /// Create a record with no status and no cost
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<TaskId>, project_id: impl Into<ProjectId>) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            status: None,
            total_cost: None,
        }
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// With precomputed cost
    #[inline]
    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.total_cost = Some(cost);
        self
    }

    /// Settle the record with a concrete cost
    #[inline]
    #[must_use]
    pub fn into_enriched(self, total_cost: f64) -> EnrichedTask {
        EnrichedTask {
            id: self.id,
            project_id: self.project_id,
            status: self.status,
            total_cost,
        }
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<String> for ProjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Task with a concrete, non-negative cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTask {
    /// Task id
    pub id: TaskId,
    /// Owning project
    pub project_id: ProjectId,
    /// Workflow status
    pub status: Option<String>,
    /// Settled cost
    pub total_cost: f64,
}

/// Project as listed by `GET /projects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    /// Project id
    pub id: ProjectId,
    /// Display name
    pub name: String,
    /// Declared budget, `0` when absent
    pub total_budget: f64,
}

impl ProjectMeta {
    /// Create project metadata
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ProjectId>, name: impl Into<String>, total_budget: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            total_budget,
        }
    }
}

/// Reason a summary may undercount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Degradation {
    /// Every candidate task endpoint failed
    #[serde(rename_all = "camelCase")]
    NoTaskSource {
        /// Failed probes, in probe order
        failed_probes: Vec<ProbeFailure>,
    },
    /// Some cost lookups failed and were counted as zero
    #[serde(rename_all = "camelCase")]
    CostLookupFailed {
        /// Tasks whose cost defaulted to zero
        task_ids: Vec<TaskId>,
    },
}

/// One failed candidate endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeFailure {
    /// Candidate name
    pub source: String,
    /// Error description
    pub error: String,
}

/// Recomputed cost figures for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCostSummary {
    /// Project id
    pub project_id: ProjectId,
    /// Project name
    pub project_name: String,
    /// Declared budget
    pub total_budget: f64,
    /// Sum of task costs
    pub realized_cost: f64,
    /// Tasks in a done status
    pub completed_tasks: usize,
    /// All other tasks
    pub pending_tasks: usize,
    /// `completed_tasks + pending_tasks`
    pub total_tasks: usize,
    /// `round(realized_cost / total_budget * 100)`, `0` without a budget
    pub progress_percentage: u64,
    /// `realized_cost > total_budget`
    pub is_over_budget: bool,
    /// Candidate endpoint that supplied the tasks
    pub task_source: Option<String>,
    /// `!degradations.is_empty()`
    pub degraded: bool,
    /// Why figures may be incomplete
    pub degradations: Vec<Degradation>,
}

impl ProjectCostSummary {
    /// Attach a degradation
    #[must_use]
    pub fn with_degradation(mut self, degradation: Degradation) -> Self {
        self.degradations.push(degradation);
        self.degraded = true;
        self
    }

    /// With the endpoint that answered
    #[inline]
    #[must_use]
    pub fn with_task_source(mut self, source: Option<impl Into<String>>) -> Self {
        self.task_source = source.map(Into::into);
        self
    }
}

/// Portfolio-wide totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    /// Projects reconciled
    pub total_projects: usize,
    /// Sum of completed tasks
    pub completed_tasks: usize,
    /// Sum of pending tasks
    pub pending_tasks: usize,
    /// Sum of all tasks
    pub total_tasks: usize,
    /// Sum of budgets
    pub total_budget: f64,
    /// Sum of realized costs
    pub realized_cost: f64,
    /// Projects with at least one degradation
    pub degraded_projects: usize,
    /// Projects over budget
    pub over_budget_projects: usize,
}

impl PortfolioStats {
    /// Fold one project summary into the totals
    pub fn add(&mut self, summary: &ProjectCostSummary) {
        self.total_projects += 1;
        self.completed_tasks += summary.completed_tasks;
        self.pending_tasks += summary.pending_tasks;
        self.total_tasks += summary.total_tasks;
        self.total_budget += summary.total_budget;
        self.realized_cost += summary.realized_cost;
        if summary.degraded {
            self.degraded_projects += 1;
        }
        if summary.is_over_budget {
            self.over_budget_projects += 1;
        }
    }

    /// Portfolio progress, same formula as per project
    #[inline]
    #[must_use]
    pub fn progress_percentage(&self) -> u64 {
        crate::aggregate::progress_percentage(self.realized_cost, self.total_budget)
    }

    /// Portfolio over-budget flag
    #[inline]
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.realized_cost > self.total_budget
    }
}

impl<'a> FromIterator<&'a ProjectCostSummary> for PortfolioStats {
    fn from_iter<I: IntoIterator<Item = &'a ProjectCostSummary>>(iter: I) -> Self {
        let mut stats = Self::default();
        for summary in iter {
            stats.add(summary);
        }
        stats
    }
}

/// Result of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Per-project summaries, in listing order
    pub projects: Vec<ProjectCostSummary>,
    /// Portfolio totals
    pub stats: PortfolioStats,
}

impl ReconciliationReport {
    /// Build a report, folding stats from the summaries
    #[must_use]
    pub fn from_projects(projects: Vec<ProjectCostSummary>) -> Self {
        let stats = projects.iter().collect();
        Self { projects, stats }
    }

    /// Summary for one project
    #[must_use]
    pub fn project(&self, id: &ProjectId) -> Option<&ProjectCostSummary> {
        self.projects.iter().find(|p| &p.project_id == id)
    }
}
