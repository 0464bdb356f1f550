//! Project aggregator
//!
//! Pure fold of enriched tasks into a [`ProjectCostSummary`].

use crate::types::{EnrichedTask, ProjectCostSummary, ProjectMeta};

/// Status spellings the backend has used for finished tasks
pub const DONE_STATUSES: [&str; 2] = ["done", "completed"];

/// Check if `status` marks a finished task (trimmed, case-insensitive)
#[inline]
#[must_use]
pub fn is_done_status(status: &str) -> bool {
    let status = status.trim();
    DONE_STATUSES.iter().any(|s| s.eq_ignore_ascii_case(status))
}

/// `round(realized / budget * 100)`, or `0` without a positive budget
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn progress_percentage(realized_cost: f64, total_budget: f64) -> u64 {
    if total_budget > 0.0 {
        // Saturating float-to-int cast; inputs are non-negative.
        (realized_cost / total_budget * 100.0).round().max(0.0) as u64
    } else {
        0
    }
}

/// Summarize one project's enriched tasks
///
/// Deterministic for a given input; task order only affects float summation
/// order, which callers keep stable.
#[must_use]
pub fn aggregate(meta: &ProjectMeta, tasks: &[EnrichedTask]) -> ProjectCostSummary {
    let realized_cost = tasks
        .iter()
        .map(|t| sanitize_cost(t.total_cost))
        .sum::<f64>();
    let completed_tasks = tasks
        .iter()
        .filter(|t| t.status.as_deref().is_some_and(is_done_status))
        .count();
    let total_tasks = tasks.len();
    let total_budget = sanitize_cost(meta.total_budget);

    ProjectCostSummary {
        project_id: meta.id.clone(),
        project_name: meta.name.clone(),
        total_budget,
        realized_cost,
        completed_tasks,
        pending_tasks: total_tasks - completed_tasks,
        total_tasks,
        progress_percentage: progress_percentage(realized_cost, total_budget),
        is_over_budget: realized_cost > total_budget,
        task_source: None,
        degraded: false,
        degradations: Vec::new(),
    }
}

fn sanitize_cost(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
