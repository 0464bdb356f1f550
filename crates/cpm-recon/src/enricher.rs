//! Cost enricher
//!
//! Settles every task to a concrete cost. Tasks whose listing already
//! carried a cost keep it; the rest are looked up through the per-task cost
//! report. A failed lookup counts the task as zero and is recorded, so one
//! bad task never blocks its siblings.

use crate::fields::{first, number};
use crate::types::{EnrichedTask, TaskId, TaskRecord};
use cpm_client::ApiClient;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;

/// Path of the per-task cost report
#[must_use]
pub fn cost_report_path(task: &TaskId) -> String {
    format!("/cost/tasks/{task}/report")
}

/// Why a task's cost defaulted to zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentFailure {
    /// Affected task
    pub task_id: TaskId,
    /// Error description
    pub reason: String,
}

/// Enrichment output for one project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    /// Tasks in input order, each with a concrete cost
    pub tasks: Vec<EnrichedTask>,
    /// Lookups that failed and were counted as zero
    pub failures: Vec<EnrichmentFailure>,
    /// Lookups issued
    pub lookups: usize,
}

impl Enrichment {
    /// Ids of tasks whose cost defaulted to zero
    #[must_use]
    pub fn failed_task_ids(&self) -> Vec<TaskId> {
        self.failures.iter().map(|f| f.task_id.clone()).collect()
    }
}

/// Per-task cost lookups with bounded fan-out
#[derive(Debug)]
pub struct CostEnricher<C: ?Sized> {
    client: Arc<C>,
    concurrency: usize,
}

impl<C: ApiClient + ?Sized> CostEnricher<C> {
    /// Create with a concurrency bound (values below 1 are raised to 1)
    #[inline]
    #[must_use]
    pub fn new(client: Arc<C>, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    /// Settle costs for `tasks`
    ///
    /// Output order matches input order regardless of completion order.
    pub async fn enrich(&self, tasks: Vec<TaskRecord>) -> Enrichment {
        let lookups = tasks.iter().filter(|t| t.total_cost.is_none()).count();

        let settled: Vec<(EnrichedTask, Option<EnrichmentFailure>)> = stream::iter(tasks)
            .map(|task| self.settle(task))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut enrichment = Enrichment {
            tasks: Vec::with_capacity(settled.len()),
            failures: Vec::new(),
            lookups,
        };
        for (task, failure) in settled {
            enrichment.tasks.push(task);
            enrichment.failures.extend(failure);
        }
        enrichment
    }

    async fn settle(&self, task: TaskRecord) -> (EnrichedTask, Option<EnrichmentFailure>) {
        if let Some(cost) = task.total_cost {
            return (task.into_enriched(cost), None);
        }

        match self.lookup(&task.id).await {
            Ok(cost) => (task.into_enriched(cost), None),
            Err(reason) => {
                tracing::warn!("Cost lookup for task {} failed, counting as 0: {}", task.id, reason);
                let failure = EnrichmentFailure {
                    task_id: task.id.clone(),
                    reason,
                };
                (task.into_enriched(0.0), Some(failure))
            }
        }
    }

    async fn lookup(&self, task: &TaskId) -> Result<f64, String> {
        let path = cost_report_path(task);
        let report = self
            .client
            .get_json(&path)
            .await
            .map_err(|e| e.to_string())?;
        report_total(&report).ok_or_else(|| format!("{path}: no usable totalCost"))
    }
}

/// `totalCost` from a cost report, top-level or under `data`
fn report_total(report: &Value) -> Option<f64> {
    let obj = report.as_object()?;
    let total = first(obj, &["totalCost", "total_cost"]).or_else(|| {
        obj.get("data")
            .and_then(Value::as_object)
            .and_then(|data| first(data, &["totalCost", "total_cost"]))
    })?;
    number(total).filter(|n| *n >= 0.0)
}
