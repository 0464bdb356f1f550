//! Endpoint resolver
//!
//! Task listings are deployed inconsistently across backend environments,
//! so a project's tasks are discovered by probing an ordered list of
//! candidate endpoints. Each candidate is declared as a [`TaskSource`]; the
//! driver tries them in order and the first non-empty normalized result
//! wins. Failed probes are recorded, never raised; a candidate that answers
//! with a payload the normalizer cannot recognize counts as failed.

use crate::normalize::{try_normalize, ProjectScope, SourceShape};
use crate::types::{ProbeFailure, ProjectId, ProjectMeta, TaskRecord};
use cpm_client::ApiClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Placeholder substituted with the project id in path templates
pub const PROJECT_ID_PLACEHOLDER: &str = "{id}";

/// [`ProbeFailure::error`] for a successful response with an unrecognized body
pub const MALFORMED_PAYLOAD: &str = "malformed payload";

/// One candidate task-listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSource {
    /// Short name reported in summaries
    pub name: String,
    /// Expected payload shape
    pub shape: SourceShape,
    /// Path template; `{id}` is replaced with the project id
    pub path: String,
}

impl TaskSource {
    /// Declare a candidate
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, shape: SourceShape, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape,
            path: path.into(),
        }
    }

    /// Concrete path for `project`
    #[must_use]
    pub fn path_for(&self, project: &ProjectId) -> String {
        self.path.replace(PROJECT_ID_PLACEHOLDER, project.as_str())
    }
}

/// Candidate endpoints in probe order
///
/// 1. kanban-grouped listing
/// 2. project-scoped flat listing
/// 3. filtered-by-project listing
/// 4. global listing, filtered client-side
#[must_use]
pub fn default_sources() -> Vec<TaskSource> {
    vec![
        TaskSource::new("kanban", SourceShape::KanbanGrouped, "/projects/{id}/tasks/kanban"),
        TaskSource::new("project_tasks", SourceShape::ProjectScoped, "/projects/{id}/tasks"),
        TaskSource::new("tasks_by_project", SourceShape::ProjectScoped, "/tasks/project/{id}"),
        TaskSource::new("all_tasks", SourceShape::Global, "/tasks"),
    ]
}

/// Outcome of probing the candidates for one project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Tasks from the winning candidate; empty if none had any
    pub tasks: Vec<TaskRecord>,
    /// Name of the winning candidate
    pub source: Option<String>,
    /// Candidates that failed at the transport or HTTP level, or answered
    /// with a malformed payload
    pub failed_probes: Vec<ProbeFailure>,
    /// Candidates that answered with a recognized listing (empty or not)
    pub answered: usize,
}

impl Resolution {
    /// True when no candidate answered at all
    ///
    /// An empty resolution where some candidate answered means the project
    /// legitimately has no tasks.
    #[inline]
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.answered == 0 && !self.failed_probes.is_empty()
    }
}

/// Probe driver over a fixed candidate list
#[derive(Debug)]
pub struct EndpointResolver<C: ?Sized> {
    client: Arc<C>,
    sources: Vec<TaskSource>,
}

impl<C: ApiClient + ?Sized> EndpointResolver<C> {
    /// Create with [`default_sources`]
    #[inline]
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self::with_sources(client, default_sources())
    }

    /// Create with a custom candidate list
    #[inline]
    #[must_use]
    pub fn with_sources(client: Arc<C>, sources: Vec<TaskSource>) -> Self {
        Self { client, sources }
    }

    /// Candidates in probe order
    #[inline]
    #[must_use]
    pub fn sources(&self) -> &[TaskSource] {
        &self.sources
    }

    /// Find the tasks of `project`
    ///
    /// Stops at the first candidate whose payload normalizes to a non-empty
    /// list; later candidates are not requested.
    pub async fn resolve(&self, project: &ProjectMeta) -> Resolution {
        let scope = ProjectScope::from(project);
        let mut resolution = Resolution::default();

        for source in &self.sources {
            let path = source.path_for(&project.id);
            let payload = match self.client.get_json(&path).await {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::debug!("Probe {} for project {} failed: {}", source.name, project.id, e);
                    resolution.failed_probes.push(ProbeFailure {
                        source: source.name.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            let Some(tasks) = try_normalize(&payload, source.shape, &scope) else {
                tracing::debug!(
                    "Probe {} for project {} returned a malformed payload",
                    source.name,
                    project.id
                );
                resolution.failed_probes.push(ProbeFailure {
                    source: source.name.clone(),
                    error: MALFORMED_PAYLOAD.to_string(),
                });
                continue;
            };
            resolution.answered += 1;

            if tasks.is_empty() {
                tracing::debug!("Probe {} for project {} returned no tasks", source.name, project.id);
                continue;
            }

            tracing::debug!(
                "Resolved {} tasks for project {} via {}",
                tasks.len(),
                project.id,
                source.name
            );
            resolution.tasks = tasks;
            resolution.source = Some(source.name.clone());
            return resolution;
        }

        resolution
    }
}
