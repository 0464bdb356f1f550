//! Response normalizer
//!
//! Turns whatever a task-listing endpoint returned into an ordered list of
//! [`TaskRecord`]s. Recognized layouts, in priority order:
//!
//! 1. Grouped-by-column object: `{ "todo": [..], "done": [..] }`
//! 2. Flat array of task objects
//! 3. Wrapped container: `{ "tasks" | "data" | "items": [..] }`
//!
//! [`try_normalize`] tells an unrecognized payload (`None`) apart from a
//! recognized listing with no tasks for the project (`Some(vec![])`).
//! [`normalize`] folds both into an empty list.

use crate::fields::{first, id_text, number, text, wrapped_array, WRAPPER_KEYS};
use crate::types::{ProjectId, ProjectMeta, TaskRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload shape a candidate endpoint is expected to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceShape {
    /// Object keyed by kanban column
    KanbanGrouped,
    /// Tasks of one project
    ProjectScoped,
    /// Tasks of every project; filtered client-side
    Global,
}

/// Project a listing is normalized for
#[derive(Debug, Clone, Copy)]
pub struct ProjectScope<'a> {
    /// Requested project id
    pub id: &'a ProjectId,
    /// Project name, used to match tasks that only embed the name
    pub name: Option<&'a str>,
}

impl<'a> ProjectScope<'a> {
    /// Scope by id only
    #[inline]
    #[must_use]
    pub fn new(id: &'a ProjectId) -> Self {
        Self { id, name: None }
    }

    /// With project name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name).filter(|n| !n.trim().is_empty());
        self
    }
}

impl<'a> From<&'a ProjectMeta> for ProjectScope<'a> {
    fn from(meta: &'a ProjectMeta) -> Self {
        Self::new(&meta.id).with_name(&meta.name)
    }
}

enum Layout<'a> {
    Grouped(&'a Map<String, Value>),
    Flat(&'a [Value]),
}

/// Normalize a listing payload into task records
///
/// Unrecognized payloads yield an empty list; see [`try_normalize`].
#[must_use]
pub fn normalize(payload: &Value, shape: SourceShape, scope: &ProjectScope<'_>) -> Vec<TaskRecord> {
    try_normalize(payload, shape, scope).unwrap_or_default()
}

/// Normalize a listing payload, or `None` if its layout is not recognized
///
/// Every returned record carries `scope.id` as its project. For
/// [`SourceShape::Global`] only tasks whose own project id or embedded
/// project name matches the scope are kept.
#[must_use]
pub fn try_normalize(
    payload: &Value,
    shape: SourceShape,
    scope: &ProjectScope<'_>,
) -> Option<Vec<TaskRecord>> {
    let Some(layout) = recognize(payload) else {
        tracing::debug!("Unrecognized {:?} payload for project {}", shape, scope.id);
        return None;
    };

    let entries: Vec<(&Value, Option<&str>)> = match layout {
        Layout::Grouped(columns) => columns
            .iter()
            .flat_map(|(column, tasks)| {
                tasks
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(move |task| (task, Some(column.as_str())))
            })
            .collect(),
        Layout::Flat(tasks) => tasks.iter().map(|task| (task, None)).collect(),
    };

    let records: Vec<TaskRecord> = entries
        .into_iter()
        .filter_map(|(task, column)| {
            let obj = task.as_object()?;
            if shape == SourceShape::Global && !belongs_to(obj, scope) {
                return None;
            }
            task_record(obj, column, scope.id)
        })
        .collect();
    Some(records)
}

fn recognize(payload: &Value) -> Option<Layout<'_>> {
    match payload {
        Value::Array(items) => Some(Layout::Flat(items)),
        // A board with no columns.
        Value::Object(map) if map.is_empty() => Some(Layout::Flat(&[])),
        Value::Object(map) => {
            if is_grouped(map) {
                return Some(Layout::Grouped(map));
            }
            let nested = WRAPPER_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_object))
                .filter(|inner| is_grouped(inner));
            if let Some(inner) = nested {
                return Some(Layout::Grouped(inner));
            }
            wrapped_array(map).map(|items| Layout::Flat(items))
        }
        _ => None,
    }
}

/// Every value is an array and no key is a wrapper key
///
/// `{"data": [..], "errors": []}` is a wrapped container, not a board.
fn is_grouped(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.values().all(Value::is_array)
        && !map.keys().any(|k| WRAPPER_KEYS.contains(&k.as_str()))
}

fn task_record(
    obj: &Map<String, Value>,
    column: Option<&str>,
    project_id: &ProjectId,
) -> Option<TaskRecord> {
    let id = first(obj, &["id", "_id", "taskId"]).and_then(id_text)?;
    let status = first(obj, &["status"])
        .and_then(text)
        .or_else(|| column.map(str::to_string));
    // Negative listing costs are treated as missing so enrichment re-reads them.
    let total_cost = first(obj, &["totalCost", "total_cost"])
        .and_then(number)
        .filter(|c| *c >= 0.0);

    Some(TaskRecord {
        id: id.into(),
        project_id: project_id.clone(),
        status,
        total_cost,
    })
}

fn belongs_to(obj: &Map<String, Value>, scope: &ProjectScope<'_>) -> bool {
    let wanted_id = scope.id.as_str();

    let own_id = first(obj, &["projectId", "project_id"])
        .and_then(id_text)
        .or_else(|| match obj.get("project") {
            Some(Value::Object(project)) => project.get("id").and_then(id_text),
            Some(other) => id_text(other),
            None => None,
        });
    if own_id.as_deref() == Some(wanted_id) {
        return true;
    }

    let Some(wanted_name) = scope.name else {
        return false;
    };
    let own_name = first(obj, &["projectName", "project_name"])
        .and_then(text)
        .or_else(|| match obj.get("project") {
            Some(Value::Object(project)) => project.get("name").and_then(text),
            Some(other) => text(other),
            None => None,
        });
    own_name.is_some_and(|name| name.to_lowercase() == wanted_name.trim().to_lowercase())
}
