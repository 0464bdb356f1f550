//! Testing utilities for CPM workspace
//!
//! Shared test helpers and fixtures:
//! - [`ScriptedClient`]: in-memory [`ApiClient`] answering from a route table
//! - JSON builders for projects, tasks and cost reports

#![allow(missing_docs)]

use async_trait::async_trait;
use cpm_client::{ApiClient, ClientError};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Scripted answer for one path
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with a JSON body
    Json(Value),
    /// Non-success status
    Status(u16),
    /// Connection failure
    Unreachable,
}

/// In-memory backend
///
/// Paths without a route answer 404. Every request is logged in order.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    routes: HashMap<String, Reply>,
    log: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: impl Into<String>, reply: Reply) -> Self {
        self.routes.insert(path.into(), reply);
        self
    }

    pub fn json(self, path: impl Into<String>, body: Value) -> Self {
        self.route(path, Reply::Json(body))
    }

    pub fn status(self, path: impl Into<String>, status: u16) -> Self {
        self.route(path, Reply::Status(status))
    }

    pub fn unreachable(self, path: impl Into<String>) -> Self {
        self.route(path, Reply::Unreachable)
    }

    /// Requested paths, in request order
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.log.lock().iter().filter(|p| p.as_str() == path).count()
    }
}

#[async_trait]
impl ApiClient for ScriptedClient {
    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        self.log.lock().push(path.to_string());
        match self.routes.get(path) {
            Some(Reply::Json(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(ClientError::status(path, *status)),
            Some(Reply::Unreachable) => Err(ClientError::transport(
                path,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
            None => Err(ClientError::status(path, 404)),
        }
    }
}

pub fn project_json(id: u64, name: &str, budget: f64) -> Value {
    json!({ "id": id, "name": name, "totalBudget": budget })
}

pub fn task_json(id: &str, status: &str) -> Value {
    json!({ "id": id, "status": status })
}

pub fn costed_task_json(id: &str, status: &str, cost: f64) -> Value {
    json!({ "id": id, "status": status, "totalCost": cost })
}

pub fn cost_report_json(total: f64) -> Value {
    json!({ "taskId": null, "totalCost": total, "materials": [], "labor": [] })
}

/// Kanban payload from `(column, tasks)` pairs
pub fn kanban_json(columns: &[(&str, Vec<Value>)]) -> Value {
    let map: Map<String, Value> = columns
        .iter()
        .map(|(column, tasks)| ((*column).to_string(), Value::Array(tasks.clone())))
        .collect();
    Value::Object(map)
}

pub fn kanban_path(project_id: u64) -> String {
    format!("/projects/{project_id}/tasks/kanban")
}

pub fn project_tasks_path(project_id: u64) -> String {
    format!("/projects/{project_id}/tasks")
}

pub fn tasks_by_project_path(project_id: u64) -> String {
    format!("/tasks/project/{project_id}")
}

pub fn cost_report_path(task_id: &str) -> String {
    format!("/cost/tasks/{task_id}/report")
}
