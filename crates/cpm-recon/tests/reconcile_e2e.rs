use std::sync::Arc;

use cpm_client::{ClientConfig, HttpApiClient, TokenConfig};
use cpm_recon::{Degradation, PortfolioReconciler, ProjectId, ReconConfig, ReconError};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn reconciler(server: &MockServer) -> PortfolioReconciler<HttpApiClient> {
    let config = ClientConfig::new()
        .with_base_url(server.uri())
        .with_token(TokenConfig::Static {
            value: "t0ken".into(),
        });
    let client = Arc::new(HttpApiClient::new(config).unwrap());
    PortfolioReconciler::new(client, ReconConfig::new().with_enrichment_concurrency(4)).unwrap()
}

/// Backend where each project answers on a different endpoint.
async fn mixed_backend() -> MockServer {
    let server = MockServer::start().await;

    mount_json(
        &server,
        "/projects",
        json!([
            {"id": 1, "name": "Harbor Bridge", "totalBudget": 1000},
            {"id": 2, "name": "North Depot", "budget": "1000"},
            {"id": 3, "name": "Old Mill", "totalBudget": 0},
            {"id": 4, "name": "Ghost Site", "totalBudget": 300}
        ]),
    )
    .await;

    // Project 1: kanban, one cost precomputed, one enriched.
    mount_json(
        &server,
        "/projects/1/tasks/kanban",
        json!({
            "todo": [{"id": 11, "totalCost": 300}],
            "done": [{"id": 12}]
        }),
    )
    .await;
    mount_json(&server, "/cost/tasks/12/report", json!({"totalCost": 200})).await;

    // Project 2: kanban missing, flat listing wrapped, over budget.
    mount_status(&server, "/projects/2/tasks/kanban", 404).await;
    mount_json(
        &server,
        "/projects/2/tasks",
        json!({"tasks": [
            {"id": 21, "status": "completed", "totalCost": 700},
            {"id": 22, "status": "in_progress", "totalCost": 500}
        ]}),
    )
    .await;

    // Project 3: only the global listing knows it, by name; one cost lookup fails.
    mount_json(
        &server,
        "/tasks",
        json!([
            {"id": 31, "projectName": "Old Mill", "status": "DONE", "totalCost": 50},
            {"id": 32, "project": {"id": 3}, "status": "todo"},
            {"id": 99, "projectId": 42, "totalCost": 1000}
        ]),
    )
    .await;
    mount_status(&server, "/cost/tasks/32/report", 500).await;

    // Project 4: no endpoint has anything.
    server
}

#[tokio::test]
async fn reconciles_mixed_backend() {
    let server = mixed_backend().await;

    let report = reconciler(&server).reconcile_all().await.unwrap();

    let p1 = report.project(&ProjectId::new("1")).unwrap();
    assert_eq!(p1.realized_cost, 500.0);
    assert_eq!(p1.progress_percentage, 50);
    assert_eq!(p1.completed_tasks, 1);
    assert_eq!(p1.pending_tasks, 1);
    assert!(!p1.is_over_budget);
    assert_eq!(p1.task_source.as_deref(), Some("kanban"));
    assert!(!p1.degraded);

    let p2 = report.project(&ProjectId::new("2")).unwrap();
    assert_eq!(p2.realized_cost, 1200.0);
    assert_eq!(p2.progress_percentage, 120);
    assert!(p2.is_over_budget);
    assert_eq!(p2.task_source.as_deref(), Some("project_tasks"));

    let p3 = report.project(&ProjectId::new("3")).unwrap();
    assert_eq!(p3.total_tasks, 2);
    assert_eq!(p3.completed_tasks, 1);
    assert_eq!(p3.realized_cost, 50.0);
    assert_eq!(p3.progress_percentage, 0);
    assert_eq!(p3.task_source.as_deref(), Some("all_tasks"));
    assert_eq!(
        p3.degradations,
        vec![Degradation::CostLookupFailed {
            task_ids: vec!["32".into()]
        }]
    );

    // Project 4: the global listing answered (with nothing for it), so the
    // empty result is genuine rather than degraded.
    let p4 = report.project(&ProjectId::new("4")).unwrap();
    assert_eq!(p4.total_tasks, 0);
    assert!(!p4.degraded);

    let stats = &report.stats;
    assert_eq!(stats.total_projects, 4);
    assert_eq!(stats.total_budget, 2300.0);
    assert_eq!(stats.realized_cost, 1750.0);
    assert_eq!(stats.completed_tasks, 3);
    assert_eq!(stats.pending_tasks, 3);
    assert_eq!(stats.degraded_projects, 1);
    assert_eq!(stats.over_budget_projects, 2);
}

#[tokio::test]
async fn reconciliation_is_idempotent() {
    let server = mixed_backend().await;
    let reconciler = reconciler(&server);

    let first = reconciler.reconcile_all().await.unwrap();
    let second = reconciler.reconcile_all().await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn bearer_token_is_sent_on_every_request() {
    let server = mixed_backend().await;

    reconciler(&server).reconcile_all().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests.is_empty());
    for request in requests {
        assert_eq!(
            request
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok()),
            Some("Bearer t0ken"),
            "{}",
            request.url
        );
    }
}

#[tokio::test]
async fn kanban_hit_skips_remaining_candidates() {
    let server = MockServer::start().await;
    mount_json(&server, "/projects", json!([{"id": 5, "name": "Quay", "totalBudget": 10}])).await;
    mount_json(
        &server,
        "/projects/5/tasks/kanban",
        json!({"todo": [], "done": [{"id": "taskA", "totalCost": 4}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/projects/5/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let report = reconciler(&server).reconcile_all().await.unwrap();

    assert_eq!(report.projects[0].total_tasks, 1);
    assert_eq!(report.projects[0].completed_tasks, 1);
    assert_eq!(report.projects[0].progress_percentage, 40);
}

#[tokio::test]
async fn project_list_outage_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("authorization", "Bearer t0ken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = reconciler(&server).reconcile_all().await.unwrap_err();

    assert!(matches!(err, ReconError::ProjectListUnavailable(_)));
    assert!(err.is_retryable());
}
