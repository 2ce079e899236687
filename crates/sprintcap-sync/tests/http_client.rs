//! HTTP tests for the remote client and outbound export against a mock
//! tracker.

use secrecy::SecretString;
use serde_json::json;
use sprintcap_domain::{BoardSnapshot, BoardState, NewTask, Task, TaskUpdate};
use sprintcap_sync::remote::RemoteApi;
use sprintcap_sync::{export_changes, FieldConfig, HttpRemoteClient, SyncError};
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpRemoteClient {
    HttpRemoteClient::new(
        &server.uri(),
        SecretString::new("test-token".into()),
        Duration::from_secs(5),
    )
    .unwrap()
}

async fn mount_metadata(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/projects/proj/sections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"gid": "s-backlog", "name": "Backlog"},
                {"gid": "s-todo", "name": "To Do"},
                {"gid": "s-doing", "name": "In Progress"},
                {"gid": "s-done", "name": "Done"}
            ]
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/proj/custom_field_settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"custom_field": {"gid": "cf-points", "name": "Datapoints"}},
                {"custom_field": {
                    "gid": "cf-sprints",
                    "name": "Sprints",
                    "enum_options": [{"gid": "o-1", "name": "Sprint 1"}]
                }}
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
}

// =============================================================================
// Task listing
// =============================================================================

#[tokio::test]
async fn test_fetch_tasks_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/proj/tasks"))
        .and(query_param("limit", "100"))
        .and(query_param_is_missing("offset"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"gid": "1", "name": "First"}],
            "next_page": {"offset": "page-2"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/proj/tasks"))
        .and(query_param("offset", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"gid": "2", "name": "Second", "completed": true}],
            "next_page": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client(&server).fetch_tasks("proj").await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].gid, "1");
    assert!(tasks[1].completed);
}

#[tokio::test]
async fn test_non_success_status_maps_to_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/proj/tasks"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Not Authorized"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_tasks("proj").await.unwrap_err();

    assert_eq!(
        err,
        SyncError::Http {
            status: 401,
            message: "Unauthorized".to_string()
        }
    );
    assert_eq!(err.to_string(), "Remote API error: Unauthorized (401)");
}

#[tokio::test]
async fn test_malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/proj/sections"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_sections("proj").await.unwrap_err();
    assert!(matches!(err, SyncError::Decode(_)));
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_empty_export_makes_no_requests() {
    let server = MockServer::start().await;

    let report = export_changes(&[], &[], &FieldConfig::new("proj"), &client(&server))
        .await
        .unwrap();

    assert!(report.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_creation_fetches_metadata_then_creates_and_moves() {
    let server = MockServer::start().await;
    mount_metadata(&server).await;

    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_partial_json(json!({
            "data": {
                "name": "New feature",
                "projects": ["proj"],
                "custom_fields": {"cf-points": 3.0}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"gid": "remote-9", "name": "New feature"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sections/s-backlog/addTask"))
        .and(body_json(json!({"data": {"task": "remote-9"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut board = BoardState::new();
    let local_id = board.add_task(NewTask::new("New feature", 3.0));

    let report = export_changes(
        board.pending_changes(),
        board.tasks(),
        &FieldConfig::new("proj"),
        &client(&server),
    )
    .await
    .unwrap();

    assert_eq!(report.created, vec![(local_id, "remote-9".to_string())]);
    assert_eq!(report.moved, vec!["remote-9".to_string()]);
    assert_eq!(report.exported_ids.len(), 1);

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(paths.len(), 4);
    assert_eq!(
        paths[2..].to_vec(),
        vec!["/tasks".to_string(), "/sections/s-backlog/addTask".to_string()]
    );
}

#[tokio::test]
async fn test_update_sends_only_changed_custom_fields() {
    let server = MockServer::start().await;
    mount_metadata(&server).await;

    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .and(body_json(json!({"data": {"custom_fields": {"cf-points": 8.0}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"gid": "t1"}})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sections/s-todo/addTask"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut task = Task::new("t1", "Existing", 5.0);
    task.sprint = Some("Sprint 1".to_string());
    let mut board = BoardState::from_snapshot(BoardSnapshot {
        tasks: vec![task],
        ..BoardSnapshot::default()
    });
    board.update_task(
        "t1",
        TaskUpdate {
            points: Some(8.0),
            ..TaskUpdate::default()
        },
    );

    let report = export_changes(
        board.pending_changes(),
        board.tasks(),
        &FieldConfig::new("proj"),
        &client(&server),
    )
    .await
    .unwrap();

    assert_eq!(report.updated, vec!["t1".to_string()]);
    assert!(report.moved.is_empty());
}

#[tokio::test]
async fn test_metadata_failure_stops_export() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/proj/sections"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/proj/custom_field_settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut board = BoardState::new();
    board.add_task(NewTask::new("New feature", 3.0));

    let err = export_changes(
        board.pending_changes(),
        board.tasks(),
        &FieldConfig::new("proj"),
        &client(&server),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SyncError::Metadata(_)));
    assert!(err
        .to_string()
        .starts_with("failed to fetch project metadata:"));
}
