use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use sprintcap_core::FixedClock;
use sprintcap_domain::{BoardState, TaskStatus, TaskUpdate};
use sprintcap_sync::remote::{
    CustomFieldDef, CustomFieldSetting, Membership, NamedRef, RemoteCustomField, RemoteTask,
    TaskPayload,
};
use sprintcap_sync::{
    ApiConnector, Credentials, PullOutcome, RemoteApi, StaticCredentials, SyncCoordinator,
    SyncError, SyncSettings,
};

type SyncResult<T> = Result<T, SyncError>;

#[derive(Default)]
struct FakeApi {
    tasks: Vec<RemoteTask>,
    fetch_delay: Option<Duration>,
    fail_fetch: bool,
    fail_update: bool,
    fail_update_for: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl RemoteApi for FakeApi {
    async fn fetch_tasks(&self, project_id: &str) -> SyncResult<Vec<RemoteTask>> {
        self.log(format!("fetch_tasks:{project_id}"));
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch {
            return Err(SyncError::Http {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(self.tasks.clone())
    }

    async fn fetch_sections(&self, _project_id: &str) -> SyncResult<Vec<NamedRef>> {
        self.log("sections".to_string());
        Ok(vec![
            NamedRef::new("s-backlog", "Backlog"),
            NamedRef::new("s-todo", "To Do"),
            NamedRef::new("s-done", "Done"),
        ])
    }

    async fn fetch_custom_field_settings(
        &self,
        _project_id: &str,
    ) -> SyncResult<Vec<CustomFieldSetting>> {
        self.log("settings".to_string());
        Ok(vec![CustomFieldSetting {
            custom_field: CustomFieldDef {
                gid: "cf-points".to_string(),
                name: "Datapoints".to_string(),
                enum_options: Vec::new(),
            },
        }])
    }

    async fn create_task(&self, payload: &TaskPayload) -> SyncResult<String> {
        self.log(format!("create:{}", payload.name.clone().unwrap_or_default()));
        Ok("remote-new".to_string())
    }

    async fn update_task(&self, task_id: &str, _payload: &TaskPayload) -> SyncResult<()> {
        self.log(format!("update:{task_id}"));
        if self.fail_update || self.fail_update_for.iter().any(|id| id == task_id) {
            return Err(SyncError::Transport("connection reset".to_string()));
        }
        Ok(())
    }

    async fn add_task_to_section(&self, section_id: &str, task_id: &str) -> SyncResult<()> {
        self.log(format!("move:{section_id}:{task_id}"));
        Ok(())
    }
}

struct FakeConnector {
    api: Arc<FakeApi>,
}

impl ApiConnector for FakeConnector {
    fn connect(&self, _credentials: &Credentials) -> SyncResult<Arc<dyn RemoteApi>> {
        let api: Arc<dyn RemoteApi> = self.api.clone();
        Ok(api)
    }
}

fn remote_task(gid: &str, sprint: Option<&str>, section: &str) -> RemoteTask {
    RemoteTask {
        gid: gid.to_string(),
        name: format!("Remote {gid}"),
        memberships: vec![Membership {
            section: Some(NamedRef::new("sec", section)),
            project: Some(NamedRef::new("proj", "Project")),
        }],
        custom_fields: vec![
            RemoteCustomField {
                gid: "cf-sprints".to_string(),
                name: "Sprints".to_string(),
                multi_enum_values: Some(
                    sprint
                        .map(|s| vec![NamedRef::new("opt", s)])
                        .unwrap_or_default(),
                ),
                ..RemoteCustomField::default()
            },
            RemoteCustomField {
                gid: "cf-points".to_string(),
                name: "Datapoints".to_string(),
                number_value: Some(2.0),
                ..RemoteCustomField::default()
            },
        ],
        ..RemoteTask::default()
    }
}

fn remote_project() -> Vec<RemoteTask> {
    vec![
        remote_task("r1", Some("Sprint 1"), "To Do"),
        remote_task("r2", Some("Sprint 2"), "In Progress"),
        remote_task("r3", None, "Backlog"),
    ]
}

fn coordinator(api: FakeApi, credentials: StaticCredentials) -> (SyncCoordinator, Arc<FakeApi>) {
    let api = Arc::new(api);
    let board = Arc::new(Mutex::new(BoardState::demo()));
    let coordinator = SyncCoordinator::new(
        board,
        Arc::new(FakeConnector { api: api.clone() }),
        Arc::new(credentials),
        SyncSettings::default(),
    )
    .with_clock(Arc::new(FixedClock::at_date(2025, 1, 15).unwrap()));
    (coordinator, api)
}

fn credentials() -> StaticCredentials {
    StaticCredentials::new("token", "proj")
}

fn edit_demo_points(coordinator: &SyncCoordinator) {
    coordinator.board().lock().update_task(
        "1",
        TaskUpdate {
            points: Some(8.0),
            ..TaskUpdate::default()
        },
    );
}

// =============================================================================
// Pull
// =============================================================================

#[tokio::test]
async fn test_pull_without_credentials_is_silent() {
    let (coordinator, api) = coordinator(FakeApi::default(), StaticCredentials::none());

    assert_eq!(coordinator.pull().await, PullOutcome::Skipped);

    assert!(api.calls().is_empty());
    assert!(coordinator.board().lock().is_demo_mode());
    assert!(coordinator.status().last_error.is_none());
}

#[tokio::test]
async fn test_pull_replaces_board() {
    let api = FakeApi {
        tasks: remote_project(),
        ..FakeApi::default()
    };
    let (coordinator, _) = coordinator(api, credentials());
    edit_demo_points(&coordinator);

    let outcome = coordinator.pull().await;

    assert_eq!(outcome, PullOutcome::Imported { tasks: 3, sprints: 2 });
    let board = coordinator.board().lock();
    assert!(!board.is_demo_mode());
    assert!(board.pending_changes().is_empty());
    assert_eq!(board.task("r2").unwrap().status, TaskStatus::InProgress);
    assert_eq!(board.task("r3").unwrap().status, TaskStatus::Backlog);
    drop(board);

    let status = coordinator.status();
    assert!(status.last_synced_at.is_some());
    assert!(!status.is_pulling);
}

#[tokio::test]
async fn test_failed_pull_keeps_local_state() {
    let api = FakeApi {
        fail_fetch: true,
        ..FakeApi::default()
    };
    let (coordinator, _) = coordinator(api, credentials());
    edit_demo_points(&coordinator);

    let outcome = coordinator.pull().await;

    assert!(matches!(outcome, PullOutcome::Failed { .. }));
    let board = coordinator.board().lock();
    assert!(board.is_demo_mode());
    assert_eq!(board.tasks().len(), 16);
    assert_eq!(board.pending_changes().len(), 1);
    drop(board);
    assert_eq!(
        coordinator.status().last_error.as_deref(),
        Some("Remote API error: Internal Server Error (500)")
    );
}

#[tokio::test]
async fn test_concurrent_pull_reports_already_running() {
    let api = FakeApi {
        tasks: remote_project(),
        fetch_delay: Some(Duration::from_millis(50)),
        ..FakeApi::default()
    };
    let (coordinator, api) = coordinator(api, credentials());

    let (first, second) = tokio::join!(coordinator.pull(), coordinator.pull());

    let outcomes = [first, second];
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, PullOutcome::Imported { .. }))
            .count(),
        1
    );
    assert!(outcomes.contains(&PullOutcome::AlreadyRunning));
    assert_eq!(api.calls(), vec!["fetch_tasks:proj".to_string()]);
}

#[tokio::test]
async fn test_slow_pull_times_out_and_resets_flag() {
    let api = FakeApi {
        fetch_delay: Some(Duration::from_millis(500)),
        ..FakeApi::default()
    };
    let api = Arc::new(api);
    let coordinator = SyncCoordinator::new(
        Arc::new(Mutex::new(BoardState::demo())),
        Arc::new(FakeConnector { api: api.clone() }),
        Arc::new(credentials()),
        SyncSettings {
            timeout: Duration::from_millis(20),
            ..SyncSettings::default()
        },
    );

    let outcome = coordinator.pull().await;

    match outcome {
        PullOutcome::Failed { error } => assert_eq!(error, "Timed out after 20ms"),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(!coordinator.status().is_pulling);
    assert!(coordinator.board().lock().is_demo_mode());
}

// =============================================================================
// Push
// =============================================================================

#[tokio::test]
async fn test_push_without_credentials_keeps_ledger() {
    let (coordinator, api) = coordinator(FakeApi::default(), StaticCredentials::none());
    edit_demo_points(&coordinator);

    let err = coordinator.push().await.unwrap_err();

    assert_eq!(err, SyncError::MissingCredentials);
    assert_eq!(err.to_string(), "Missing credentials");
    assert_eq!(coordinator.board().lock().pending_changes().len(), 1);
    assert_eq!(
        coordinator.status().last_error.as_deref(),
        Some("Missing credentials")
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_failed_export_keeps_ledger() {
    let api = FakeApi {
        fail_update: true,
        ..FakeApi::default()
    };
    let (coordinator, api) = coordinator(api, credentials());
    edit_demo_points(&coordinator);

    let err = coordinator.push().await.unwrap_err();

    assert!(matches!(err, SyncError::Partial { failed: 1, total: 1, .. }));
    assert_eq!(coordinator.board().lock().pending_changes().len(), 1);
    assert!(coordinator.status().last_error.is_some());
    assert!(!api.calls().iter().any(|c| c.starts_with("fetch_tasks")));
}

#[tokio::test]
async fn test_one_failed_task_does_not_stop_the_others() {
    let api = FakeApi {
        fail_update_for: vec!["1".to_string()],
        ..FakeApi::default()
    };
    let (coordinator, api) = coordinator(api, credentials());
    edit_demo_points(&coordinator);
    coordinator.board().lock().update_task(
        "3b",
        TaskUpdate {
            status: Some(TaskStatus::Done),
            ..TaskUpdate::default()
        },
    );

    let err = coordinator.push().await.unwrap_err();

    assert!(matches!(err, SyncError::Partial { failed: 1, total: 2, .. }));
    let calls = api.calls();
    assert!(calls.contains(&"update:1".to_string()));
    assert!(calls.contains(&"update:3b".to_string()));
    assert!(calls.contains(&"move:s-done:3b".to_string()));
    assert_eq!(coordinator.board().lock().pending_changes().len(), 2);
}

#[tokio::test]
async fn test_successful_push_clears_exported_changes_then_pulls() {
    let api = FakeApi {
        fail_fetch: true,
        ..FakeApi::default()
    };
    let (coordinator, api) = coordinator(api, credentials());
    edit_demo_points(&coordinator);

    let report = coordinator.push().await.unwrap();

    assert_eq!(report.export.updated, vec!["1".to_string()]);
    assert_eq!(report.export.exported_ids.len(), 1);
    assert!(matches!(report.refresh, PullOutcome::Failed { .. }));
    assert!(coordinator.board().lock().pending_changes().is_empty());
    assert_eq!(api.calls().last().map(String::as_str), Some("fetch_tasks:proj"));
}

#[tokio::test]
async fn test_push_with_nothing_pending_still_refreshes() {
    let api = FakeApi {
        tasks: remote_project(),
        ..FakeApi::default()
    };
    let (coordinator, api) = coordinator(api, credentials());

    let report = coordinator.push().await.unwrap();

    assert!(report.export.is_empty());
    assert_eq!(report.refresh, PullOutcome::Imported { tasks: 3, sprints: 2 });
    assert_eq!(api.calls(), vec!["fetch_tasks:proj".to_string()]);
}

// =============================================================================
// Auto-ingest
// =============================================================================

#[tokio::test]
async fn test_auto_ingest_runs_once_in_demo_mode() {
    let api = FakeApi {
        tasks: remote_project(),
        ..FakeApi::default()
    };
    let (coordinator, api) = coordinator(api, credentials());

    assert!(matches!(
        coordinator.auto_ingest().await,
        PullOutcome::Imported { .. }
    ));
    assert_eq!(coordinator.auto_ingest().await, PullOutcome::Skipped);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn test_auto_ingest_leaves_real_board_alone() {
    let api = FakeApi {
        tasks: remote_project(),
        ..FakeApi::default()
    };
    let (coordinator, api) = coordinator(api, credentials());
    coordinator.board().lock().import_data(Vec::new(), Vec::new());

    assert_eq!(coordinator.auto_ingest().await, PullOutcome::Skipped);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_auto_ingest_without_credentials_is_skipped() {
    let (coordinator, api) = coordinator(FakeApi::default(), StaticCredentials::none());

    assert_eq!(coordinator.auto_ingest().await, PullOutcome::Skipped);
    assert!(api.calls().is_empty());
}
