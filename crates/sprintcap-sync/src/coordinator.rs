//! Pull and push orchestration around a shared board.
//!
//! The board lock is only taken between awaits. Each direction has an
//! in-flight flag released by a guard, so a dropped future never leaves a
//! sync stuck as running.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use secrecy::SecretString;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sprintcap_core::config::{DEFAULT_SPRINT_CAPACITY, DEFAULT_SPRINT_COUNT, DEFAULT_SYNC_TIMEOUT_SECS};
use sprintcap_core::{AppConfig, Clock, RemoteConfig, SystemClock};
use sprintcap_domain::BoardState;

use crate::credentials::{CredentialSource, Credentials};
use crate::error::{SyncError, SyncResult};
use crate::mapper::{export_changes, import_remote, ExportReport, FieldConfig};
use crate::remote::{HttpRemoteClient, RemoteApi};

/// Builds an API client for a set of credentials.
pub trait ApiConnector: Send + Sync {
    fn connect(&self, credentials: &Credentials) -> SyncResult<Arc<dyn RemoteApi>>;
}

#[derive(Debug, Clone)]
pub struct HttpConnector {
    base_url: String,
    request_timeout: Duration,
}

impl HttpConnector {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout,
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

impl ApiConnector for HttpConnector {
    fn connect(&self, credentials: &Credentials) -> SyncResult<Arc<dyn RemoteApi>> {
        let token = SecretString::new(credentials.token().into());
        let client = HttpRemoteClient::new(&self.base_url, token, self.request_timeout)?;
        Ok(Arc::new(client))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub sprint_count: usize,
    pub default_capacity: f64,
    /// Upper bound on a whole fetch or export.
    pub timeout: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            sprint_count: DEFAULT_SPRINT_COUNT,
            default_capacity: DEFAULT_SPRINT_CAPACITY,
            timeout: Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECS),
        }
    }
}

impl SyncSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            sprint_count: config.remote.sprint_count,
            default_capacity: config.board.default_sprint_capacity,
            timeout: Duration::from_secs(config.remote.sync_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PullOutcome {
    /// No credentials configured.
    Skipped,
    AlreadyRunning,
    Imported { tasks: usize, sprints: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushReport {
    pub export: ExportReport,
    /// Result of the pull that follows a successful export.
    pub refresh: PullOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_pulling: bool,
    pub is_pushing: bool,
    pub last_error: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct SyncState {
    last_error: Option<String>,
    last_synced_at: Option<DateTime<Utc>>,
}

/// Marks one direction as in flight until dropped.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct SyncCoordinator {
    board: Arc<Mutex<BoardState>>,
    connector: Arc<dyn ApiConnector>,
    credentials: Arc<dyn CredentialSource>,
    settings: SyncSettings,
    clock: Arc<dyn Clock>,
    pulling: AtomicBool,
    pushing: AtomicBool,
    auto_ingested: AtomicBool,
    state: Mutex<SyncState>,
}

impl SyncCoordinator {
    pub fn new(
        board: Arc<Mutex<BoardState>>,
        connector: Arc<dyn ApiConnector>,
        credentials: Arc<dyn CredentialSource>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            board,
            connector,
            credentials,
            settings,
            clock: Arc::new(SystemClock),
            pulling: AtomicBool::new(false),
            pushing: AtomicBool::new(false),
            auto_ingested: AtomicBool::new(false),
            state: Mutex::new(SyncState::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn board(&self) -> &Arc<Mutex<BoardState>> {
        &self.board
    }

    pub fn status(&self) -> SyncStatus {
        let state = self.state.lock();
        SyncStatus {
            is_pulling: self.pulling.load(Ordering::Acquire),
            is_pushing: self.pushing.load(Ordering::Acquire),
            last_error: state.last_error.clone(),
            last_synced_at: state.last_synced_at,
        }
    }

    fn field_config(&self, credentials: &Credentials) -> FieldConfig {
        FieldConfig::from_credentials(credentials)
            .with_sprint_count(self.settings.sprint_count)
            .with_default_capacity(self.settings.default_capacity)
    }

    fn record_error(&self, error: &SyncError) {
        self.state.lock().last_error = Some(error.to_string());
    }

    async fn bounded<T>(&self, future: impl Future<Output = SyncResult<T>>) -> SyncResult<T> {
        tokio::time::timeout(self.settings.timeout, future)
            .await
            .map_err(|_| SyncError::Timeout(self.settings.timeout))?
    }

    /// Replace the board with the remote project's current state.
    ///
    /// Without credentials this does nothing. Failures leave the board as
    /// it was and are kept in [`SyncStatus::last_error`].
    pub async fn pull(&self) -> PullOutcome {
        let Some(credentials) = self.credentials.credentials() else {
            tracing::debug!("Pull skipped: no credentials");
            return PullOutcome::Skipped;
        };
        let Some(_guard) = FlightGuard::acquire(&self.pulling) else {
            tracing::debug!("Pull already in progress");
            return PullOutcome::AlreadyRunning;
        };

        match self.fetch_and_import(&credentials).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Pull failed: {}", e);
                self.record_error(&e);
                PullOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn fetch_and_import(&self, credentials: &Credentials) -> SyncResult<PullOutcome> {
        let api = self.connector.connect(credentials)?;
        let records = self
            .bounded(api.fetch_tasks(&credentials.project_id))
            .await?;

        let result = import_remote(&records, &self.field_config(credentials), self.clock.now());
        let (tasks, sprints) = (result.tasks.len(), result.sprints.len());

        self.board.lock().import_data(result.sprints, result.tasks);

        let mut state = self.state.lock();
        state.last_error = None;
        state.last_synced_at = Some(self.clock.now_utc());
        Ok(PullOutcome::Imported { tasks, sprints })
    }

    /// Send pending changes, drop the ones sent, then pull.
    pub async fn push(&self) -> SyncResult<PushReport> {
        let Some(credentials) = self.credentials.credentials() else {
            let error = SyncError::MissingCredentials;
            self.record_error(&error);
            return Err(error);
        };

        let export = {
            let Some(_guard) = FlightGuard::acquire(&self.pushing) else {
                return Err(SyncError::AlreadyRunning);
            };

            let (changes, tasks) = {
                let board = self.board.lock();
                (board.pending_changes().to_vec(), board.tasks().to_vec())
            };

            let config = self.field_config(&credentials);
            let exported = match self.connector.connect(&credentials) {
                Ok(api) => {
                    self.bounded(export_changes(&changes, &tasks, &config, &*api))
                        .await
                }
                Err(e) => Err(e),
            };

            match exported {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("Push failed: {}", e);
                    self.record_error(&e);
                    return Err(e);
                }
            }
        };

        if !export.exported_ids.is_empty() {
            self.board
                .lock()
                .remove_changes(export.exported_ids.clone());
        }
        self.state.lock().last_error = None;

        let refresh = self.pull().await;
        Ok(PushReport { export, refresh })
    }

    /// Pull once on first use when the board still shows demo data and
    /// credentials are available.
    pub async fn auto_ingest(&self) -> PullOutcome {
        if self.credentials.credentials().is_none() {
            return PullOutcome::Skipped;
        }
        if self.auto_ingested.swap(true, Ordering::AcqRel) {
            return PullOutcome::Skipped;
        }
        if !self.board.lock().is_demo_mode() {
            return PullOutcome::Skipped;
        }
        tracing::info!("Loading remote project in place of demo data");
        self.pull().await
    }
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("settings", &self.settings)
            .field("status", &self.status())
            .finish()
    }
}
