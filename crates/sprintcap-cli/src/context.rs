use parking_lot::{Mutex, MutexGuard};
use sprintcap_core::{AppConfig, PlannerError, PlannerResult};
use sprintcap_domain::{BoardState, NoopSink};
use sprintcap_persistence::{save_channel, spawn_save_worker, JsonFileStore, PersistenceStore};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Board loaded for one command, saved in the background as it changes.
pub struct CliContext {
    board: Arc<Mutex<BoardState>>,
    worker: JoinHandle<()>,
    pub config: AppConfig,
}

impl CliContext {
    /// Load the board at `file_path`, or start from demo data when there is
    /// no file yet.
    pub async fn load(file_path: &Path, config: AppConfig) -> PlannerResult<Self> {
        let store = Arc::new(JsonFileStore::new(file_path));

        let board = match store.load().await? {
            Some((snapshot, metadata)) => {
                tracing::debug!(
                    "Loaded board saved by {} at {}",
                    metadata.instance_id,
                    metadata.saved_at
                );
                BoardState::from_snapshot(snapshot)
            }
            None => {
                tracing::info!("No board at {}; starting from demo data", file_path.display());
                BoardState::demo()
            }
        };

        let (sink, rx) = save_channel();
        let worker = spawn_save_worker(store, rx);

        Ok(Self {
            board: Arc::new(Mutex::new(board.with_sink(Arc::new(sink)))),
            worker,
            config,
        })
    }

    pub fn board(&self) -> MutexGuard<'_, BoardState> {
        self.board.lock()
    }

    pub fn shared_board(&self) -> Arc<Mutex<BoardState>> {
        self.board.clone()
    }

    /// Close the save channel and wait for pending writes.
    pub async fn finish(self) -> PlannerResult<()> {
        self.board.lock().set_sink(Arc::new(NoopSink));
        self.worker
            .await
            .map_err(|e| PlannerError::Internal(format!("save worker failed: {e}")))
    }
}
