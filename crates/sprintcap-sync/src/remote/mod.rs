pub mod http_client;
pub mod models;

use async_trait::async_trait;

use crate::error::SyncResult;
pub use http_client::HttpRemoteClient;
pub use models::*;

/// Operations sync needs from the remote tracker
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Every task in the project, following pagination
    async fn fetch_tasks(&self, project_id: &str) -> SyncResult<Vec<RemoteTask>>;

    async fn fetch_sections(&self, project_id: &str) -> SyncResult<Vec<NamedRef>>;

    async fn fetch_custom_field_settings(&self, project_id: &str)
        -> SyncResult<Vec<CustomFieldSetting>>;

    /// Create a task and return its remote gid
    async fn create_task(&self, payload: &TaskPayload) -> SyncResult<String>;

    async fn update_task(&self, task_id: &str, payload: &TaskPayload) -> SyncResult<()>;

    async fn add_task_to_section(&self, section_id: &str, task_id: &str) -> SyncResult<()>;
}
