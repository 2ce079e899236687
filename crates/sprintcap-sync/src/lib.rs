pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod mapper;
pub mod remote;

pub use coordinator::{ApiConnector, HttpConnector, PullOutcome, PushReport, SyncCoordinator, SyncSettings, SyncStatus};
pub use credentials::{CredentialSource, Credentials, StaticCredentials};
pub use error::SyncError;
pub use mapper::{export_changes, import_remote, ExportReport, FieldConfig, ImportResult};
pub use remote::{HttpRemoteClient, RemoteApi};
