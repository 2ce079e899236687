use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintcap_core::PlannerResult;
use sprintcap_domain::BoardSnapshot;
use uuid::Uuid;

/// Current version of the on-disk envelope
pub const FORMAT_VERSION: u32 = 1;

/// Metadata for persistence operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the process that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Trait for abstract storage of board snapshots
/// Implementations handle different backends (file, memory)
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Save a snapshot, replacing whatever was stored
    async fn save(&self, snapshot: &BoardSnapshot) -> PlannerResult<PersistenceMetadata>;

    /// Load the stored snapshot; `None` when nothing has been saved yet
    async fn load(&self) -> PlannerResult<Option<(BoardSnapshot, PersistenceMetadata)>>;

    /// Check if anything has been stored
    async fn exists(&self) -> bool;
}
