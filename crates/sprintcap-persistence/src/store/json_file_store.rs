use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{PersistenceMetadata, PersistenceStore, FORMAT_VERSION};
use sprintcap_core::{PlannerError, PlannerResult};
use sprintcap_domain::BoardSnapshot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// JSON file-based persistence store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    instance_id: Uuid,
}

/// On-disk wrapper around the board snapshot
#[derive(Debug, Serialize, Deserialize)]
struct JsonEnvelope {
    version: u32,
    metadata: PersistenceMetadata,
    data: BoardSnapshot,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Create a store with a specific instance ID
    pub fn with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl PersistenceStore for JsonFileStore {
    async fn save(&self, snapshot: &BoardSnapshot) -> PlannerResult<PersistenceMetadata> {
        let metadata = PersistenceMetadata::new(self.instance_id);
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: metadata.clone(),
            data: snapshot.clone(),
        };

        let json_bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| PlannerError::Serialization(e.to_string()))?;

        AtomicWriter::write_atomic(&self.path, &json_bytes).await?;

        tracing::debug!(
            "Saved {} tasks, {} pending changes to {}",
            snapshot.tasks.len(),
            snapshot.pending_changes.len(),
            self.path.display()
        );

        Ok(metadata)
    }

    async fn load(&self) -> PlannerResult<Option<(BoardSnapshot, PersistenceMetadata)>> {
        let Some(file_bytes) = AtomicWriter::read_if_exists(&self.path).await? else {
            tracing::debug!("No board file at {}", self.path.display());
            return Ok(None);
        };

        let envelope: JsonEnvelope = serde_json::from_slice(&file_bytes)
            .map_err(|e| PlannerError::Serialization(e.to_string()))?;

        if envelope.version != FORMAT_VERSION {
            return Err(PlannerError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }

        tracing::info!(
            "Loaded {} bytes from {}",
            file_bytes.len(),
            self.path.display()
        );

        Ok(Some((envelope.data, envelope.metadata)))
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}
