use crate::traits::{PersistenceMetadata, PersistenceStore};
use parking_lot::Mutex;
use sprintcap_core::PlannerResult;
use sprintcap_domain::BoardSnapshot;
use uuid::Uuid;

/// In-process store, used when no data file is configured and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    instance_id: Uuid,
    slot: Mutex<Option<(BoardSnapshot, PersistenceMetadata)>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            ..Self::default()
        }
    }

    /// Number of saves performed so far
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    pub fn latest(&self) -> Option<BoardSnapshot> {
        self.slot.lock().as_ref().map(|(snapshot, _)| snapshot.clone())
    }
}

#[async_trait::async_trait]
impl PersistenceStore for MemoryStore {
    async fn save(&self, snapshot: &BoardSnapshot) -> PlannerResult<PersistenceMetadata> {
        let metadata = PersistenceMetadata::new(self.instance_id);
        *self.slot.lock() = Some((snapshot.clone(), metadata.clone()));
        *self.saves.lock() += 1;
        Ok(metadata)
    }

    async fn load(&self) -> PlannerResult<Option<(BoardSnapshot, PersistenceMetadata)>> {
        Ok(self.slot.lock().clone())
    }

    async fn exists(&self) -> bool {
        self.slot.lock().is_some()
    }
}
