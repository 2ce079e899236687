//! Point-in-time capture of the planning board.
//!
//! `BoardSnapshot` is the serializable form of everything [`BoardState`]
//! owns. It is what gets written to disk after every mutation and what the
//! board is rebuilt from on start-up.
//!
//! [`BoardState`]: crate::BoardState

use crate::{PendingChange, Sprint, Task};
use serde::{Deserialize, Serialize};

/// Point-in-time capture of the board.
///
/// All fields use `#[serde(default)]` so partial or older snapshots still
/// load.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub sprints: Vec<Sprint>,

    #[serde(default)]
    pub is_demo_mode: bool,

    /// Assignee the capacity views are restricted to, if any.
    #[serde(default)]
    pub filter_assignee: Option<String>,

    /// Ledger entries, oldest first.
    #[serde(default)]
    pub pending_changes: Vec<PendingChange>,
}

impl BoardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.sprints.is_empty() && self.pending_changes.is_empty()
    }
}

/// Receives a snapshot after every state change.
///
/// Implementations must not block; the persistence crate queues snapshots
/// for an async writer.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, snapshot: BoardSnapshot);
}

/// Sink that discards snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl SnapshotSink for NoopSink {
    fn persist(&self, _snapshot: BoardSnapshot) {}
}
