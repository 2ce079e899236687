//! Asynchronous snapshot saving.
//!
//! The board hands a snapshot to [`ChannelSink`] after every change; a save
//! worker drains the channel and writes through a [`PersistenceStore`].
//! Snapshots that queue up while a write is in flight are collapsed so only
//! the newest one is written.

use crate::traits::PersistenceStore;
use sprintcap_domain::{BoardSnapshot, SnapshotSink};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Snapshot sink backed by an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<BoardSnapshot>,
}

impl SnapshotSink for ChannelSink {
    fn persist(&self, snapshot: BoardSnapshot) {
        // Send is non-blocking and only fails if the worker is gone
        if self.tx.send(snapshot).is_err() {
            tracing::error!("Failed to queue save: channel closed");
        } else {
            tracing::debug!("Snapshot queued for save");
        }
    }
}

/// Create a sink and the receiver a save worker drains
pub fn save_channel() -> (ChannelSink, mpsc::UnboundedReceiver<BoardSnapshot>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink { tx }, rx)
}

/// Spawn the save worker. It exits once every sender has been dropped and
/// the queue is drained.
pub fn spawn_save_worker(
    store: Arc<dyn PersistenceStore>,
    mut rx: mpsc::UnboundedReceiver<BoardSnapshot>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(mut snapshot) = rx.recv().await {
            let mut skipped = 0;
            while let Ok(newer) = rx.try_recv() {
                snapshot = newer;
                skipped += 1;
            }
            if skipped > 0 {
                tracing::debug!("Collapsed {} queued snapshots", skipped);
            }

            if let Err(e) = store.save(&snapshot).await {
                tracing::error!("Failed to save board: {}", e);
            }
        }
        tracing::debug!("Save worker stopped");
    })
}
