//! The published snapshot, shared between the scanner and status readers.
//!
//! Publishing swaps the whole `Arc<Snapshot>`; readers clone the `Arc` and
//! keep a complete snapshot for as long as they need it.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::Snapshot;

/// Single-writer, multi-reader snapshot cell.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    /// Store holding the empty startup snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest complete snapshot.
    pub async fn current(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Replace the published snapshot.
    pub async fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = snapshot;
    }
}
