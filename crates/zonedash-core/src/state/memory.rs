// # Memory Snapshot Store
//
// In-memory implementation of SnapshotStore.
//
// ## Crash Behavior
//
// - The snapshot is lost on restart
// - The first discovery after a restart always reports a change
//
// ## When to Use
//
// - Testing environments
// - One-shot commands that must not touch `config.json`

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::{IpSnapshot, SnapshotStore};

/// In-memory snapshot store
///
/// Clones share the same snapshot.
///
/// # Example
///
/// ```rust
/// use zonedash_core::state::MemorySnapshotStore;
/// use zonedash_core::traits::{IpSnapshot, SnapshotStore};
///
/// # tokio_test::block_on(async {
/// let store = MemorySnapshotStore::new();
/// store.save(&IpSnapshot::new(Some("1.2.3.4".into()), None)).await.unwrap();
///
/// let snapshot = store.load().await.unwrap();
/// assert_eq!(snapshot.ipv4.as_deref(), Some("1.2.3.4"));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<RwLock<IpSnapshot>>,
}

impl MemorySnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `snapshot`
    pub fn with_snapshot(snapshot: IpSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<IpSnapshot, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, snapshot: &IpSnapshot) -> Result<(), Error> {
        *self.inner.write().await = snapshot.clone();
        Ok(())
    }
}
