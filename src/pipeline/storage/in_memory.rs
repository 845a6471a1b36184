use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::app::ports::SnapshotStore;
use crate::error::StoreError;
use crate::types::{Snapshot, SnapshotDocument, SnapshotKey};

/// Partition key -> (document id -> serialized document).
type Partitions = HashMap<String, HashMap<String, String>>;

/// In-memory snapshot store for development/testing. Documents are kept
/// serialized so loads exercise the same round-trip as the durable store.
#[derive(Clone, Default)]
pub struct InMemorySnapshotStore {
    partitions: Arc<Mutex<Partitions>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents across every partition.
    pub fn len(&self) -> usize {
        self.lock()
            .map(|p| p.values().map(HashMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Partitions>, StoreError> {
        self.partitions
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn exists(&self, key: &SnapshotKey) -> Result<bool, StoreError> {
        let partitions = self.lock()?;
        Ok(partitions.values().any(|docs| docs.contains_key(key.as_str())))
    }

    async fn upsert(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let body = serde_json::to_string(&snapshot.clone().into_document())?;
        let mut partitions = self.lock()?;
        partitions
            .entry(snapshot.key.to_string())
            .or_default()
            .insert(snapshot.key.to_string(), body);
        debug!("Upserted snapshot {}", snapshot.key);
        Ok(())
    }

    async fn create_if_absent(&self, snapshot: &Snapshot) -> Result<bool, StoreError> {
        let body = serde_json::to_string(&snapshot.clone().into_document())?;
        let mut partitions = self.lock()?;
        let docs = partitions.entry(snapshot.key.to_string()).or_default();
        if docs.contains_key(snapshot.key.as_str()) {
            return Ok(false);
        }
        docs.insert(snapshot.key.to_string(), body);
        debug!("Created snapshot {}", snapshot.key);
        Ok(true)
    }

    async fn load(&self, key: &SnapshotKey) -> Result<Option<Snapshot>, StoreError> {
        let body = {
            let partitions = self.lock()?;
            partitions
                .get(key.as_str())
                .and_then(|docs| docs.get(key.as_str()))
                .cloned()
        };
        match body {
            Some(body) => {
                let doc: SnapshotDocument = serde_json::from_str(&body)?;
                Ok(Some(doc.into()))
            }
            None => Ok(None),
        }
    }
}
