use async_trait::async_trait;
use std::time::Duration;

use crate::error::{FetchError, StoreError};
use crate::types::{Snapshot, SnapshotKey};

/// Connect/read bounds for one GET.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(crate::constants::DEFAULT_CONNECT_TIMEOUT_MS),
            read: Duration::from_millis(crate::constants::DEFAULT_READ_TIMEOUT_MS),
        }
    }
}

/// A successfully fetched page. Only 200 responses become a `RawPage`.
/// `body` is already decoded using the charset the server declared.
#[derive(Clone, Debug)]
pub struct RawPage {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl RawPage {
    pub fn text(&self) -> &str {
        &self.body
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeouts: FetchTimeouts) -> Result<RawPage, FetchError>;
}

/// Persistence for daily snapshots keyed by `YYYYMMDD`.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Lookup by id across every partition.
    async fn exists(&self, key: &SnapshotKey) -> Result<bool, StoreError>;

    /// Write the full document, replacing any existing one with the same key.
    async fn upsert(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// Write only if no document with this key exists. Returns whether it wrote.
    async fn create_if_absent(&self, snapshot: &Snapshot) -> Result<bool, StoreError>;

    async fn load(&self, key: &SnapshotKey) -> Result<Option<Snapshot>, StoreError>;
}
