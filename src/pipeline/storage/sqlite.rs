use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::app::ports::SnapshotStore;
use crate::error::StoreError;
use crate::types::{Snapshot, SnapshotDocument, SnapshotKey};

/// Durable snapshot store. One row per document; `id` and `partition_key`
/// both hold the `YYYYMMDD` key. Queries run on the blocking pool.
pub struct SqliteSnapshotStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSnapshotStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("{}: {}", parent.display(), e)))?;
        }
        let conn = Connection::open(db_path)?;
        Self::init(conn).map(|store| {
            info!("Opened snapshot store at {}", db_path.display());
            store
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS snapshots (
                partition_key TEXT NOT NULL,
                id            TEXT NOT NULL,
                date          TEXT NOT NULL,
                data          TEXT NOT NULL,
                written_at    INTEGER NOT NULL,
                PRIMARY KEY (partition_key, id)
            );
            CREATE INDEX IF NOT EXISTS snapshots_by_id ON snapshots (id);
            "#,
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("snapshot store lock poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("snapshot store task failed: {e}")))?
    }
}

fn encode(snapshot: &Snapshot) -> Result<(String, String), StoreError> {
    let doc = snapshot.clone().into_document();
    let data = serde_json::to_string(&doc.data)?;
    Ok((doc.id.to_string(), data))
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn exists(&self, key: &SnapshotKey) -> Result<bool, StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM snapshots WHERE id = ?1 LIMIT 1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn upsert(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let (key, data) = encode(snapshot)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO snapshots (partition_key, id, date, data, written_at)
                 VALUES (?1, ?1, ?1, ?2, strftime('%s','now'))
                 ON CONFLICT(partition_key, id) DO UPDATE SET
                   date=excluded.date, data=excluded.data, written_at=excluded.written_at",
                params![key, data],
            )?;
            debug!("Upserted snapshot {}", key);
            Ok(())
        })
        .await
    }

    async fn create_if_absent(&self, snapshot: &Snapshot) -> Result<bool, StoreError> {
        let (key, data) = encode(snapshot)?;
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "INSERT INTO snapshots (partition_key, id, date, data, written_at)
                 VALUES (?1, ?1, ?1, ?2, strftime('%s','now'))
                 ON CONFLICT(partition_key, id) DO NOTHING",
                params![key, data],
            )?;
            debug!("Conditional create of snapshot {}: wrote={}", key, changed == 1);
            Ok(changed == 1)
        })
        .await
    }

    async fn load(&self, key: &SnapshotKey) -> Result<Option<Snapshot>, StoreError> {
        let wanted = key.to_string();
        let row: Option<(String, String, String)> = self
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT id, date, data FROM snapshots WHERE partition_key = ?1 AND id = ?1",
                        params![wanted],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )
                    .optional()?)
            })
            .await?;

        let Some((id, date, data)) = row else {
            return Ok(None);
        };
        let (Some(id), Some(date)) = (SnapshotKey::parse(&id), SnapshotKey::parse(&date)) else {
            return Err(StoreError::Unavailable(format!(
                "stored snapshot has malformed key '{id}'"
            )));
        };
        let doc = SnapshotDocument {
            id,
            date,
            data: serde_json::from_str(&data)?,
        };
        Ok(Some(doc.into()))
    }
}
