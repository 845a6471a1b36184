use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::app::ports::SnapshotStore;
use crate::error::Result;
use crate::metrics;
use crate::pipeline::Harvester;
use crate::types::SnapshotKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Today's snapshot was already stored; nothing was fetched.
    AlreadyPresent,
    Stored,
    /// Another run stored today's snapshot between our check and our write.
    LostRace,
    /// Forced run replaced whatever was stored.
    Overwritten,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub key: SnapshotKey,
    pub outcome: RunOutcome,
    pub venues: usize,
    pub items: usize,
    pub duration_secs: f64,
}

/// Once-per-day harvest guarded by the snapshot store.
pub struct HarvestUseCase {
    harvester: Harvester,
    store: Arc<dyn SnapshotStore>,
}

impl HarvestUseCase {
    pub fn new(harvester: Harvester, store: Arc<dyn SnapshotStore>) -> Self {
        Self { harvester, store }
    }

    /// Skip when `today` is already stored; otherwise harvest and write with a
    /// conditional create so two overlapping runs cannot both write.
    #[instrument(skip(self))]
    pub async fn run_once(&self, today: NaiveDate) -> Result<RunSummary> {
        let started = Instant::now();
        let key = SnapshotKey::for_date(today);

        if self.store.exists(&key).await.map_err(|e| {
            error!("Snapshot store check failed: {}", e);
            e
        })? {
            info!("Snapshot {} already exists; skipping harvest", key);
            metrics::snapshot_skipped();
            return Ok(RunSummary {
                key,
                outcome: RunOutcome::AlreadyPresent,
                venues: 0,
                items: 0,
                duration_secs: started.elapsed().as_secs_f64(),
            });
        }

        let snapshot = self.harvester.harvest(today).await.map_err(|e| {
            error!("Harvest aborted: {}", e);
            e
        })?;

        let outcome = if self.store.create_if_absent(&snapshot).await? {
            metrics::snapshot_written();
            info!("Stored snapshot {}", key);
            RunOutcome::Stored
        } else {
            metrics::snapshot_skipped();
            warn!("Snapshot {} was stored by a concurrent run; keeping the existing one", key);
            RunOutcome::LostRace
        };

        Ok(RunSummary {
            key,
            outcome,
            venues: snapshot.venues.len(),
            items: snapshot.item_count(),
            duration_secs: started.elapsed().as_secs_f64(),
        })
    }

    /// Harvest and overwrite today's snapshot regardless of what is stored.
    #[instrument(skip(self))]
    pub async fn run_forced(&self, today: NaiveDate) -> Result<RunSummary> {
        let started = Instant::now();
        let snapshot = self.harvester.harvest(today).await?;
        self.store.upsert(&snapshot).await?;
        metrics::snapshot_written();
        info!("Overwrote snapshot {}", snapshot.key);
        Ok(RunSummary {
            key: snapshot.key.clone(),
            outcome: RunOutcome::Overwritten,
            venues: snapshot.venues.len(),
            items: snapshot.item_count(),
            duration_secs: started.elapsed().as_secs_f64(),
        })
    }
}
