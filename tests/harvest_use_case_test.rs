mod common;

use async_trait::async_trait;
use common::*;
use showtimes_scraper::app::ports::SnapshotStore;
use showtimes_scraper::app::{HarvestUseCase, RunOutcome};
use showtimes_scraper::error::{ScraperError, StoreError};
use showtimes_scraper::pipeline::storage::{InMemorySnapshotStore, SqliteSnapshotStore};
use showtimes_scraper::pipeline::Harvester;
use showtimes_scraper::types::{Snapshot, SnapshotKey};
use std::sync::Arc;

fn small_site() -> ScriptedFetcher {
    let mut fetcher = ScriptedFetcher::new().page(
        BASE_URL,
        listing_page(&[venue_card("Cine Callao", Some("{'id': 42}"))], None),
    );
    fetcher = fetcher.page(
        day_url("42", today()),
        day_page(&[movie_card("101", "Dune", &["18:00"])]),
    );
    fetcher
}

fn use_case(fetcher: Arc<ScriptedFetcher>, store: Arc<dyn SnapshotStore>) -> HarvestUseCase {
    HarvestUseCase::new(Harvester::from_config(fetcher, &test_config()), store)
}

#[tokio::test]
async fn second_run_on_same_day_does_nothing() {
    let fetcher = Arc::new(small_site());
    let store = InMemorySnapshotStore::new();
    let runner = use_case(fetcher.clone(), Arc::new(store.clone()));

    let first = runner.run_once(today()).await.unwrap();
    assert_eq!(first.outcome, RunOutcome::Stored);
    assert_eq!(first.venues, 1);
    assert_eq!(first.items, 1);
    let fetches_after_first = fetcher.calls().len();

    let second = runner.run_once(today()).await.unwrap();
    assert_eq!(second.outcome, RunOutcome::AlreadyPresent);
    assert_eq!(fetcher.calls().len(), fetches_after_first);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn stored_snapshot_matches_the_harvest() {
    let fetcher = Arc::new(small_site());
    let store = Arc::new(SqliteSnapshotStore::open_in_memory().unwrap());
    let runner = use_case(fetcher.clone(), store.clone());

    runner.run_once(today()).await.unwrap();

    let key = SnapshotKey::parse("20240101").unwrap();
    let stored = store.load(&key).await.unwrap().unwrap();
    let fresh = Harvester::from_config(fetcher, &test_config())
        .harvest(today())
        .await
        .unwrap();
    assert_eq!(stored, fresh);
}

#[tokio::test]
async fn failed_harvest_writes_nothing() {
    let fetcher = Arc::new(ScriptedFetcher::new().failing(BASE_URL));
    let store = InMemorySnapshotStore::new();
    let runner = use_case(fetcher, Arc::new(store.clone()));

    let err = runner.run_once(today()).await.unwrap_err();

    assert!(matches!(err, ScraperError::Extraction(_)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn forced_run_overwrites() {
    let store = InMemorySnapshotStore::new();
    let stale = Snapshot {
        key: SnapshotKey::for_date(today()),
        venues: vec![],
    };
    store.upsert(&stale).await.unwrap();

    let runner = use_case(Arc::new(small_site()), Arc::new(store.clone()));
    assert_eq!(
        runner.run_once(today()).await.unwrap().outcome,
        RunOutcome::AlreadyPresent
    );

    let summary = runner.run_forced(today()).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Overwritten);
    let loaded = store.load(&stale.key).await.unwrap().unwrap();
    assert_eq!(loaded.venues.len(), 1);
    assert_eq!(store.len(), 1);
}

/// Reports "absent" on every check but refuses writes, like a store that a
/// concurrent run filled between our check and our write.
struct RacingStore;

#[async_trait]
impl SnapshotStore for RacingStore {
    async fn exists(&self, _key: &SnapshotKey) -> Result<bool, StoreError> {
        Ok(false)
    }
    async fn upsert(&self, _snapshot: &Snapshot) -> Result<(), StoreError> {
        Ok(())
    }
    async fn create_if_absent(&self, _snapshot: &Snapshot) -> Result<bool, StoreError> {
        Ok(false)
    }
    async fn load(&self, _key: &SnapshotKey) -> Result<Option<Snapshot>, StoreError> {
        Ok(None)
    }
}

#[tokio::test]
async fn losing_the_write_race_keeps_existing_snapshot() {
    let runner = use_case(Arc::new(small_site()), Arc::new(RacingStore));

    let summary = runner.run_once(today()).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::LostRace);
}

struct DownStore;

#[async_trait]
impl SnapshotStore for DownStore {
    async fn exists(&self, _key: &SnapshotKey) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn upsert(&self, _snapshot: &Snapshot) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn create_if_absent(&self, _snapshot: &Snapshot) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn load(&self, _key: &SnapshotKey) -> Result<Option<Snapshot>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn unavailable_store_aborts_before_fetching() {
    let fetcher = Arc::new(small_site());
    let runner = use_case(fetcher.clone(), Arc::new(DownStore));

    let err = runner.run_once(today()).await.unwrap_err();

    assert!(matches!(err, ScraperError::Store(StoreError::Unavailable(_))));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("snapshots.db");
    let key = SnapshotKey::for_date(today());

    {
        let store = Arc::new(SqliteSnapshotStore::open(&path).unwrap());
        use_case(Arc::new(small_site()), store)
            .run_once(today())
            .await
            .unwrap();
    }

    let reopened = SqliteSnapshotStore::open(&path).unwrap();
    assert!(reopened.exists(&key).await.unwrap());
    let loaded = reopened.load(&key).await.unwrap().unwrap();
    assert_eq!(loaded.venues[0].items[0].title, "Dune");
}
