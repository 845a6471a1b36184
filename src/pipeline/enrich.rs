//! Per-venue day crawl.
//!
//! Venues are fanned out over a bounded worker pool; each venue's own day loop
//! stays sequential. Results are re-sorted by listing index so the snapshot
//! order never depends on completion order.

use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::app::ports::{FetchTimeouts, PageFetcher};
use crate::constants::DAY_FRAGMENT_KEY;
use crate::metrics::{self, PageRole};
use crate::parser::parse_day_page;
use crate::types::{Item, ItemPolicy, Venue};

#[derive(Clone, Debug)]
pub struct EnrichmentSettings {
    pub days: u32,
    pub concurrency: usize,
    pub policy: ItemPolicy,
    pub timeouts: FetchTimeouts,
}

pub struct EnrichmentWalker {
    fetcher: Arc<dyn PageFetcher>,
    settings: EnrichmentSettings,
}

impl EnrichmentWalker {
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: EnrichmentSettings) -> Self {
        Self { fetcher, settings }
    }

    #[instrument(skip(self, venues), fields(venues = venues.len(), days = self.settings.days))]
    pub async fn enrich(&self, venues: Vec<Venue>, today: NaiveDate) -> Vec<Venue> {
        let permits = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut slots: Vec<Option<Venue>> = Vec::with_capacity(venues.len());
        // Stubs are kept so a panicked task still leaves its venue in the snapshot
        let stubs: Vec<Venue> = venues.clone();

        for (index, venue) in venues.into_iter().enumerate() {
            slots.push(None);
            if venue.resolvable_url().is_none() {
                debug!(venue = %venue.name, "no venue url; skipping enrichment");
                slots[index] = Some(venue);
                continue;
            }

            let fetcher = Arc::clone(&self.fetcher);
            let permits = Arc::clone(&permits);
            let settings = self.settings.clone();
            tasks.spawn(async move {
                // The semaphore is never closed while tasks run
                let _permit = permits.acquire_owned().await.ok();
                let venue = enrich_venue(fetcher.as_ref(), venue, today, &settings).await;
                (index, venue)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, venue)) => slots[index] = Some(venue),
                Err(e) => error!("enrichment task failed: {}", e),
            }
        }

        let enriched: Vec<Venue> = slots
            .into_iter()
            .zip(stubs)
            .map(|(slot, stub)| slot.unwrap_or(stub))
            .collect();
        info!(
            "Enriched {} venue(s) with {} item entries",
            enriched.len(),
            enriched.iter().map(|v| v.items.len()).sum::<usize>()
        );
        enriched
    }
}

/// Crawl days `0..days` for one venue in ascending order. Failed days are skipped.
pub async fn enrich_venue(
    fetcher: &dyn PageFetcher,
    mut venue: Venue,
    today: NaiveDate,
    settings: &EnrichmentSettings,
) -> Venue {
    let Some(base) = venue.resolvable_url().map(str::to_string) else {
        return venue;
    };

    for offset in 0..settings.days {
        let date = today + Duration::days(i64::from(offset));
        let url = day_url(&base, date);
        match fetcher.fetch(&url, settings.timeouts).await {
            Ok(page) => {
                metrics::page_fetched(PageRole::Day);
                let items = parse_day_page(page.text(), date);
                debug!(venue = %venue.name, %date, items = items.len(), "day view parsed");
                add_items(&mut venue.items, items, settings.policy);
            }
            Err(e) => {
                metrics::fetch_failed(PageRole::Day, e.kind());
                metrics::day_skipped();
                warn!(venue = %venue.name, %date, "skipping day: {}", e);
            }
        }
    }
    venue
}

pub fn day_url(venue_url: &str, date: NaiveDate) -> String {
    format!("{venue_url}#{DAY_FRAGMENT_KEY}={}", date.format("%Y-%m-%d"))
}

fn add_items(existing: &mut Vec<Item>, incoming: Vec<Item>, policy: ItemPolicy) {
    match policy {
        ItemPolicy::PerDay => existing.extend(incoming),
        ItemPolicy::MergeById => {
            for item in incoming {
                let same = item
                    .id
                    .as_ref()
                    .and_then(|id| existing.iter().position(|e| e.id.as_ref() == Some(id)));
                match same {
                    Some(index) => existing[index].absorb(item),
                    None => existing.push(item),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(id: Option<&str>, date: &str) -> Item {
        let mut slots = BTreeMap::new();
        slots.insert(date.to_string(), vec!["18:00".to_string()]);
        Item {
            id: id.map(str::to_string),
            title: "T".into(),
            director: "D".into(),
            cast: vec![],
            synopsis: "S".into(),
            time_slots_by_date: slots,
        }
    }

    #[test]
    fn day_url_uses_iso_date_fragment() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            day_url("https://h/cines/cine/42/", date),
            "https://h/cines/cine/42/#shwt_date=2024-03-09"
        );
    }

    #[test]
    fn per_day_policy_duplicates_entries() {
        let mut items = vec![item(Some("1"), "2024-01-01")];
        add_items(&mut items, vec![item(Some("1"), "2024-01-02")], ItemPolicy::PerDay);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].time_slots_by_date.keys().collect::<Vec<_>>(), vec!["2024-01-02"]);
    }

    #[test]
    fn merge_policy_unions_dates_by_id() {
        let mut items = vec![item(Some("1"), "2024-01-01")];
        add_items(
            &mut items,
            vec![item(Some("1"), "2024-01-02"), item(Some("2"), "2024-01-02")],
            ItemPolicy::MergeById,
        );
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].time_slots_by_date.keys().collect::<Vec<_>>(),
            vec!["2024-01-01", "2024-01-02"]
        );
    }

    #[test]
    fn merge_policy_never_merges_items_without_id() {
        let mut items = vec![item(None, "2024-01-01")];
        add_items(&mut items, vec![item(None, "2024-01-02")], ItemPolicy::MergeById);
        assert_eq!(items.len(), 2);
    }
}
