use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use super::enrich::{EnrichmentSettings, EnrichmentWalker};
use super::pagination::PaginationWalker;
use super::snapshot::assemble;
use crate::app::ports::{FetchTimeouts, PageFetcher};
use crate::config::Config;
use crate::error::ExtractionError;
use crate::metrics;
use crate::types::Snapshot;

/// Listing walk, then enrichment, then assembly. No store access.
pub struct Harvester {
    listing: PaginationWalker,
    enrichment: EnrichmentWalker,
}

impl Harvester {
    pub fn new(listing: PaginationWalker, enrichment: EnrichmentWalker) -> Self {
        Self {
            listing,
            enrichment,
        }
    }

    pub fn from_config(fetcher: Arc<dyn PageFetcher>, config: &Config) -> Self {
        let timeouts = FetchTimeouts {
            connect: config.source.connect_timeout(),
            read: config.source.read_timeout(),
        };
        let listing = PaginationWalker::new(
            Arc::clone(&fetcher),
            config.source.base_url.clone(),
            config.source.venue_url_base.clone(),
            timeouts,
        );
        let enrichment = EnrichmentWalker::new(
            fetcher,
            EnrichmentSettings {
                days: config.enrichment.days,
                concurrency: config.enrichment.concurrency,
                policy: config.enrichment.item_policy,
                timeouts,
            },
        );
        Self::new(listing, enrichment)
    }

    #[instrument(skip(self))]
    pub async fn harvest(&self, today: NaiveDate) -> Result<Snapshot, ExtractionError> {
        let started = Instant::now();
        let stubs = self.listing.walk().await?;
        let venues = self.enrichment.enrich(stubs, today).await;
        let snapshot = assemble(venues, today);

        let items = snapshot.item_count();
        let elapsed = started.elapsed().as_secs_f64();
        metrics::harvest_finished(snapshot.venues.len(), items, elapsed);
        info!(
            key = %snapshot.key,
            "Harvested {} venue(s), {} item entries in {:.1}s",
            snapshot.venues.len(),
            items,
            elapsed
        );
        Ok(snapshot)
    }
}
