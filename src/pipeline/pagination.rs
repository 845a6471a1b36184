use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{FetchTimeouts, PageFetcher};
use crate::error::ExtractionError;
use crate::metrics::{self, PageRole};
use crate::parser::parse_listing;
use crate::types::Venue;

/// Walks every listing page in order and collects venue stubs (no items yet).
pub struct PaginationWalker {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    venue_url_base: String,
    timeouts: FetchTimeouts,
}

impl PaginationWalker {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        base_url: impl Into<String>,
        venue_url_base: impl Into<String>,
        timeouts: FetchTimeouts,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            venue_url_base: venue_url_base.into(),
            timeouts,
        }
    }

    /// The first page is fetched once, used both to read the page count and as
    /// page 1's cards, so a listing with N pages costs exactly N fetches.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn walk(&self) -> Result<Vec<Venue>, ExtractionError> {
        let first = self.fetch_listing(1, &self.base_url).await?;
        let first = parse_listing(&first, &self.venue_url_base);

        if first.venues.is_empty() {
            return Err(ExtractionError::CardMissingAnchor { page: 1 });
        }

        let total = match (first.has_pagination, first.total_pages) {
            (false, _) => 1,
            (true, Some(n)) => n,
            (true, None) => {
                warn!("pagination control present but last label is not a page number; walking page 1 only");
                1
            }
        };
        info!("Listing has {} page(s)", total);

        let mut venues = first.venues;
        for page in 2..=total {
            let url = page_url(&self.base_url, page);
            let body = self.fetch_listing(page, &url).await?;
            let parsed = parse_listing(&body, &self.venue_url_base);
            debug!(page, cards = parsed.venues.len(), "listing page parsed");
            venues.extend(parsed.venues);
        }

        info!("Collected {} venue(s) from {} listing page(s)", venues.len(), total);
        Ok(venues)
    }

    async fn fetch_listing(&self, page: u32, url: &str) -> Result<String, ExtractionError> {
        match self.fetcher.fetch(url, self.timeouts).await {
            Ok(raw) => {
                metrics::page_fetched(PageRole::Listing);
                Ok(raw.body)
            }
            Err(source) => {
                metrics::fetch_failed(PageRole::Listing, source.kind());
                Err(ExtractionError::PageFetchFailed { page, source })
            }
        }
    }
}

/// `{base}?page={n}`, or `&page=` when the base already carries a query.
/// Never called with 1: page 1 is fetched from the bare base URL.
pub fn page_url(base_url: &str, page: u32) -> String {
    let sep = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{sep}page={page}")
}
