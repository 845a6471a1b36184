use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use super::attrs::parse_id_attr;
use super::{clean_text, first_text, selector};
use crate::constants::{
    ADDRESS_NOT_AVAILABLE, NAME_NOT_AVAILABLE, SCREENS_NOT_AVAILABLE, URL_NOT_AVAILABLE,
};
use crate::types::Venue;

static VENUE_CARD: Lazy<Selector> = Lazy::new(|| selector("div.theater-card"));
static NAME: Lazy<Selector> = Lazy::new(|| selector("h3.title"));
static ADDRESS: Lazy<Selector> = Lazy::new(|| selector("address.address"));
static SCREENS: Lazy<Selector> = Lazy::new(|| selector("div.screen-number"));
static ID_ANCHOR: Lazy<Selector> = Lazy::new(|| selector("span.add-theater-anchor"));
static PAGINATION: Lazy<Selector> = Lazy::new(|| selector("div.pagination-item-holder"));
static PAGE_BUTTON: Lazy<Selector> = Lazy::new(|| selector("a.button"));

/// One parsed listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Label of the last pagination button, when the control is present and numeric.
    pub total_pages: Option<u32>,
    /// True when the pagination control exists, even if its label was unreadable.
    pub has_pagination: bool,
    pub venues: Vec<Venue>,
}

/// Parse a venue-listing page. `venue_url_base` is joined with the card id,
/// e.g. `https://host/cines/cine/` + `42` -> `https://host/cines/cine/42/`.
pub fn parse_listing(html: &str, venue_url_base: &str) -> ListingPage {
    let document = Html::parse_document(html);

    let pagination = document.select(&PAGINATION).next();
    let total_pages = pagination.and_then(|holder| {
        let label = holder.select(&PAGE_BUTTON).last().map(clean_text)?;
        label.parse::<u32>().ok().filter(|n| *n >= 1)
    });

    let venues: Vec<Venue> = document
        .select(&VENUE_CARD)
        .map(|card| {
            let name = first_text(card, &NAME).unwrap_or_else(|| {
                debug!("venue card without name");
                NAME_NOT_AVAILABLE.to_string()
            });
            let address =
                first_text(card, &ADDRESS).unwrap_or_else(|| ADDRESS_NOT_AVAILABLE.to_string());
            let screen_count =
                first_text(card, &SCREENS).unwrap_or_else(|| SCREENS_NOT_AVAILABLE.to_string());

            let id = card
                .select(&ID_ANCHOR)
                .filter_map(|span| span.value().attr("data-theater"))
                .find_map(parse_id_attr);
            let url = match &id {
                Some(id) => venue_url(venue_url_base, id),
                None => {
                    debug!(venue = %name, "venue card without identifier; enrichment will be skipped");
                    URL_NOT_AVAILABLE.to_string()
                }
            };

            Venue {
                id,
                name,
                address,
                screen_count,
                url,
                items: Vec::new(),
            }
        })
        .collect();

    ListingPage {
        total_pages,
        has_pagination: pagination.is_some(),
        venues,
    }
}

pub fn venue_url(venue_url_base: &str, id: &str) -> String {
    format!("{}/{}/", venue_url_base.trim_end_matches('/'), id)
}
