use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

use super::{clean_text, first_text, selector};
use crate::constants::{DIRECTOR_NOT_AVAILABLE, SYNOPSIS_NOT_AVAILABLE, TITLE_NOT_AVAILABLE};
use crate::types::Item;

static ITEM_CARD: Lazy<Selector> = Lazy::new(|| selector("div.card.entity-card.movie-card-theater"));
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| selector("a.meta-title-link"));
static DIRECTION: Lazy<Selector> = Lazy::new(|| selector("div.meta-body-direction"));
static ACTORS: Lazy<Selector> = Lazy::new(|| selector("div.meta-body-actor"));
static PERSON: Lazy<Selector> = Lazy::new(|| selector("span.dark-grey-link"));
static SYNOPSIS: Lazy<Selector> = Lazy::new(|| selector("div.synopsis"));
static SYNOPSIS_TEXT: Lazy<Selector> = Lazy::new(|| selector("div.content-txt"));
static SHOWTIMES: Lazy<Selector> = Lazy::new(|| selector("div.showtimes-anchor"));
static HOUR_BLOCK: Lazy<Selector> = Lazy::new(|| selector("div.showtimes-hour-block"));
static HOUR_VALUE: Lazy<Selector> = Lazy::new(|| selector("span.showtimes-hour-item-value"));

/// Parse one venue day view. Each card becomes an [`Item`] whose time-slot
/// map holds at most the single key `date` (`YYYY-MM-DD`).
pub fn parse_day_page(html: &str, date: NaiveDate) -> Vec<Item> {
    let document = Html::parse_document(html);
    let date_key = date.format("%Y-%m-%d").to_string();

    document
        .select(&ITEM_CARD)
        .map(|card| parse_item_card(card, &date_key))
        .collect()
}

fn parse_item_card(card: ElementRef<'_>, date_key: &str) -> Item {
    let title_link = card.select(&TITLE_LINK).next();
    let id = title_link
        .and_then(|a| a.value().attr("href"))
        .and_then(item_id_from_href);
    let title = title_link
        .map(clean_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| TITLE_NOT_AVAILABLE.to_string());

    let director = card
        .select(&DIRECTION)
        .next()
        .and_then(|block| first_text(block, &PERSON))
        .unwrap_or_else(|| DIRECTOR_NOT_AVAILABLE.to_string());

    let cast = card
        .select(&ACTORS)
        .next()
        .map(|block| {
            block
                .select(&PERSON)
                .map(clean_text)
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let synopsis = card
        .select(&SYNOPSIS)
        .next()
        .and_then(|block| first_text(block, &SYNOPSIS_TEXT))
        .unwrap_or_else(|| SYNOPSIS_NOT_AVAILABLE.to_string());

    let times: Vec<String> = card
        .select(&SHOWTIMES)
        .next()
        .map(|anchor| {
            anchor
                .select(&HOUR_BLOCK)
                .filter_map(|block| first_text(block, &HOUR_VALUE))
                .collect()
        })
        .unwrap_or_default();

    let mut time_slots_by_date = BTreeMap::new();
    if !times.is_empty() {
        time_slots_by_date.insert(date_key.to_string(), times);
    }

    Item {
        id,
        title,
        director,
        cast,
        synopsis,
        time_slots_by_date,
    }
}

/// `/peliculas/pelicula-232669/` -> `232669`. The id is the text after the last
/// `-` of the trailing path segment, or the whole segment when it has no `-`.
pub fn item_id_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let id = segment.rsplit('-').next().unwrap_or(segment);
    (!id.is_empty()).then(|| id.to_string())
}
