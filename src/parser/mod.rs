//! HTML extraction for the two page roles the harvester walks.
//!
//! Every extractor is tolerant: a missing optional field becomes a placeholder
//! and a page without the card root yields an empty result rather than an error.

pub mod attrs;
pub mod listing;
pub mod showtimes;

use scraper::{ElementRef, Selector};

pub use listing::{parse_listing, ListingPage};
pub use showtimes::parse_day_page;

/// Compile a selector held in a `Lazy` static. Inputs are string literals.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

/// Element text with runs of whitespace collapsed to single spaces.
pub(crate) fn clean_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First match of `sel` under `root`, as cleaned text. Empty text counts as absent.
pub(crate) fn first_text(root: ElementRef<'_>, sel: &Selector) -> Option<String> {
    root.select(sel)
        .next()
        .map(clean_text)
        .filter(|t| !t.is_empty())
}
