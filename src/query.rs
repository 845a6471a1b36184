//! Read-only filters over one loaded snapshot. All name and title matching
//! is case-insensitive.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{Item, Snapshot, Venue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueShowtimes {
    pub venue: String,
    pub address: String,
    pub title: String,
    pub time_slots_by_date: BTreeMap<String, Vec<String>>,
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

pub fn list_venues(snapshot: &Snapshot) -> &[Venue] {
    &snapshot.venues
}

/// Items for the venue with `venue_id`, or `None` when no such venue exists.
pub fn items_for_venue<'a>(snapshot: &'a Snapshot, venue_id: &str) -> Option<&'a [Item]> {
    snapshot
        .venues
        .iter()
        .find(|v| v.id.as_deref().is_some_and(|id| same_text(id, venue_id)))
        .map(|v| v.items.as_slice())
}

/// Time slots of `title` at the venue named `venue_name`. Per-day entries of
/// the same title are unioned into one map.
pub fn showtimes_for(snapshot: &Snapshot, venue_name: &str, title: &str) -> Option<VenueShowtimes> {
    let venue = snapshot.venues.iter().find(|v| same_text(&v.name, venue_name))?;
    collect_showtimes(venue, title)
}

/// Every venue that shows `title`, in snapshot order.
pub fn venues_showing(snapshot: &Snapshot, title: &str) -> Vec<VenueShowtimes> {
    snapshot
        .venues
        .iter()
        .filter_map(|venue| collect_showtimes(venue, title))
        .collect()
}

fn collect_showtimes(venue: &Venue, title: &str) -> Option<VenueShowtimes> {
    let mut matches = venue.items.iter().filter(|item| same_text(&item.title, title));
    let first = matches.next()?;

    let mut merged = first.clone();
    for item in matches {
        merged.absorb(item.clone());
    }

    Some(VenueShowtimes {
        venue: venue.name.clone(),
        address: venue.address.clone(),
        title: first.title.clone(),
        time_slots_by_date: merged.time_slots_by_date,
    })
}
