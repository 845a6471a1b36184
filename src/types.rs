use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::URL_NOT_AVAILABLE;

/// A showing at a venue, as extracted from one day view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Option<String>,
    pub title: String,
    pub director: String,
    pub cast: Vec<String>,
    pub synopsis: String,
    /// `YYYY-MM-DD` -> hour labels. Days without showtimes are absent, never empty.
    pub time_slots_by_date: BTreeMap<String, Vec<String>>,
}

impl Item {
    /// Fold another day's entry for the same showing into this one.
    pub fn absorb(&mut self, other: Item) {
        for (date, times) in other.time_slots_by_date {
            let slot = self.time_slots_by_date.entry(date).or_default();
            for time in times {
                if !slot.contains(&time) {
                    slot.push(time);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Option<String>,
    pub name: String,
    pub address: String,
    pub screen_count: String,
    pub url: String,
    pub items: Vec<Item>,
}

impl Venue {
    /// The venue page URL, or `None` when the listing card carried no identifier.
    pub fn resolvable_url(&self) -> Option<&str> {
        if self.url == URL_NOT_AVAILABLE || self.url.is_empty() {
            None
        } else {
            Some(&self.url)
        }
    }
}

/// Calendar-day key in `YYYYMMDD` form. Doubles as document id and partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotKey(String);

impl SnapshotKey {
    pub fn for_date(date: NaiveDate) -> Self {
        Self(date.format("%Y%m%d").to_string())
    }

    /// Accepts only eight ASCII digits forming a real calendar date.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(raw, "%Y%m%d")
            .ok()
            .map(|_| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The full catalog for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub key: SnapshotKey,
    pub venues: Vec<Venue>,
}

impl Snapshot {
    pub fn item_count(&self) -> usize {
        self.venues.iter().map(|v| v.items.len()).sum()
    }

    pub fn into_document(self) -> SnapshotDocument {
        SnapshotDocument {
            id: self.key.clone(),
            date: self.key,
            data: self.venues,
        }
    }
}

/// Stored shape: `{ id, date, data }` with `id == date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub id: SnapshotKey,
    pub date: SnapshotKey,
    pub data: Vec<Venue>,
}

impl From<SnapshotDocument> for Snapshot {
    fn from(doc: SnapshotDocument) -> Self {
        Snapshot {
            key: doc.id,
            venues: doc.data,
        }
    }
}

/// How repeated sightings of the same showing across day views are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPolicy {
    /// One entry per (day, card), in day order.
    #[default]
    PerDay,
    /// One entry per showing id; time slots from every day are unioned.
    MergeById,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, date: &str, times: &[&str]) -> Item {
        let mut slots = BTreeMap::new();
        slots.insert(date.to_string(), times.iter().map(|t| t.to_string()).collect());
        Item {
            id: Some(id.into()),
            title: "Title".into(),
            director: "Director".into(),
            cast: vec![],
            synopsis: "Synopsis".into(),
            time_slots_by_date: slots,
        }
    }

    #[test]
    fn key_is_fixed_width_date() {
        let key = SnapshotKey::for_date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(key.as_str(), "20240105");
        assert_eq!(SnapshotKey::parse("20240105"), Some(key));
        assert_eq!(SnapshotKey::parse("2024015"), None);
        assert_eq!(SnapshotKey::parse("20241350"), None);
    }

    #[test]
    fn document_uses_stored_field_names() {
        let snapshot = Snapshot {
            key: SnapshotKey::parse("20240101").unwrap(),
            venues: vec![Venue {
                id: Some("42".into()),
                name: "Cine".into(),
                address: "Calle 1".into(),
                screen_count: "8 salas".into(),
                url: "https://example.test/cine/42/".into(),
                items: vec![item("7", "2024-01-01", &["18:00"])],
            }],
        };
        let value = serde_json::to_value(snapshot.into_document()).unwrap();
        assert_eq!(value["id"], json!("20240101"));
        assert_eq!(value["date"], json!("20240101"));
        assert_eq!(value["data"][0]["screenCount"], json!("8 salas"));
        assert_eq!(
            value["data"][0]["items"][0]["timeSlotsByDate"]["2024-01-01"],
            json!(["18:00"])
        );
    }

    #[test]
    fn absorb_unions_dates_without_duplicating_times() {
        let mut first = item("7", "2024-01-01", &["18:00", "20:00"]);
        first.absorb(item("7", "2024-01-01", &["20:00", "22:30"]));
        first.absorb(item("7", "2024-01-02", &["17:00"]));
        assert_eq!(first.time_slots_by_date["2024-01-01"], vec!["18:00", "20:00", "22:30"]);
        assert_eq!(first.time_slots_by_date["2024-01-02"], vec!["17:00"]);
    }

    #[test]
    fn sentinel_url_is_not_resolvable() {
        let venue = Venue {
            id: None,
            name: "Cine".into(),
            address: "Calle 1".into(),
            screen_count: "1".into(),
            url: URL_NOT_AVAILABLE.into(),
            items: vec![],
        };
        assert_eq!(venue.resolvable_url(), None);
    }
}
