use chrono::NaiveDate;

use crate::types::{Snapshot, SnapshotKey, Venue};

/// Wrap the harvested venues, in listing order, with the day's key.
pub fn assemble(venues: Vec<Venue>, today: NaiveDate) -> Snapshot {
    Snapshot {
        key: SnapshotKey::for_date(today),
        venues,
    }
}
