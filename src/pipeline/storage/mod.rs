// Snapshot persistence backends

pub mod in_memory;
pub mod sqlite;

pub use crate::app::ports::SnapshotStore;
pub use in_memory::InMemorySnapshotStore;
pub use sqlite::SqliteSnapshotStore;
