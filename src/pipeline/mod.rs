// Harvesting pipeline: listing walk, per-venue enrichment, assembly, storage

pub mod enrich;
pub mod export;
pub mod harvest;
pub mod pagination;
pub mod snapshot;
pub mod storage;

pub use harvest::Harvester;
