pub mod harvest_use_case;
pub mod ports;

pub use harvest_use_case::{HarvestUseCase, RunOutcome, RunSummary};
