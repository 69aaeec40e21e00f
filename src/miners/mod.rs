//! Miner records and derived metrics

pub mod metrics;
pub mod types;

pub use metrics::{aggregate, derive_record, derive_records, format_immune_period, usd_factor};
pub use types::{Aggregates, MinerRecord, Prices};
