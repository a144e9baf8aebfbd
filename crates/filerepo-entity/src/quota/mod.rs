//! Quota value objects computed per admission check.

pub mod snapshot;

pub use filerepo_core::error::QuotaKind;
pub use snapshot::{AggregateStats, QuotaSnapshot};
