//! Data types for listing history
//!
//! This module contains the core data structures shared by the store and the
//! replay engine.

mod daily;
mod listing;
mod partition;
mod price_change;
mod record;

pub use daily::{DailySeries, DailyStatistic};
pub use listing::Listing;
pub use partition::{PartitionData, PartitionKey};
pub use price_change::PriceChangeEvent;
pub use record::{ChangeRecord, ListingRecord};
