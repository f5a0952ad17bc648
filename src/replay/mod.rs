//! Daily price reconstruction
//!
//! Replays a partition's listings and price changes one calendar day at a
//! time and reduces the active prices of each day into a `DailyStatistic`.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ PartitionSource  │───►│ ListingRegistry  │───►│ DayReplay   │───►│ DailySeries │
//! │ (sorted streams) │    │ baseline + queues│    │ day by day  │    │ one per day │
//! └──────────────────┘    └──────────────────┘    └─────────────┘    └─────────────┘
//! ```

mod engine;
mod error;
mod reducer;
mod registry;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::event_store::{EventStoreError, PartitionSource};
use crate::types::{DailySeries, PartitionData, PartitionKey};
use crate::utils::inclusive_days;

pub use engine::DayReplay;
pub use error::{ReplayError, ReplayResult};
pub use reducer::reduce;
pub use registry::ListingRegistry;

/// Result type for loading and replaying a partition
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors from computing a partition's daily statistics
#[derive(Debug)]
pub enum LedgerError {
    Store(EventStoreError),
    Replay(ReplayError),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Store(e) => write!(f, "Store error: {}", e),
            LedgerError::Replay(e) => write!(f, "Replay error: {}", e),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::Store(e) => Some(e),
            LedgerError::Replay(e) => Some(e),
        }
    }
}

impl From<EventStoreError> for LedgerError {
    fn from(e: EventStoreError) -> Self {
        LedgerError::Store(e)
    }
}

impl From<ReplayError> for LedgerError {
    fn from(e: ReplayError) -> Self {
        LedgerError::Replay(e)
    }
}

/// Replay already-loaded partition data
///
/// An empty partition yields an empty series.
pub fn compute(partition: PartitionData) -> ReplayResult<DailySeries> {
    let registry = ListingRegistry::build(partition)?;
    let Some((first, last)) = registry.window() else {
        debug!("Empty partition, nothing to replay");
        return Ok(DailySeries::default());
    };

    let days = DayReplay::new(registry).collect::<ReplayResult<Vec<_>>>()?;
    debug_assert_eq!(days.len() as i64, inclusive_days(first, last));

    Ok(DailySeries::new(days))
}

/// Load one partition from `source` and compute its daily statistics
pub fn compute_daily_statistics<S>(source: &S, key: &PartitionKey) -> LedgerResult<DailySeries>
where
    S: PartitionSource + ?Sized,
{
    let partition = source.load_partition(key)?;
    let listing_count = partition.listings.len();
    let change_count = partition.changes.len();

    let series = compute(partition).map_err(|e| {
        warn!(partition = %key, error = %e, "Replay aborted");
        e
    })?;

    info!(
        partition = %key,
        listings = listing_count,
        changes = change_count,
        days = series.len(),
        "Computed daily statistics"
    );

    Ok(series)
}

/// Compute several partitions in parallel
///
/// Each partition is loaded and replayed independently; results come back
/// in the order of `keys`.
pub fn compute_partitions<S>(
    source: &S,
    keys: &[PartitionKey],
) -> Vec<(PartitionKey, LedgerResult<DailySeries>)>
where
    S: PartitionSource + Sync + ?Sized,
{
    keys.par_iter()
        .map(|key| (key.clone(), compute_daily_statistics(source, key)))
        .collect()
}
