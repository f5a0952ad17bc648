//! Partition sources
//!
//! Anything that can hand the replay engine a partition's sorted listing and
//! price change streams.

use std::collections::HashMap;

use crate::types::{PartitionData, PartitionKey};

use super::store::EventStoreResult;

/// Supplies the data of one partition
///
/// Implementations must return listings sorted ascending by `first_seen` and
/// changes sorted ascending by `effective_date`, and must resolve the
/// location filter of the key themselves.
pub trait PartitionSource {
    fn load_partition(&self, key: &PartitionKey) -> EventStoreResult<PartitionData>;
}

/// Pre-materialized partitions; unknown keys are empty
impl PartitionSource for HashMap<PartitionKey, PartitionData> {
    fn load_partition(&self, key: &PartitionKey) -> EventStoreResult<PartitionData> {
        Ok(self.get(key).cloned().unwrap_or_default())
    }
}
