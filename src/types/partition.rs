//! Partition key and the data loaded for one partition

use serde::{Deserialize, Serialize};

use super::{Listing, PriceChangeEvent};

/// Selects a region and, optionally, a single location inside it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl PartitionKey {
    /// Every location in a region
    pub fn region(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            location: None,
        }
    }

    /// A single location in a region
    pub fn location(region: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            location: Some(location.into()),
        }
    }

    /// Whether a listing at `location` belongs to this partition
    pub fn matches(&self, location: &str) -> bool {
        match &self.location {
            None => true,
            Some(wanted) => wanted == location,
        }
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}/{}", self.region, location),
            None => write!(f, "{}/*", self.region),
        }
    }
}

/// Everything the replay needs for one partition
///
/// `listings` must be sorted ascending by `first_seen` and `changes` by
/// `effective_date`. The registry relies on this and does not re-sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionData {
    pub listings: Vec<Listing>,
    pub changes: Vec<PriceChangeEvent>,
}

impl PartitionData {
    pub fn new(listings: Vec<Listing>, changes: Vec<PriceChangeEvent>) -> Self {
        Self { listings, changes }
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
