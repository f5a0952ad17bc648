//! Raw store rows
//!
//! These are the on-disk shapes of the region files. Timestamps are unix
//! seconds; the store converts them to calendar days when loading a partition.

use serde::{Deserialize, Serialize};

use super::{Listing, PriceChangeEvent};
use crate::utils::unix_to_date;

/// One row of `<region>_data.jsonl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub aid: String,
    #[serde(default)]
    pub location: String,
    pub price: i64,
    /// First time the listing was seen
    pub nts: i64,
    /// Last time the listing was seen
    pub uts: i64,
}

impl ListingRecord {
    /// Convert to a replay listing, `None` if a timestamp is out of range
    pub fn to_listing(&self) -> Option<Listing> {
        Some(Listing::new(
            self.aid.clone(),
            self.price,
            unix_to_date(self.nts)?,
            unix_to_date(self.uts)?,
        ))
    }

    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// One row of `<region>_change.jsonl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub aid: String,
    pub old_price: i64,
    pub new_price: i64,
    pub ts: i64,
}

impl ChangeRecord {
    pub fn to_event(&self) -> Option<PriceChangeEvent> {
        Some(PriceChangeEvent::new(
            self.aid.clone(),
            self.old_price,
            self.new_price,
            unix_to_date(self.ts)?,
        ))
    }

    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
