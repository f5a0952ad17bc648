//! Price change events

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A price change for one listing, effective from a calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChangeEvent {
    #[serde(rename = "listingId")]
    pub listing_id: String,
    #[serde(rename = "oldPrice")]
    pub old_price: i64,
    #[serde(rename = "newPrice")]
    pub new_price: i64,
    #[serde(rename = "effectiveDate")]
    pub effective_date: NaiveDate,
}

impl PriceChangeEvent {
    pub fn new(
        listing_id: impl Into<String>,
        old_price: i64,
        new_price: i64,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            listing_id: listing_id.into(),
            old_price,
            new_price,
            effective_date,
        }
    }
}

impl std::fmt::Display for PriceChangeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} -> {} on {}",
            self.listing_id, self.old_price, self.new_price, self.effective_date
        )
    }
}
