//! Listing types for the replay engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A listing as observed over its lifetime on the market
///
/// `current_price` is the only field mutated during replay. The registry owns
/// exactly one `Listing` per id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(rename = "currentPrice")]
    pub current_price: i64,
    #[serde(rename = "firstSeen")]
    pub first_seen: NaiveDate,
    #[serde(rename = "lastSeen")]
    pub last_seen: NaiveDate,
}

impl Listing {
    /// Create a new listing
    pub fn new(id: impl Into<String>, current_price: i64, first_seen: NaiveDate, last_seen: NaiveDate) -> Self {
        Self {
            id: id.into(),
            current_price,
            first_seen,
            last_seen,
        }
    }
}
