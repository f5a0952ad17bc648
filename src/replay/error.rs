//! Replay errors
//!
//! All of these point at inconsistent data in the event store. None are
//! transient, so nothing here is retried.

use chrono::NaiveDate;

use crate::types::PriceChangeEvent;

/// Result type for registry and replay operations
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Errors that abort the replay of a partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// A price change arrived for a listing that is not on the market
    OrphanPriceChange { event: PriceChangeEvent },
    /// No listing was active on a day inside the observed window
    EmptyActiveSet { date: NaiveDate },
    /// The same listing id appeared twice in one partition
    DuplicateListing { id: String },
    /// A listing was last seen before it was first seen
    InvalidWindow {
        id: String,
        first_seen: NaiveDate,
        last_seen: NaiveDate,
    },
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::OrphanPriceChange { event } => {
                write!(f, "Price change for inactive listing: {}", event)
            }
            ReplayError::EmptyActiveSet { date } => {
                write!(f, "No active listings on {}", date)
            }
            ReplayError::DuplicateListing { id } => {
                write!(f, "Duplicate listing id: {}", id)
            }
            ReplayError::InvalidWindow {
                id,
                first_seen,
                last_seen,
            } => write!(
                f,
                "Listing {} last seen ({}) before first seen ({})",
                id, last_seen, first_seen
            ),
        }
    }
}

impl std::error::Error for ReplayError {}
