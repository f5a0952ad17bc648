//! Utility functions and helpers
//!
//! Calendar-day conversions and atomic file output.

pub mod atomic;
pub mod time;

pub use atomic::atomic_write_with;
pub use time::{date_to_unix, inclusive_days, parse_timestamp, unix_to_date};
