//! Listing History
//!
//! Reconstructs day-by-day price statistics for real-estate listings from
//! their observed lifetimes and price-change events.
//!
//! # Features
//!
//! - **Day Replay**: every calendar day of a partition's observed window gets
//!   exactly one record, with no gaps
//! - **Exact Arithmetic**: truncating integer mean and median
//! - **Region Files**: JSONL storage per region with location filtering
//! - **Parallel Partitions**: independent partitions replayed with rayon
//! - **CSV In/Out**: import snapshot rows, export daily series
//!
//! # Modules
//!
//! - `types`: Core data structures (Listing, PriceChangeEvent, DailyStatistic)
//! - `event_store`: Region files, partition loading, CSV import/export
//! - `replay`: Listing registry, day replay engine, statistic reducer
//! - `utils`: Calendar-day conversions and atomic writes
//!
//! # Example
//!
//! ```no_run
//! use listing_history::{compute_daily_statistics, EventStore, PartitionKey};
//!
//! let store = EventStore::new();
//! let key = PartitionKey::location("meilong", "garden");
//! let series = compute_daily_statistics(&store, &key).unwrap();
//! for day in &series {
//!     println!("{}", day.csv_line());
//! }
//! ```

pub mod event_store;
pub mod replay;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use event_store::{EventStore, EventStoreConfig, EventStoreError, PartitionSource};
pub use replay::{
    compute, compute_daily_statistics, compute_partitions, DayReplay, LedgerError, LedgerResult,
    ListingRegistry, ReplayError, ReplayResult,
};
pub use types::{
    ChangeRecord, DailySeries, DailyStatistic, Listing, ListingRecord, PartitionData,
    PartitionKey, PriceChangeEvent,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
