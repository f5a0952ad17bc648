//! Event Store Module
//!
//! File-backed storage for listing snapshots and price changes, and the
//! adapter that turns them into replayable partitions:
//! - `EventStore`: per-region JSONL files, partition loading, appends
//! - `PartitionSource`: the seam the replay engine loads partitions through
//! - `import`: CSV rows into region files
//! - `export`: daily series out as CSV
//!
//! # Layout
//!
//! ```text
//! data/
//! ├── meilong_data.jsonl     one ListingRecord per line
//! ├── meilong_change.jsonl   one ChangeRecord per line
//! └── ...
//! ```

pub mod export;
pub mod import;
mod source;
mod store;

pub use source::PartitionSource;
pub use store::{
    parse_min_change_price, resolve_data_dir, EventStore, EventStoreConfig, EventStoreError,
    EventStoreResult, DEFAULT_MIN_CHANGE_OLD_PRICE,
};
