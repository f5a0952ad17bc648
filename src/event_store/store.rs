//! Event Store - JSONL region files
//!
//! Each region keeps two append-only files under the data directory:
//! `<region>_data.jsonl` with one `ListingRecord` per line and
//! `<region>_change.jsonl` with one `ChangeRecord` per line. Loading a
//! partition filters, joins and sorts these into the streams the replay
//! engine consumes.

use std::collections::HashSet;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::types::{ChangeRecord, ListingRecord, PartitionData, PartitionKey};

use super::source::PartitionSource;

const DATA_SUFFIX: &str = "_data.jsonl";
const CHANGE_SUFFIX: &str = "_change.jsonl";

/// Default lower bound (exclusive) on `old_price` for a change to be replayed
pub const DEFAULT_MIN_CHANGE_OLD_PRICE: i64 = 2000;

/// Configuration for the EventStore
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// Path to the data directory
    pub data_dir: PathBuf,
    /// Changes with `old_price` at or below this are dropped when loading.
    /// `None` keeps every change.
    pub min_change_old_price: Option<i64>,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            min_change_old_price: Some(DEFAULT_MIN_CHANGE_OLD_PRICE),
        }
    }
}

impl EventStoreConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Build config from `LISTING_DATA_DIR` and `LISTING_MIN_CHANGE_PRICE`
    ///
    /// A relative data dir is resolved against the current directory.
    /// `LISTING_MIN_CHANGE_PRICE=none` disables the change filter.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("LISTING_DATA_DIR") {
            config.data_dir = resolve_data_dir(dir);
        }

        if let Ok(value) = env::var("LISTING_MIN_CHANGE_PRICE") {
            match parse_min_change_price(&value) {
                Some(min) => config.min_change_old_price = min,
                None => warn!(value = %value, "Ignoring invalid LISTING_MIN_CHANGE_PRICE"),
            }
        }

        config
    }

    /// Set the change filter threshold
    pub fn with_min_change_old_price(mut self, min: Option<i64>) -> Self {
        self.min_change_old_price = min;
        self
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to a region's listing file
    pub fn listings_path(&self, region: &str) -> PathBuf {
        self.data_dir.join(format!("{}{}", region, DATA_SUFFIX))
    }

    /// Path to a region's price change file
    pub fn changes_path(&self, region: &str) -> PathBuf {
        self.data_dir.join(format!("{}{}", region, CHANGE_SUFFIX))
    }
}

/// Resolve a data directory against the current directory if it is relative
pub fn resolve_data_dir<P: AsRef<Path>>(dir: P) -> PathBuf {
    let dir = dir.as_ref();
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(dir)
}

/// Parse a change-price threshold: an integer, or `none`/`off` for no filter
pub fn parse_min_change_price(value: &str) -> Option<Option<i64>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("off") {
        return Some(None);
    }
    value.parse::<i64>().ok().map(Some)
}

/// Result type for EventStore operations
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Errors that can occur in EventStore operations
#[derive(Debug)]
pub enum EventStoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    InvalidRegion(String),
    InvalidRecord(String),
}

impl std::fmt::Display for EventStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStoreError::Io(e) => write!(f, "IO error: {}", e),
            EventStoreError::Json(e) => write!(f, "JSON error: {}", e),
            EventStoreError::Csv(e) => write!(f, "CSV error: {}", e),
            EventStoreError::InvalidRegion(name) => write!(f, "Invalid region name: {:?}", name),
            EventStoreError::InvalidRecord(msg) => write!(f, "Invalid record: {}", msg),
        }
    }
}

impl std::error::Error for EventStoreError {}

impl From<std::io::Error> for EventStoreError {
    fn from(e: std::io::Error) -> Self {
        EventStoreError::Io(e)
    }
}

impl From<serde_json::Error> for EventStoreError {
    fn from(e: serde_json::Error) -> Self {
        EventStoreError::Json(e)
    }
}

impl From<csv::Error> for EventStoreError {
    fn from(e: csv::Error) -> Self {
        EventStoreError::Csv(e)
    }
}

/// File-backed store of listing snapshots and price changes
#[derive(Debug, Clone)]
pub struct EventStore {
    config: EventStoreConfig,
}

impl EventStore {
    /// Create a new EventStore with config from the environment
    pub fn new() -> Self {
        Self::with_config(EventStoreConfig::from_env())
    }

    /// Create a new EventStore with custom config
    pub fn with_config(config: EventStoreConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &EventStoreConfig {
        &self.config
    }

    /// Regions that have a listing file, sorted by name
    pub fn list_regions(&self) -> EventStoreResult<Vec<String>> {
        let dir = self.config.data_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut regions = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(region) = name.to_str().and_then(|n| n.strip_suffix(DATA_SUFFIX)) {
                if !region.is_empty() {
                    regions.push(region.to_string());
                }
            }
        }

        regions.sort();
        Ok(regions)
    }

    /// Load every listing row of a region, in file order
    pub fn load_listing_records(&self, region: &str) -> EventStoreResult<Vec<ListingRecord>> {
        validate_region(region)?;
        read_jsonl(&self.config.listings_path(region), ListingRecord::from_json_line)
    }

    /// Load every price change row of a region, in file order
    pub fn load_change_records(&self, region: &str) -> EventStoreResult<Vec<ChangeRecord>> {
        validate_region(region)?;
        read_jsonl(&self.config.changes_path(region), ChangeRecord::from_json_line)
    }

    /// Append listing rows to a region
    ///
    /// Rows are written in one batch and synced to disk.
    pub fn append_listings(&self, region: &str, records: &[ListingRecord]) -> EventStoreResult<usize> {
        validate_region(region)?;
        for record in records {
            if record.uts < record.nts {
                return Err(EventStoreError::InvalidRecord(format!(
                    "listing {} last seen before first seen",
                    record.aid
                )));
            }
        }
        append_jsonl(&self.config.listings_path(region), records, ListingRecord::to_json_line)
    }

    /// Append price change rows to a region
    pub fn append_changes(&self, region: &str, records: &[ChangeRecord]) -> EventStoreResult<usize> {
        validate_region(region)?;
        append_jsonl(&self.config.changes_path(region), records, ChangeRecord::to_json_line)
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionSource for EventStore {
    /// Listings are filtered by location and sorted by first-seen time.
    /// Changes are filtered by `min_change_old_price`, joined against the
    /// loaded listings, and sorted by effective time.
    fn load_partition(&self, key: &PartitionKey) -> EventStoreResult<PartitionData> {
        let mut listing_records: Vec<ListingRecord> = self
            .load_listing_records(&key.region)?
            .into_iter()
            .filter(|r| key.matches(&r.location))
            .collect();
        listing_records.sort_by_key(|r| r.nts);

        let mut listings = Vec::with_capacity(listing_records.len());
        let mut ids = HashSet::with_capacity(listing_records.len());
        for record in &listing_records {
            match record.to_listing() {
                Some(listing) => {
                    ids.insert(listing.id.clone());
                    listings.push(listing);
                }
                None => warn!(aid = %record.aid, "Skipping listing with out-of-range timestamp"),
            }
        }

        let min_old_price = self.config.min_change_old_price;
        let mut change_records: Vec<ChangeRecord> = self
            .load_change_records(&key.region)?
            .into_iter()
            .filter(|c| min_old_price.map_or(true, |min| c.old_price > min))
            .filter(|c| ids.contains(&c.aid))
            .collect();
        change_records.sort_by_key(|c| c.ts);

        let mut changes = Vec::with_capacity(change_records.len());
        for record in &change_records {
            match record.to_event() {
                Some(event) => changes.push(event),
                None => warn!(aid = %record.aid, "Skipping change with out-of-range timestamp"),
            }
        }

        debug!(
            partition = %key,
            listings = listings.len(),
            changes = changes.len(),
            "Loaded partition"
        );

        Ok(PartitionData::new(listings, changes))
    }
}

/// Region names become file name prefixes, so no separators or dot-dirs
fn validate_region(region: &str) -> EventStoreResult<()> {
    if region.is_empty()
        || region == "."
        || region == ".."
        || region.contains(['/', '\\'])
    {
        return Err(EventStoreError::InvalidRegion(region.to_string()));
    }
    Ok(())
}

/// Read a JSONL file; a missing file is empty, malformed lines are skipped
fn read_jsonl<T, F>(path: &Path, from_line: F) -> EventStoreResult<Vec<T>>
where
    F: Fn(&str) -> Result<T, serde_json::Error>,
{
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match from_line(&line) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = line_num + 1,
                    error = %e,
                    "Failed to parse row"
                );
            }
        }
    }

    Ok(rows)
}

fn append_jsonl<T, F>(path: &Path, rows: &[T], to_line: F) -> EventStoreResult<usize>
where
    F: Fn(&T) -> Result<String, serde_json::Error>,
{
    if rows.is_empty() {
        return Ok(0);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        writeln!(writer, "{}", to_line(row)?)?;
    }
    writer.flush()?;
    writer.get_ref().sync_all()?;

    Ok(rows.len())
}
