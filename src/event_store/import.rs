//! CSV import into region files
//!
//! Listing CSVs carry `aid,location,price,nts,uts`; change CSVs carry
//! `aid,old_price,new_price,ts`. Timestamp cells may be unix seconds,
//! `YYYY-MM-DD` or RFC 3339.

use std::io::Read;

use serde::Deserialize;
use tracing::info;

use crate::types::{ChangeRecord, ListingRecord};
use crate::utils::parse_timestamp;

use super::store::{EventStore, EventStoreError, EventStoreResult};

#[derive(Debug, Deserialize)]
struct ListingRow {
    aid: String,
    #[serde(default)]
    location: String,
    price: i64,
    nts: String,
    uts: String,
}

#[derive(Debug, Deserialize)]
struct ChangeRow {
    aid: String,
    old_price: i64,
    new_price: i64,
    ts: String,
}

fn timestamp(value: &str, field: &str, aid: &str, line: usize) -> EventStoreResult<i64> {
    parse_timestamp(value).ok_or_else(|| {
        EventStoreError::InvalidRecord(format!(
            "line {}: bad {} {:?} for listing {}",
            line, field, value, aid
        ))
    })
}

/// Parse listing rows from CSV
pub fn read_listing_csv<R: Read>(reader: R) -> EventStoreResult<Vec<ListingRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();

    for (idx, row) in rdr.deserialize::<ListingRow>().enumerate() {
        let row = row?;
        let line = idx + 2;
        records.push(ListingRecord {
            nts: timestamp(&row.nts, "nts", &row.aid, line)?,
            uts: timestamp(&row.uts, "uts", &row.aid, line)?,
            aid: row.aid,
            location: row.location,
            price: row.price,
        });
    }

    Ok(records)
}

/// Parse price change rows from CSV
pub fn read_change_csv<R: Read>(reader: R) -> EventStoreResult<Vec<ChangeRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();

    for (idx, row) in rdr.deserialize::<ChangeRow>().enumerate() {
        let row = row?;
        records.push(ChangeRecord {
            ts: timestamp(&row.ts, "ts", &row.aid, idx + 2)?,
            aid: row.aid,
            old_price: row.old_price,
            new_price: row.new_price,
        });
    }

    Ok(records)
}

/// Import listing and (optionally) change CSVs into a region
///
/// Both files are parsed before anything is written.
pub fn import_region<L: Read, C: Read>(
    store: &EventStore,
    region: &str,
    listings: L,
    changes: Option<C>,
) -> EventStoreResult<(usize, usize)> {
    let listing_records = read_listing_csv(listings)?;
    let change_records = match changes {
        Some(reader) => read_change_csv(reader)?,
        None => Vec::new(),
    };

    let listing_count = store.append_listings(region, &listing_records)?;
    let change_count = store.append_changes(region, &change_records)?;

    info!(
        region = region,
        listings = listing_count,
        changes = change_count,
        "Imported region data"
    );

    Ok((listing_count, change_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::EventStoreConfig;
    use tempfile::TempDir;

    const LISTINGS: &str = "aid,location,price,nts,uts\n\
                            A1,garden,3000,2020-01-01,2020-01-05\n\
                            A2, court ,4500,1577923200,1578009600\n";

    const CHANGES: &str = "aid,old_price,new_price,ts\n\
                           A1,3000,2900,2020-01-03\n";

    #[test]
    fn test_read_listing_csv() {
        let records = read_listing_csv(LISTINGS.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].nts, 1577836800);
        assert_eq!(records[0].uts, 1577836800 + 4 * 86400);
        assert_eq!(records[1].location, "court");
        assert_eq!(records[1].nts, 1577923200);
    }

    #[test]
    fn test_read_listing_csv_bad_timestamp() {
        let data = "aid,location,price,nts,uts\nA1,garden,3000,soon,2020-01-05\n";
        let err = read_listing_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_change_csv() {
        let records = read_change_csv(CHANGES.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].old_price, 3000);
        assert_eq!(records[0].ts, 1577836800 + 2 * 86400);
    }

    #[test]
    fn test_import_region() {
        let temp_dir = TempDir::new().unwrap();
        let store = EventStore::with_config(EventStoreConfig::new(temp_dir.path()));

        let (listings, changes) =
            import_region(&store, "meilong", LISTINGS.as_bytes(), Some(CHANGES.as_bytes())).unwrap();

        assert_eq!((listings, changes), (2, 1));
        assert_eq!(store.load_listing_records("meilong").unwrap().len(), 2);
        assert_eq!(store.load_change_records("meilong").unwrap().len(), 1);
    }

    #[test]
    fn test_import_without_changes() {
        let temp_dir = TempDir::new().unwrap();
        let store = EventStore::with_config(EventStoreConfig::new(temp_dir.path()));

        let (listings, changes) =
            import_region(&store, "meilong", LISTINGS.as_bytes(), None::<&[u8]>).unwrap();

        assert_eq!((listings, changes), (2, 0));
        assert!(!store.config().changes_path("meilong").exists());
    }
}
