//! Event store integration tests
//!
//! Covers the full path from region files to daily series:
//! - Loading partitions with location filters and change joins
//! - Replaying several regions in parallel
//! - CSV import and export

use std::collections::HashMap;
use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use listing_history::event_store::export::export_csv_file;
use listing_history::event_store::import::import_region;
use listing_history::{
    compute_daily_statistics, compute_partitions, ChangeRecord, EventStore, EventStoreConfig,
    LedgerError, Listing, ListingRecord, PartitionData, PartitionKey, ReplayError,
};

const DAY: i64 = 86_400;
// 2020-01-01T00:00:00Z
const JAN1: i64 = 1_577_836_800;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, m, d).unwrap()
}

fn listing(aid: &str, location: &str, price: i64, first: i64, last: i64) -> ListingRecord {
    ListingRecord {
        aid: aid.to_string(),
        location: location.to_string(),
        price,
        nts: JAN1 + first * DAY + 9 * 3600,
        uts: JAN1 + last * DAY + 18 * 3600,
    }
}

fn change(aid: &str, old_price: i64, new_price: i64, day: i64) -> ChangeRecord {
    ChangeRecord {
        aid: aid.to_string(),
        old_price,
        new_price,
        ts: JAN1 + day * DAY + 12 * 3600,
    }
}

fn setup_store() -> (EventStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = EventStore::with_config(EventStoreConfig::new(temp_dir.path()));
    (store, temp_dir)
}

#[test]
fn test_region_series_from_files() {
    let (store, _temp_dir) = setup_store();

    store
        .append_listings(
            "meilong",
            &[
                listing("A", "garden", 3000, 0, 2),
                listing("B", "garden", 5000, 1, 1),
                listing("C", "court", 9000, 0, 2),
            ],
        )
        .unwrap();
    store
        .append_changes("meilong", &[change("A", 3000, 2800, 2)])
        .unwrap();

    let garden = compute_daily_statistics(&store, &PartitionKey::location("meilong", "garden"))
        .unwrap();
    assert_eq!(garden.dates(), vec![date(1, 1), date(1, 2), date(1, 3)]);
    assert_eq!(garden.active_counts(), vec![1, 2, 1]);
    assert_eq!(garden.mean_prices(), vec![3000, 4000, 2800]);

    let region = compute_daily_statistics(&store, &PartitionKey::region("meilong")).unwrap();
    assert_eq!(region.active_counts(), vec![2, 3, 2]);
    // day 3: 2800 and 9000
    assert_eq!(region.median_prices()[2], 5900);
}

#[test]
fn test_stored_price_is_replaced_by_first_change() {
    let (store, _temp_dir) = setup_store();

    // The scraper stores the latest price on the listing row.
    store
        .append_listings("r", &[listing("A", "", 4500, 0, 4)])
        .unwrap();
    store
        .append_changes(
            "r",
            &[change("A", 5000, 4800, 1), change("A", 4800, 4500, 3)],
        )
        .unwrap();

    let series = compute_daily_statistics(&store, &PartitionKey::region("r")).unwrap();
    assert_eq!(series.mean_prices(), vec![5000, 4800, 4800, 4500, 4500]);
}

#[test]
fn test_low_old_price_changes_are_ignored() {
    let (store, _temp_dir) = setup_store();

    store
        .append_listings("r", &[listing("A", "", 3000, 0, 2)])
        .unwrap();
    store
        .append_changes("r", &[change("A", 1800, 3000, 1)])
        .unwrap();

    let series = compute_daily_statistics(&store, &PartitionKey::region("r")).unwrap();
    assert_eq!(series.mean_prices(), vec![3000, 3000, 3000]);
}

#[test]
fn test_unknown_region_is_empty() {
    let (store, _temp_dir) = setup_store();

    let series = compute_daily_statistics(&store, &PartitionKey::region("nowhere")).unwrap();
    assert!(series.is_empty());
}

#[test]
fn test_gap_surfaces_as_replay_error() {
    let (store, _temp_dir) = setup_store();

    store
        .append_listings("r", &[listing("A", "", 3000, 0, 0), listing("B", "", 3000, 2, 2)])
        .unwrap();

    let err = compute_daily_statistics(&store, &PartitionKey::region("r")).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Replay(ReplayError::EmptyActiveSet { date }) if date == NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()
    ));
}

#[test]
fn test_parallel_regions_are_independent() {
    let (store, _temp_dir) = setup_store();

    store
        .append_listings("good", &[listing("A", "", 3000, 0, 3)])
        .unwrap();
    store
        .append_listings("broken", &[listing("A", "", 3000, 0, 0), listing("B", "", 3000, 5, 5)])
        .unwrap();
    store
        .append_listings("other", &[listing("X", "", 7000, 1, 2)])
        .unwrap();

    let keys: Vec<PartitionKey> = store
        .list_regions()
        .unwrap()
        .into_iter()
        .map(PartitionKey::region)
        .collect();
    let results = compute_partitions(&store, &keys);

    let regions: Vec<_> = results.iter().map(|(k, _)| k.region.as_str()).collect();
    assert_eq!(regions, vec!["broken", "good", "other"]);
    assert!(results[0].1.is_err());
    assert_eq!(results[1].1.as_ref().unwrap().len(), 4);
    assert_eq!(results[2].1.as_ref().unwrap().mean_prices(), vec![7000, 7000]);
}

#[test]
fn test_in_memory_source() {
    let mut partitions = HashMap::new();
    partitions.insert(
        PartitionKey::region("mem"),
        PartitionData::new(vec![Listing::new("A", 10, date(1, 1), date(1, 2))], vec![]),
    );

    let keys = vec![PartitionKey::region("mem"), PartitionKey::region("absent")];
    let results = compute_partitions(&partitions, &keys);

    assert_eq!(results[0].1.as_ref().unwrap().len(), 2);
    assert!(results[1].1.as_ref().unwrap().is_empty());
}

#[test]
fn test_import_then_export() {
    let (store, temp_dir) = setup_store();

    let listings = "aid,location,price,nts,uts\n\
                    A,garden,3000,2020-01-01,2020-01-03\n\
                    B,garden,5000,2020-01-02,2020-01-02\n";
    let changes = "aid,old_price,new_price,ts\n\
                   A,3000,3300,2020-01-03\n";

    let counts = import_region(&store, "meilong", listings.as_bytes(), Some(changes.as_bytes()))
        .unwrap();
    assert_eq!(counts, (2, 1));

    let series = compute_daily_statistics(&store, &PartitionKey::region("meilong")).unwrap();
    let path = temp_dir.path().join("out").join("meilong.csv");
    export_csv_file(&series, &path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "date,mean_price,median_price,active_count\n\
         2020-01-01,3000,3000,1\n\
         2020-01-02,4000,4000,2\n\
         2020-01-03,3300,3300,1\n"
    );
}
