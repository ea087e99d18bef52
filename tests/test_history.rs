//! History store tests: dedup, ordering, durability, round-trips.

mod common;

use canslim_sdk::parse::parse_cells;
use canslim_sdk::{CanslimError, HistoryStore, MarketRegime, ScanSnapshot, StockRecord};
use rust_decimal::Decimal;

fn sample_snapshot() -> ScanSnapshot {
    parse_cells(&common::sample_cells()).unwrap()
}

fn store() -> (HistoryStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(tmp.path().join("history")).unwrap();
    (store, tmp)
}

// ---------------------------------------------------------------------------
// record
// ---------------------------------------------------------------------------

#[test]
fn identical_snapshots_write_exactly_one_record() {
    let (store, _tmp) = store();
    let snapshot = sample_snapshot();

    assert!(store.record(&snapshot).unwrap());
    assert!(!store.record(&snapshot).unwrap());
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn same_timestamp_different_content_is_still_skipped() {
    let (store, _tmp) = store();
    let snapshot = sample_snapshot();
    store.record(&snapshot).unwrap();

    let mut reordered = snapshot.clone();
    reordered.stocks.pop();
    assert!(!store.record(&reordered).unwrap());
}

#[test]
fn distinct_timestamps_write_two_records() {
    let (store, _tmp) = store();
    let first = sample_snapshot();
    let mut second = first.clone();
    second.timestamp = "2024-02-12 09:00:00".to_string();

    assert!(store.record(&first).unwrap());
    assert!(store.record(&second).unwrap());
    assert_eq!(store.list().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// list / load / latest
// ---------------------------------------------------------------------------

#[test]
fn list_is_newest_first_with_stock_counts() {
    let (store, _tmp) = store();
    let first = sample_snapshot();
    let mut second = first.clone();
    second.timestamp = "2024-02-12 09:00:00".to_string();
    second.stocks.truncate(1);

    store.record(&first).unwrap();
    store.record(&second).unwrap();

    let entries = store.list().unwrap();
    assert_eq!(entries[0].timestamp, "2024-02-12 09:00:00");
    assert_eq!(entries[0].stock_count, 1);
    assert_eq!(entries[1].timestamp, "2024-02-11 08:45:23");
    assert_eq!(entries[1].stock_count, 2);
}

#[test]
fn round_trip_preserves_every_field() {
    let (store, _tmp) = store();
    let snapshot = ScanSnapshot {
        timestamp: "2024-03-01 07:30:00".to_string(),
        market_regime: MarketRegime::Other("Choppy".to_string()),
        distribution_days: 5,
        buy_signal: false,
        account_balance: "250000.50".parse::<Decimal>().unwrap(),
        risk_per_trade: "2500".parse::<Decimal>().unwrap(),
        actionable_count: None,
        stocks: vec![StockRecord {
            ticker: "TSLA".to_string(),
            name: None,
            score: 72.5,
            c: "B".to_string(),
            a: String::new(),
            n: "C".to_string(),
            s: "A".to_string(),
            l: "B".to_string(),
            i: String::new(),
            m: "A".to_string(),
            rs: Some(88.0),
            price: None,
            pivot: Some(201.25),
            stop: None,
            signal: "Watch".to_string(),
        }],
    };

    store.record(&snapshot).unwrap();
    let key = store.list().unwrap()[0].key.clone();
    let loaded = store.load(&key).unwrap();
    assert_eq!(loaded, snapshot);
}

#[test]
fn latest_returns_the_most_recent_record() {
    let (store, _tmp) = store();
    assert!(store.latest().unwrap().is_none());

    let first = sample_snapshot();
    let mut second = first.clone();
    second.timestamp = "2024-02-12 09:00:00".to_string();
    store.record(&first).unwrap();
    store.record(&second).unwrap();

    assert_eq!(store.latest().unwrap().unwrap().timestamp, second.timestamp);
}

#[test]
fn load_unknown_key_is_not_found() {
    let (store, _tmp) = store();
    let err = store.load("scan_2099-01-01_00-00-00").unwrap_err();
    assert!(matches!(err, CanslimError::NotFound(_)));
}

#[test]
fn load_rejects_path_traversal_keys() {
    let (store, _tmp) = store();
    let err = store.load("../settings").unwrap_err();
    assert!(matches!(err, CanslimError::InvalidArgument(_)));
}

#[test]
fn no_partial_files_remain_after_record() {
    let (store, _tmp) = store();
    store.record(&sample_snapshot()).unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(store.dir())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) != Some("json"))
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}
