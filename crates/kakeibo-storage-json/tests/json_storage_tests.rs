use std::{fs, sync::Arc};

use chrono::{NaiveDate, TimeZone, Utc};
use kakeibo_core::{CoreError, FixedClock, LedgerStore, Processor};
use kakeibo_domain::{CellRef, YearMonth};
use kakeibo_storage_json::{JsonLedgerStorage, StoragePaths};
use tempfile::tempdir;

fn january() -> YearMonth {
    YearMonth::new(2023, 1).unwrap()
}

#[test]
fn provisioned_month_can_be_opened_and_listed() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("storage");

    let created = storage.provision_month(january(), 150_000).expect("provision");
    let opened = storage
        .open_month(january())
        .expect("open month")
        .expect("month exists");

    assert_eq!(opened, created);
    assert_eq!(storage.list_months().unwrap(), vec![january()]);
    assert!(storage.sheet_path(january()).ends_with("sheets/202301.json"));
}

#[test]
fn provisioning_twice_is_refused() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("storage");

    storage.provision_month(january(), 0).expect("provision");
    let err = storage.provision_month(january(), 0).unwrap_err();
    assert!(matches!(err, CoreError::Storage(_)));
}

#[test]
fn budgets_beyond_the_cell_limit_are_refused() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("storage");

    let err = storage.provision_month(january(), i64::MIN).unwrap_err();
    assert!(matches!(err, CoreError::InvalidAmount(_)));
    assert!(storage.open_month(january()).unwrap().is_none());
}

#[test]
fn unknown_month_opens_as_none() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("storage");

    assert!(storage.open_month(january()).unwrap().is_none());
}

#[test]
fn saves_keep_a_bounded_set_of_backups() {
    let dir = tempdir().expect("tempdir");
    let storage =
        JsonLedgerStorage::with_retention(StoragePaths::under(dir.path()), 2).expect("storage");
    let mut sheet = storage.provision_month(january(), 0).expect("provision");

    for amount in 1..=4 {
        sheet.set_cell(CellRef::new(3, 3), format!("={amount}"));
        storage.save_month(january(), &sheet).expect("save");
    }

    let backups = storage.list_backups(january()).unwrap();
    assert!(!backups.is_empty());
    assert!(backups.len() <= 2);
    let reopened = storage.open_month(january()).unwrap().unwrap();
    assert_eq!(reopened.cell(CellRef::new(3, 3)), "=4");
}

#[test]
fn corrupt_sheet_is_a_storage_error() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("storage");
    fs::write(storage.sheet_path(january()), "{ nope").expect("write");

    let err = storage.open_month(january()).unwrap_err();
    assert!(matches!(err, CoreError::Storage(ref message) if message.contains("202301.json")));
}

#[test]
fn processor_persists_through_json_storage() {
    let dir = tempdir().expect("tempdir");
    let storage = Arc::new(JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("storage"));
    storage.provision_month(january(), 100_000).expect("provision");

    let clock = FixedClock::on(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap());
    let processor = Processor::new(storage.clone(), Arc::new(clock));
    let reply = processor.process("電気代 6200\nガス代 4100").expect("process");

    assert!(reply.text().contains("電気代: 6200"));
    assert!(reply.text().contains("今月の残金: 89700"));

    let reloaded = storage.open_month(january()).unwrap().unwrap();
    assert_eq!(reloaded.cell(CellRef::new(33, 8)), "=6200");
    assert_eq!(reloaded.cell(CellRef::new(33, 9)), "=4100");
}

#[test]
fn request_log_appends_in_order() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("storage");
    let log = storage.request_log();
    let at = Utc.with_ymd_and_hms(2023, 1, 1, 3, 0, 0).unwrap();

    assert!(log.records().unwrap().is_empty());
    let first = log.append(at, Some("U1"), "食材費 100").expect("append");
    log.append(at, None, "{\"events\":[]}").expect("append");

    let records = log.records().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], first);
    assert_eq!(records[1].user_id, None);
    assert_eq!(records[1].payload, "{\"events\":[]}");
}
