mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::{member_config, MEMBER, STRANGER};
use kakeibo::{event::ReplyPayload, handler::MessageHandler};
use kakeibo_config::BatchMode;
use kakeibo_core::{FixedClock, MemoryLedgerStore, HELP_TEXT};
use kakeibo_domain::{CellRef, Category, YearMonth};
use kakeibo_storage_json::{JsonLedgerStorage, StoragePaths};
use tempfile::tempdir;

fn january() -> YearMonth {
    YearMonth::new(2023, 1).unwrap()
}

fn memory_handler(config: kakeibo_config::Config) -> (Arc<MemoryLedgerStore>, MessageHandler) {
    let store = Arc::new(MemoryLedgerStore::new());
    store.provision(january(), 200_000);
    let clock = FixedClock::on(NaiveDate::from_ymd_opt(2023, 1, 10).unwrap());
    let handler = MessageHandler::new(config, store.clone(), Arc::new(clock), None);
    (store, handler)
}

fn webhook(user_id: &str, text: &str) -> String {
    serde_json::json!({
        "destination": "Ubot",
        "events": [{
            "type": "message",
            "message": { "type": "text", "id": "1", "text": text },
            "timestamp": 1_673_308_800_000_i64,
            "source": { "type": "user", "userId": user_id },
            "replyToken": "reply-1",
            "mode": "active"
        }]
    })
    .to_string()
}

#[test]
fn member_message_is_posted_and_summarised() {
    let (store, handler) = memory_handler(member_config());

    let reply = handler.handle_text(MEMBER, "2023/01/01\n食材費 4000\n日用品 1500");

    assert!(reply.starts_with("2023/01\n"));
    assert!(reply.contains("合計   : 5500"));
    assert!(reply.contains("今月の残金: 194500"));
    let sheet = store.snapshot(january()).unwrap();
    assert_eq!(sheet.cell(CellRef::new(3, Category::Groceries.column())), "=4000");
}

#[test]
fn strangers_are_answered_unauthorized_and_nothing_changes() {
    let (store, handler) = memory_handler(member_config());
    let before = store.snapshot(january()).unwrap();

    let reply = handler.handle_text(STRANGER, "食材費 4000");

    assert_eq!(reply, "unauthorized");
    assert_eq!(store.snapshot(january()).unwrap(), before);
}

#[test]
fn failures_become_the_reply_text() {
    let (_, handler) = memory_handler(member_config());

    assert_eq!(handler.handle_text(MEMBER, "食材費 abc"), "Invalid amount: [abc]");
    assert_eq!(
        handler.handle_text(MEMBER, "2023/02/01\n食材費 100"),
        "Sheet not found: [202302]"
    );
    assert!(handler
        .handle_text(MEMBER, "食材 100")
        .starts_with("Unknown category: [食材]"));
    assert_eq!(handler.handle_text(MEMBER, "ヘルプ"), HELP_TEXT);
}

#[test]
fn eager_mode_from_config_keeps_earlier_lines() {
    let config = kakeibo_config::Config {
        batch_mode: BatchMode::Eager,
        ..member_config()
    };
    let (store, handler) = memory_handler(config);

    let reply = handler.handle_text(MEMBER, "外食費 1200\n電話代 300");

    assert!(reply.starts_with("Unknown category: [電話代]"));
    let sheet = store.snapshot(january()).unwrap();
    assert_eq!(sheet.cell(CellRef::new(12, Category::DiningOut.column())), "=1200");
}

#[test]
fn webhook_text_event_yields_a_reply_payload() {
    let (_, handler) = memory_handler(member_config());

    let payload = handler
        .handle_webhook(&webhook(MEMBER, "通信費 3000"))
        .expect("webhook")
        .expect("reply");

    assert_eq!(payload.reply_token, "reply-1");
    assert_eq!(payload.messages.len(), 1);
    assert!(payload.messages[0].text.contains("通信費: 3000"));
}

#[test]
fn webhook_from_stranger_replies_unauthorized() {
    let (_, handler) = memory_handler(member_config());

    let payload = handler
        .handle_webhook(&webhook(STRANGER, "通信費 3000"))
        .expect("webhook");

    assert_eq!(payload, Some(ReplyPayload::text("reply-1", "unauthorized")));
}

#[test]
fn webhook_without_text_needs_no_reply() {
    let (_, handler) = memory_handler(member_config());
    let sticker = webhook(MEMBER, "x").replace(r#""type":"text""#, r#""type":"sticker""#);

    assert_eq!(handler.handle_webhook(&sticker).expect("webhook"), None);
    assert_eq!(handler.handle_webhook(r#"{"events":[]}"#).expect("webhook"), None);
}

#[test]
fn malformed_webhook_is_an_error() {
    let (_, handler) = memory_handler(member_config());

    assert!(handler.handle_webhook("{ not json").is_err());
}

#[test]
fn requests_are_logged_before_processing() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("storage");
    storage.provision_month(january(), 50_000).expect("provision");
    let log = storage.request_log();
    let clock = FixedClock::on(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
    let handler = MessageHandler::new(
        member_config(),
        Arc::new(storage),
        Arc::new(clock),
        Some(log.clone()),
    );

    handler.handle_text(MEMBER, "ガス代 4100");
    handler.handle_text(STRANGER, "ガス代 1");

    let records = log.records().expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].user_id.as_deref(), Some(MEMBER));
    assert_eq!(records[0].payload, "ガス代 4100");
    assert_eq!(records[1].user_id.as_deref(), Some(STRANGER));
}

#[test]
fn from_config_writes_sheets_under_the_ledger_root() {
    let dir = tempdir().expect("tempdir");
    JsonLedgerStorage::new(StoragePaths::under(dir.path()))
        .expect("storage")
        .provision_month(january(), 0)
        .expect("provision");
    let handler = MessageHandler::from_config(member_config(), dir.path()).expect("handler");

    let reply = handler.handle_text(MEMBER, "2023/01/20\n貯金 10000");

    assert!(reply.contains("貯金   : 10000"));
    let saved = common::sheet_file(dir.path(), "202301");
    assert!(saved.contains("=10000"));
    assert!(dir.path().join("requests.jsonl").exists());
}
