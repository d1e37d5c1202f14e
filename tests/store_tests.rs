// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billetera::db;
use billetera::error::Error;
use billetera::models::{Currency, PendingTransaction, TransactionType};
use billetera::store::{LocalStore, StoreMode, TransactionRepository, STORAGE_KEY};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn rate() -> Decimal {
    Decimal::new(4100, 0)
}

fn pending(amount: i64, ccy: Currency) -> PendingTransaction {
    let amount = Decimal::new(amount, 0);
    PendingTransaction {
        kind: TransactionType::Expense,
        amount,
        currency: ccy,
        category: "Servicios".into(),
        description: "internet".into(),
        date: NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
        exchange_rate: Decimal::new(4000, 0),
        usd_amount: match ccy {
            Currency::Usd => amount,
            Currency::Cop => amount / Decimal::new(4000, 0),
        },
    }
}

#[test]
fn empty_storage_loads_empty() {
    let mut store = LocalStore::new(base_conn(), rate());
    assert!(store.load(rate()).unwrap().is_empty());
    assert_eq!(store.mode(), StoreMode::Local);
}

#[test]
fn malformed_storage_loads_empty() {
    let conn = base_conn();
    db::write_blob(&conn, STORAGE_KEY, "{not json").unwrap();
    let mut store = LocalStore::new(conn, rate());
    assert!(store.load(rate()).unwrap().is_empty());
}

#[test]
fn legacy_records_are_backfilled_and_written_back() {
    let conn = base_conn();
    let legacy = r#"[{"id": 7, "type": "income", "amount": 820000, "currency": "COP",
        "category": "Ingreso", "description": "pago", "date": "2025-07-01"}]"#;
    db::write_blob(&conn, STORAGE_KEY, legacy).unwrap();

    let mut store = LocalStore::new(conn, rate());
    let txs = store.load(rate()).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].exchange_rate, rate());
    assert_eq!(txs[0].usd_amount, Decimal::new(200, 0));

    let raw = db::read_blob(store.connection(), STORAGE_KEY).unwrap().unwrap();
    let v: Value = serde_json::from_str(&raw).unwrap();
    let stored = |field: &str| v[0][field].as_str().unwrap().parse::<Decimal>().unwrap();
    assert_eq!(stored("exchangeRate"), rate());
    assert_eq!(stored("usdAmount"), Decimal::new(200, 0));
}

#[test]
fn create_assigns_increasing_ids() {
    let mut store = LocalStore::new(base_conn(), rate());
    assert_eq!(store.create(pending(50, Currency::Usd)).unwrap(), "Transaction saved");
    store.create(pending(80_000, Currency::Cop)).unwrap();
    store.create(pending(12, Currency::Usd)).unwrap();

    let txs = store.load(rate()).unwrap();
    assert_eq!(txs.len(), 3);
    assert!(txs.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(txs[1].usd_amount, Decimal::new(20, 0));
    assert_eq!(txs[1].exchange_rate, Decimal::new(4000, 0));
}

#[test]
fn delete_removes_and_unknown_id_is_not_found() {
    let mut store = LocalStore::new(base_conn(), rate());
    store.create(pending(50, Currency::Usd)).unwrap();
    store.create(pending(60, Currency::Usd)).unwrap();
    let id = store.load(rate()).unwrap()[0].id;

    assert_eq!(store.delete(id).unwrap(), "Transaction deleted");
    let left = store.load(rate()).unwrap();
    assert_eq!(left.len(), 1);
    assert!(left.iter().all(|t| t.id != id));

    match store.delete(id) {
        Err(Error::NotFound(missing)) => assert_eq!(missing, id),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("billetera.sqlite");
    {
        let mut store = LocalStore::new(db::open_at(&path).unwrap(), rate());
        store.create(pending(50, Currency::Usd)).unwrap();
    }
    let mut reopened = LocalStore::new(db::open_at(&path).unwrap(), rate());
    let txs = reopened.load(rate()).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].category, "Servicios");
}

#[test]
fn failed_write_does_not_leak_into_later_saves() {
    let mut store = LocalStore::new(base_conn(), rate());
    store.load(rate()).unwrap();
    store
        .connection()
        .execute_batch("DROP TABLE storage")
        .unwrap();
    assert!(store.create(pending(50, Currency::Usd)).is_err());

    db::init_schema(store.connection()).unwrap();
    store.create(pending(60, Currency::Usd)).unwrap();
    let txs = store.load(rate()).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].amount, Decimal::new(60, 0));
}

#[test]
fn stored_amounts_keep_every_digit() {
    let mut store = LocalStore::new(base_conn(), rate());
    let mut tx = pending(0, Currency::Cop);
    tx.amount = "1234567.123456789012".parse().unwrap();
    tx.usd_amount = "308.641780864197253".parse().unwrap();
    store.create(tx).unwrap();

    let txs = store.load(rate()).unwrap();
    assert_eq!(txs[0].amount.to_string(), "1234567.123456789012");
    assert_eq!(txs[0].usd_amount.to_string(), "308.641780864197253");
}
