// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction persistence: on-device storage or the remote API.

use crate::config::Config;
use crate::convert::normalize_to_usd;
use crate::db::{read_blob, write_blob};
use crate::error::{Error, Result};
use crate::models::{Currency, PendingTransaction, Transaction, TransactionType};
use crate::utils::http_client;
use chrono::{NaiveDate, Utc};
use reqwest::StatusCode;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Storage key holding the serialized transaction list.
pub const STORAGE_KEY: &str = "finanzas_transactions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Local,
    Remote,
}

pub trait TransactionRepository {
    /// Full list; records missing a stored rate are back-filled with `base_rate`.
    fn load(&mut self, base_rate: Decimal) -> Result<Vec<Transaction>>;
    /// Persists the record and returns a user-facing message.
    fn create(&mut self, tx: PendingTransaction) -> Result<String>;
    fn delete(&mut self, id: i64) -> Result<String>;
    fn mode(&self) -> StoreMode;
}

pub fn open_repository(
    config: &Config,
    conn: Connection,
    base_rate: Decimal,
) -> Result<Box<dyn TransactionRepository>> {
    match &config.api_token {
        Some(token) => {
            tracing::info!(api = %config.api_url, "using remote transaction store");
            Ok(Box::new(RemoteStore::new(&config.api_url, token)?))
        }
        None => Ok(Box::new(LocalStore::new(conn, base_rate))),
    }
}

// ---------------------------------------------------------------------------
// Local

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTransaction {
    id: i64,
    #[serde(rename = "type")]
    kind: TransactionType,
    amount: Decimal,
    currency: Currency,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
    date: NaiveDate,
    #[serde(default)]
    exchange_rate: Option<Decimal>,
    #[serde(default)]
    usd_amount: Option<Decimal>,
}

impl StoredTransaction {
    fn needs_backfill(&self) -> bool {
        self.exchange_rate.is_none() || self.usd_amount.is_none()
    }

    fn into_transaction(self, base_rate: Decimal) -> Transaction {
        let exchange_rate = self.exchange_rate.unwrap_or(base_rate);
        let usd_amount = self
            .usd_amount
            .unwrap_or_else(|| normalize_to_usd(self.amount, self.currency, exchange_rate));
        Transaction {
            id: self.id,
            kind: self.kind,
            amount: self.amount,
            currency: self.currency,
            category: self.category,
            description: self.description,
            date: self.date,
            exchange_rate,
            usd_amount,
        }
    }
}

/// Decodes the stored document. Unreadable content is an empty list.
fn decode_stored(raw: &str, base_rate: Decimal) -> (Vec<Transaction>, bool) {
    let stored: Vec<StoredTransaction> = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "local transaction storage is malformed, starting empty");
            return (Vec::new(), false);
        }
    };
    let backfilled = stored.iter().filter(|s| s.needs_backfill()).count();
    if backfilled > 0 {
        tracing::warn!(count = backfilled, rate = %base_rate, "back-filling legacy transactions");
    }
    let txs = stored
        .into_iter()
        .map(|s| s.into_transaction(base_rate))
        .collect();
    (txs, backfilled > 0)
}

/// Whole collection serialized as one JSON array in the `storage` table.
/// Decimals are written as strings, so amounts keep every digit.
pub struct LocalStore {
    conn: Connection,
    items: Option<Vec<Transaction>>,
    base_rate: Decimal,
}

impl LocalStore {
    pub fn new(conn: Connection, base_rate: Decimal) -> Self {
        Self {
            conn,
            items: None,
            base_rate,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn persist(&self, items: &[Transaction]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        write_blob(&self.conn, STORAGE_KEY, &raw)
    }

    fn items_mut(&mut self) -> Result<&mut Vec<Transaction>> {
        if self.items.is_none() {
            let base = self.base_rate;
            self.load(base)?;
        }
        Ok(self.items.get_or_insert_with(Vec::new))
    }

    fn next_id(items: &[Transaction]) -> i64 {
        let now = Utc::now().timestamp_millis();
        match items.iter().map(|t| t.id).max() {
            Some(max) if max >= now => max + 1,
            _ => now,
        }
    }
}

impl TransactionRepository for LocalStore {
    fn load(&mut self, base_rate: Decimal) -> Result<Vec<Transaction>> {
        self.base_rate = base_rate;
        let items = match read_blob(&self.conn, STORAGE_KEY)? {
            Some(raw) => {
                let (items, backfilled) = decode_stored(&raw, base_rate);
                if backfilled {
                    self.persist(&items)?;
                }
                items
            }
            None => Vec::new(),
        };
        self.items = Some(items.clone());
        Ok(items)
    }

    fn create(&mut self, tx: PendingTransaction) -> Result<String> {
        let mut next = self.items_mut()?.clone();
        let id = Self::next_id(&next);
        next.push(tx.with_id(id));
        self.persist(&next)?;
        self.items = Some(next);
        tracing::info!(id, "transaction saved locally");
        Ok("Transaction saved".into())
    }

    fn delete(&mut self, id: i64) -> Result<String> {
        let current = self.items_mut()?;
        if !current.iter().any(|t| t.id == id) {
            return Err(Error::NotFound(id));
        }
        let next: Vec<Transaction> = current.iter().filter(|t| t.id != id).cloned().collect();
        self.persist(&next)?;
        self.items = Some(next);
        tracing::info!(id, "transaction deleted locally");
        Ok("Transaction deleted".into())
    }

    fn mode(&self) -> StoreMode {
        StoreMode::Local
    }
}

// ---------------------------------------------------------------------------
// Remote

#[derive(Debug, Deserialize)]
struct RemoteRow {
    id: i64,
    #[serde(rename = "type")]
    kind: TransactionType,
    amount: Decimal,
    currency: Currency,
    #[serde(default)]
    exchange_rate: Option<Decimal>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: Option<String>,
    date: NaiveDate,
}

impl RemoteRow {
    fn into_transaction(self, base_rate: Decimal) -> Transaction {
        let exchange_rate = self
            .exchange_rate
            .filter(|r| *r > Decimal::ZERO)
            .unwrap_or(base_rate);
        Transaction {
            id: self.id,
            kind: self.kind,
            amount: self.amount,
            currency: self.currency,
            category: self.category,
            description: self.description.unwrap_or_default(),
            date: self.date,
            exchange_rate,
            usd_amount: normalize_to_usd(self.amount, self.currency, exchange_rate),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    currency: Currency,
    category: &'a str,
    description: &'a str,
    date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    exchange_rate: Decimal,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    success: bool,
    #[serde(default)]
    message: String,
}

fn parse_reply(status: StatusCode, body: &str) -> Result<String> {
    match serde_json::from_str::<ApiReply>(body) {
        Ok(r) if r.success => Ok(r.message),
        Ok(r) => Err(Error::Persistence(r.message)),
        Err(_) if status.is_success() => Err(Error::Persistence(format!(
            "unexpected response from server: {}",
            body.trim()
        ))),
        Err(_) => Err(Error::Persistence(format!("server returned {}", status))),
    }
}

/// Authenticated persistence API; the server assigns ids.
pub struct RemoteStore {
    base_url: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl RemoteStore {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client: http_client()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/transactions{}", self.base_url, path)
    }
}

impl TransactionRepository for RemoteStore {
    fn load(&mut self, base_rate: Decimal) -> Result<Vec<Transaction>> {
        let rows: Vec<RemoteRow> = self
            .client
            .get(self.url(""))
            .bearer_auth(&self.token)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(rows
            .into_iter()
            .map(|r| r.into_transaction(base_rate))
            .collect())
    }

    fn create(&mut self, tx: PendingTransaction) -> Result<String> {
        let body = CreateBody {
            kind: tx.kind,
            amount: tx.amount,
            currency: tx.currency,
            category: &tx.category,
            description: &tx.description,
            date: tx.date,
            exchange_rate: tx.exchange_rate,
        };
        let resp = self
            .client
            .post(self.url(""))
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;
        let status = resp.status();
        let message = parse_reply(status, &resp.text()?)?;
        tracing::info!(%status, "transaction created remotely");
        Ok(message)
    }

    fn delete(&mut self, id: i64) -> Result<String> {
        let resp = self
            .client
            .delete(self.url(&format!("/{}", id)))
            .bearer_auth(&self.token)
            .send()?;
        let status = resp.status();
        let message = parse_reply(status, &resp.text()?)?;
        tracing::info!(id, "transaction deleted remotely");
        Ok(message)
    }

    fn mode(&self) -> StoreMode {
        StoreMode::Remote
    }
}
