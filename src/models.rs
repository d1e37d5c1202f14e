// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label stored as the category of every income record.
pub const INCOME_CATEGORY: &str = "Ingreso";

/// Largest accepted amount (10^15). Keeps COP conversions and running totals
/// well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Alimentación",
    "Transporte",
    "Vivienda",
    "Servicios Públicos",
    "Salud",
    "Entretenimiento",
    "Ropa",
    "Educación",
    "Tecnología",
    "Otros",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "COP")]
    Cop,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Cop => "COP",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "COP" => Ok(Currency::Cop),
            "USD" => Ok(Currency::Usd),
            other => Err(Error::Validation(format!(
                "unsupported currency '{}', expected COP or USD",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::Validation(format!(
                "unknown transaction type '{}', expected income or expense",
                other
            ))),
        }
    }
}

/// A recorded transaction. `exchange_rate` and `usd_amount` are fixed at
/// creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: Currency,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub exchange_rate: Decimal,
    pub usd_amount: Decimal,
}

impl Transaction {
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

/// Raw entry as typed by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewTransaction {
    pub kind: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Validated entry that still needs a rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntry {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: Currency,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<ValidEntry> {
        let kind = self
            .kind
            .ok_or_else(|| Error::Validation("type is required".into()))?;
        let amount = self
            .amount
            .ok_or_else(|| Error::Validation("amount is required".into()))?;
        if amount <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        if amount > MAX_AMOUNT {
            return Err(Error::Validation(format!(
                "amount must not exceed {}, got {}",
                MAX_AMOUNT, amount
            )));
        }
        let currency = self
            .currency
            .ok_or_else(|| Error::Validation("currency is required".into()))?;
        let date = self
            .date
            .ok_or_else(|| Error::Validation("date is required".into()))?;
        let description = required_text(self.description.as_deref())
            .ok_or_else(|| Error::Validation("description is required".into()))?;
        let category = match kind {
            TransactionType::Income => INCOME_CATEGORY.to_string(),
            TransactionType::Expense => required_text(self.category.as_deref())
                .ok_or_else(|| Error::Validation("category is required for expenses".into()))?,
        };
        Ok(ValidEntry {
            kind,
            amount,
            currency,
            category,
            description,
            date,
        })
    }
}

fn required_text(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A transaction enriched with its rate, waiting for an id from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransaction {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: Currency,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub exchange_rate: Decimal,
    pub usd_amount: Decimal,
}

impl PendingTransaction {
    pub fn with_id(self, id: i64) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            amount: self.amount,
            currency: self.currency,
            category: self.category,
            description: self.description,
            date: self.date,
            exchange_rate: self.exchange_rate,
            usd_amount: self.usd_amount,
        }
    }
}

/// Calendar month bucket used by monthly views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The `n` months ending with `self`, oldest first.
    pub fn trailing(&self, n: usize) -> Vec<YearMonth> {
        let mut out = Vec::with_capacity(n);
        let mut cur = *self;
        for _ in 0..n {
            out.push(cur);
            cur = cur.prev();
        }
        out.reverse();
        out
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Validation(format!("invalid month '{}', expected YYYY-MM", s));
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}
