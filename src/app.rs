// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::convert::normalize_to_usd;
use crate::error::Result;
use crate::fx::{RateProvider, RateQuote};
use crate::models::{NewTransaction, PendingTransaction, Transaction};
use crate::reports::{self, Dashboard, HistoryFilter};
use crate::store::{StoreMode, TransactionRepository};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Result of recording a transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub message: String,
    pub quote: RateQuote,
    pub usd_amount: Decimal,
}

/// Owns the store, the rate provider and the loaded transactions. Every
/// mutation reloads the list so derived views never go stale.
pub struct AppState {
    repository: Box<dyn TransactionRepository>,
    rates: RateProvider,
    transactions: Vec<Transaction>,
}

impl AppState {
    pub fn open(repository: Box<dyn TransactionRepository>, rates: RateProvider) -> Result<Self> {
        let mut state = Self {
            repository,
            rates,
            transactions: Vec::new(),
        };
        state.reload()?;
        Ok(state)
    }

    pub fn reload(&mut self) -> Result<()> {
        self.transactions = self.repository.load(self.rates.base_rate())?;
        tracing::debug!(count = self.transactions.len(), "transactions loaded");
        Ok(())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn rates(&self) -> &RateProvider {
        &self.rates
    }

    pub fn mode(&self) -> StoreMode {
        self.repository.mode()
    }

    /// Validates, prices and stores a new transaction. A failed rate lookup
    /// still stores the record at the fallback rate.
    pub fn record(&mut self, entry: NewTransaction) -> Result<Receipt> {
        let entry = entry.validate()?;
        let quote = self.rates.get_rate_for_date(entry.date);
        let usd_amount = normalize_to_usd(entry.amount, entry.currency, quote.rate);
        let pending = PendingTransaction {
            kind: entry.kind,
            amount: entry.amount,
            currency: entry.currency,
            category: entry.category,
            description: entry.description,
            date: entry.date,
            exchange_rate: quote.rate,
            usd_amount,
        };
        let message = self.repository.create(pending)?;
        self.reload()?;
        Ok(Receipt {
            message,
            quote,
            usd_amount,
        })
    }

    pub fn remove(&mut self, id: i64) -> Result<String> {
        let message = self.repository.delete(id)?;
        self.reload()?;
        Ok(message)
    }

    pub fn refresh_rate(&self) -> Option<Decimal> {
        self.rates.refresh()
    }

    pub fn current_rate(&self) -> Decimal {
        self.rates.base_rate()
    }

    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        reports::dashboard(&self.transactions, today, self.current_rate())
    }

    pub fn history(&self, filter: &HistoryFilter) -> Vec<&Transaction> {
        reports::filter_history(&self.transactions, filter)
    }
}
