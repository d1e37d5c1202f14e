// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::AppState;
use crate::fx::RateOrigin;
use crate::models::{Currency, NewTransaction, Transaction, TransactionType};
use crate::reports::HistoryFilter;
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::RegexBuilder;
use serde::Serialize;

pub fn handle_entry(
    state: &mut AppState,
    kind: TransactionType,
    m: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<()> {
    if let Some(("add", sub)) = m.subcommand() {
        let entry = entry_from_matches(kind, sub, today)?;
        let receipt = state.record(entry)?;
        let note = match receipt.quote.origin {
            RateOrigin::Live => "live TRM",
            RateOrigin::Cached => "cached TRM",
            RateOrigin::Fallback => "fallback TRM, rate service unavailable",
        };
        println!(
            "{} ({} @ {} COP/USD, {})",
            receipt.message,
            fmt_money(&receipt.usd_amount, Currency::Usd),
            receipt.quote.rate.round_dp(2),
            note
        );
    }
    Ok(())
}

pub fn entry_from_matches(
    kind: TransactionType,
    sub: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<NewTransaction> {
    let amount = parse_decimal(sub.get_one::<String>("amount").context("amount missing")?)?;
    let currency = sub
        .get_one::<String>("currency")
        .map(|s| s.parse::<Currency>())
        .transpose()?;
    let date = match sub.get_one::<String>("date") {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    let category = match kind {
        TransactionType::Expense => sub.get_one::<String>("category").cloned(),
        TransactionType::Income => None,
    };
    Ok(NewTransaction {
        kind: Some(kind),
        amount: Some(amount),
        currency,
        category,
        description: sub.get_one::<String>("description").cloned(),
        date: Some(date),
    })
}

pub fn handle(state: &mut AppState, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(state, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id missing")?;
            let message = state.remove(id)?;
            println!("{} (id {})", message, id);
        }
        _ => {}
    }
    Ok(())
}

fn list(state: &AppState, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(state, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.exchange_rate.clone(),
                    r.usd_amount.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Category", "Description", "Amount", "CCY", "TRM", "USD"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub description: String,
    pub amount: String,
    pub currency: String,
    pub exchange_rate: String,
    pub usd_amount: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id,
            date: t.date.to_string(),
            kind: t.kind.to_string(),
            category: t.category.clone(),
            description: t.description.clone(),
            amount: t.amount.to_string(),
            currency: t.currency.to_string(),
            exchange_rate: t.exchange_rate.round_dp(2).to_string(),
            usd_amount: format!("{:.2}", t.usd_amount.round_dp(2)),
        }
    }
}

pub fn filter_from_matches(sub: &clap::ArgMatches) -> Result<HistoryFilter> {
    let month = sub
        .get_one::<String>("month")
        .map(|s| parse_month(s))
        .transpose()?;
    let kind = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<TransactionType>())
        .transpose()?;
    let search = sub
        .get_one::<String>("search")
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("Invalid search pattern '{}'", p))
        })
        .transpose()?;
    Ok(HistoryFilter {
        month,
        kind,
        category: sub.get_one::<String>("category").cloned(),
        search,
        limit: sub.get_one::<usize>("limit").copied(),
    })
}

pub fn query_rows(state: &AppState, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = filter_from_matches(sub)?;
    Ok(state
        .history(&filter)
        .into_iter()
        .map(TransactionRow::from)
        .collect())
}
