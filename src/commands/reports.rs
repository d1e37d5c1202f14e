// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::AppState;
use crate::models::Currency;
use crate::reports::{self, ImpactKind};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn usd(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn dashboard(state: &AppState, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let d = state.dashboard(today);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &d)? {
        return Ok(());
    }
    let line = |label: &str, usd: Decimal, cop: Decimal| {
        vec![
            label.to_string(),
            fmt_money(&usd, Currency::Usd),
            fmt_money(&cop, Currency::Cop),
        ]
    };
    let rows = vec![
        line("Balance", d.balance_usd, d.balance_cop),
        line("Income this month", d.month.income_usd, d.month.income_cop),
        line("Expenses this month", d.month.expense_usd, d.month.expense_cop),
        line("Net this month", d.month.balance_usd(), d.month.balance_cop()),
    ];
    println!("{}", pretty_table(&["", "USD", "COP"], rows));
    println!(
        "TRM {} COP/USD, {} transactions, as of {}",
        d.impact.current_rate.round_dp(2),
        d.transaction_count,
        d.as_of
    );
    if !d.categories.is_empty() {
        print_categories(&d.categories);
    }
    Ok(())
}

fn print_categories(items: &[reports::CategoryTotal]) {
    let rows = items
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                usd(&c.amount_usd),
                c.count.to_string(),
                format!("{}%", c.percentage),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Spent (USD)", "Count", "Share"], rows)
    );
}

pub fn handle(state: &AppState, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let txs = state.transactions();
    match m.subcommand() {
        Some(("monthly", sub)) => {
            let data = reports::monthly_summary(txs);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|s| {
                        vec![
                            s.month.to_string(),
                            usd(&s.income_usd),
                            usd(&s.expense_usd),
                            usd(&s.balance_usd),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Month", "Income (USD)", "Expense (USD)", "Net (USD)"], rows)
                );
            }
        }
        Some(("categories", sub)) => {
            let data = reports::category_breakdown(txs, today);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                print_categories(&data);
            }
        }
        Some(("trend", sub)) => {
            let data = reports::expense_trend(txs, today);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|p| vec![p.month.to_string(), usd(&p.expense_usd)])
                    .collect();
                println!("{}", pretty_table(&["Month", "Expense (USD)"], rows));
            }
        }
        Some(("comparison", sub)) => {
            let data = reports::income_expense_comparison(txs, today);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|p| {
                        vec![
                            p.month.to_string(),
                            usd(&p.income_usd),
                            usd(&p.expense_usd),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Month", "Income (USD)", "Expense (USD)"], rows)
                );
            }
        }
        Some(("impact", sub)) => {
            let data = reports::exchange_impact(txs, state.current_rate());
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let mut rows = Vec::new();
                if let Some(r) = &data.rates {
                    rows.push(vec!["Mean recorded TRM".into(), r.mean.round_dp(2).to_string()]);
                    rows.push(vec!["Lowest recorded TRM".into(), r.min.round_dp(2).to_string()]);
                    rows.push(vec!["Highest recorded TRM".into(), r.max.round_dp(2).to_string()]);
                }
                rows.push(vec!["Current TRM".into(), data.current_rate.round_dp(2).to_string()]);
                rows.push(vec![
                    "Balance at current TRM".into(),
                    usd(&data.balance_at_current_rate),
                ]);
                rows.push(vec![
                    "Balance at historical TRM".into(),
                    usd(&data.balance_at_historical_rates),
                ]);
                rows.push(vec!["Difference".into(), usd(&data.difference)]);
                rows.push(vec!["Difference %".into(), format!("{}%", data.percentage.round_dp(2))]);
                let verdict = match data.kind {
                    ImpactKind::Gain => "gain",
                    ImpactKind::Loss => "loss",
                    ImpactKind::Neutral => "neutral",
                };
                rows.push(vec!["Impact".into(), verdict.into()]);
                println!("{}", pretty_table(&["Metric", "Value"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
