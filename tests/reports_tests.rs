// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billetera::models::{Currency, Transaction, TransactionType, YearMonth};
use billetera::reports::{self, HistoryFilter, ImpactKind};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(v: i64) -> Decimal {
    Decimal::new(v, 0)
}

fn tx(
    id: i64,
    kind: TransactionType,
    amount: i64,
    ccy: Currency,
    cat: &str,
    date: &str,
    rate: i64,
) -> Transaction {
    let amount = dec(amount);
    let usd_amount = match ccy {
        Currency::Usd => amount,
        Currency::Cop => amount / dec(rate),
    };
    Transaction {
        id,
        kind,
        amount,
        currency: ccy,
        category: cat.into(),
        description: format!("tx {}", id),
        date: d(date),
        exchange_rate: dec(rate),
        usd_amount,
    }
}

fn scenario() -> Vec<Transaction> {
    vec![
        tx(1, TransactionType::Income, 1_000_000, Currency::Cop, "Ingreso", "2025-08-01", 4000),
        tx(2, TransactionType::Expense, 50, Currency::Usd, "Alimentación", "2025-08-02", 4000),
    ]
}

#[test]
fn balances_in_both_currencies() {
    let txs = scenario();
    assert_eq!(txs[0].usd_amount, dec(250));
    assert_eq!(reports::total_balance_usd(&txs), dec(200));
    assert_eq!(reports::total_balance_cop(&txs), dec(800_000));
}

#[test]
fn month_totals_only_count_current_month() {
    let mut txs = scenario();
    txs.push(tx(3, TransactionType::Expense, 20, Currency::Usd, "Salud", "2025-07-30", 4000));
    let m = reports::monthly_totals(&txs, d("2025-08-15"));
    assert_eq!(m.month, YearMonth::new(2025, 8));
    assert_eq!(m.income_usd, dec(250));
    assert_eq!(m.expense_usd, dec(50));
    assert_eq!(m.balance_usd(), dec(200));
    assert_eq!(m.expense_cop, dec(200_000));
}

#[test]
fn category_breakdown_omits_empty_categories() {
    let mut txs = scenario();
    txs.push(tx(3, TransactionType::Expense, 150, Currency::Usd, "Transporte", "2025-08-03", 4000));
    txs.push(tx(4, TransactionType::Expense, 99, Currency::Usd, "Salud", "2025-07-03", 4000));
    let cats = reports::category_breakdown(&txs, d("2025-08-20"));
    assert_eq!(cats.len(), 2);
    assert_eq!(cats[0].category, "Transporte");
    assert_eq!(cats[0].percentage, dec(75));
    assert_eq!(cats[1].category, "Alimentación");
    assert_eq!(cats[1].count, 1);
    assert!(cats.iter().all(|c| c.category != "Salud"));
}

#[test]
fn impact_of_a_weaker_peso() {
    let txs = scenario();
    let impact = reports::exchange_impact(&txs, dec(5000));
    // 1,000,000 COP at 5000 is 200 USD, so the balance drops from 200 to 150.
    assert_eq!(impact.balance_at_historical_rates, dec(200));
    assert_eq!(impact.balance_at_current_rate, dec(150));
    assert_eq!(impact.difference, dec(-50));
    assert_eq!(impact.percentage, dec(-25));
    assert_eq!(impact.kind, ImpactKind::Loss);
    let stats = impact.rates.unwrap();
    assert_eq!(stats.mean, dec(4000));
    assert_eq!(stats.min, dec(4000));
}

#[test]
fn impact_is_neutral_at_the_recorded_rate_or_when_empty() {
    assert_eq!(reports::exchange_impact(&scenario(), dec(4000)).kind, ImpactKind::Neutral);
    let empty = reports::exchange_impact(&[], dec(4100));
    assert_eq!(empty.kind, ImpactKind::Neutral);
    assert_eq!(empty.percentage, Decimal::ZERO);
    assert!(empty.rates.is_none());
}

#[test]
fn monthly_summary_keeps_six_newest_months() {
    let txs: Vec<Transaction> = (1..=8)
        .map(|m| {
            tx(
                m,
                TransactionType::Expense,
                m * 10,
                Currency::Usd,
                "Otros",
                &format!("2025-{:02}-10", m),
                4000,
            )
        })
        .collect();
    let s = reports::monthly_summary(&txs);
    assert_eq!(s.len(), 6);
    assert_eq!(s[0].month.to_string(), "2025-08");
    assert_eq!(s[5].month.to_string(), "2025-03");
    assert_eq!(s[0].balance_usd, dec(-80));
}

#[test]
fn trend_and_comparison_are_zero_filled() {
    let txs = scenario();
    let trend = reports::expense_trend(&txs, d("2025-09-05"));
    assert_eq!(trend.len(), 6);
    assert_eq!(trend[0].month.to_string(), "2025-04");
    assert_eq!(trend[5].month.to_string(), "2025-09");
    assert_eq!(trend[4].expense_usd, dec(50));
    assert_eq!(trend[5].expense_usd, Decimal::ZERO);

    let cmp = reports::income_expense_comparison(&txs, d("2026-01-10"));
    assert_eq!(cmp.len(), 6);
    assert_eq!(cmp[0].month.to_string(), "2025-08");
    assert_eq!(cmp[0].income_usd, dec(250));
    assert!(cmp[1..].iter().all(|p| p.income_usd.is_zero() && p.expense_usd.is_zero()));
}

#[test]
fn history_filters_combine() {
    let mut txs = scenario();
    for (id, amount, date) in [(3, 12, "2025-08-05"), (4, 7, "2025-07-05")] {
        let kind = TransactionType::Expense;
        txs.push(tx(id, kind, amount, Currency::Usd, "Alimentación", date, 4000));
    }

    let all = reports::filter_history(&txs, &HistoryFilter::default());
    let ids: Vec<i64> = all.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![3, 2, 1, 4]);

    let f = HistoryFilter {
        month: YearMonth::new(2025, 8),
        category: Some("ALIMENTACIÓN".into()),
        ..Default::default()
    };
    let ids: Vec<i64> = reports::filter_history(&txs, &f).iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![3, 2]);

    let f = HistoryFilter {
        search: Some(Regex::new("tx [14]").unwrap()),
        limit: Some(1),
        ..Default::default()
    };
    let ids: Vec<i64> = reports::filter_history(&txs, &f).iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn dashboard_collects_everything() {
    let txs = scenario();
    let dash = reports::dashboard(&txs, d("2025-08-20"), dec(4000));
    assert_eq!(dash.transaction_count, 2);
    assert_eq!(dash.balance_usd, dec(200));
    assert_eq!(dash.categories.len(), 1);
    assert_eq!(dash.impact.kind, ImpactKind::Neutral);
}
