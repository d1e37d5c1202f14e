// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard and report figures, recomputed from the full transaction list
//! on every call.

use crate::convert::{cop_value, usd_value, Valuation};
use crate::models::{Transaction, TransactionType, YearMonth};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Months shown by the summary, trend and comparison views.
pub const REPORT_MONTHS: usize = 6;

fn signed(tx: &Transaction, v: Decimal) -> Decimal {
    match tx.kind {
        TransactionType::Income => v,
        TransactionType::Expense => -v,
    }
}

/// Income minus expense in USD, each at its own stored rate.
pub fn total_balance_usd(txs: &[Transaction]) -> Decimal {
    txs.iter()
        .map(|t| signed(t, usd_value(t, Valuation::Historical)))
        .sum()
}

/// Income minus expense in COP, each at its own stored rate.
pub fn total_balance_cop(txs: &[Transaction]) -> Decimal {
    txs.iter()
        .map(|t| signed(t, cop_value(t, Valuation::Historical)))
        .sum()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub month: Option<YearMonth>,
    pub income_usd: Decimal,
    pub expense_usd: Decimal,
    pub income_cop: Decimal,
    pub expense_cop: Decimal,
}

impl MonthlyTotals {
    pub fn balance_usd(&self) -> Decimal {
        self.income_usd - self.expense_usd
    }

    pub fn balance_cop(&self) -> Decimal {
        self.income_cop - self.expense_cop
    }
}

pub fn monthly_totals(txs: &[Transaction], today: NaiveDate) -> MonthlyTotals {
    let month = YearMonth::of(today);
    let mut out = MonthlyTotals {
        month: Some(month),
        ..Default::default()
    };
    for t in txs.iter().filter(|t| month.contains(t.date)) {
        let usd = usd_value(t, Valuation::Historical);
        let cop = cop_value(t, Valuation::Historical);
        match t.kind {
            TransactionType::Income => {
                out.income_usd += usd;
                out.income_cop += cop;
            }
            TransactionType::Expense => {
                out.expense_usd += usd;
                out.expense_cop += cop;
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount_usd: Decimal,
    pub count: usize,
    /// Share of the month's spending, 0-100.
    pub percentage: Decimal,
}

/// Current-month expenses per category. Categories without expenses this
/// month do not appear.
pub fn category_breakdown(txs: &[Transaction], today: NaiveDate) -> Vec<CategoryTotal> {
    let month = YearMonth::of(today);
    let mut agg: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for t in txs.iter().filter(|t| t.is_expense() && month.contains(t.date)) {
        let e = agg.entry(t.category.as_str()).or_insert((Decimal::ZERO, 0));
        e.0 += t.usd_amount;
        e.1 += 1;
    }
    let total: Decimal = agg.values().map(|(a, _)| *a).sum();
    let mut items: Vec<CategoryTotal> = agg
        .into_iter()
        .map(|(category, (amount_usd, count))| CategoryTotal {
            category: category.to_string(),
            amount_usd,
            count,
            percentage: if total.is_zero() {
                Decimal::ZERO
            } else {
                (amount_usd / total * Decimal::ONE_HUNDRED).round_dp(2)
            },
        })
        .collect();
    items.sort_by(|a, b| {
        b.amount_usd
            .cmp(&a.amount_usd)
            .then_with(|| a.category.cmp(&b.category))
    });
    items
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactKind {
    Gain,
    Loss,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateStats {
    pub mean: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeImpact {
    /// `None` when there are no transactions.
    pub rates: Option<RateStats>,
    pub current_rate: Decimal,
    pub balance_at_current_rate: Decimal,
    pub balance_at_historical_rates: Decimal,
    pub difference: Decimal,
    pub percentage: Decimal,
    pub kind: ImpactKind,
}

pub fn rate_stats(txs: &[Transaction]) -> Option<RateStats> {
    let first = txs.first()?.exchange_rate;
    let (sum, min, max) = txs.iter().map(|t| t.exchange_rate).fold(
        (Decimal::ZERO, first, first),
        |(s, lo, hi), r| (s + r, lo.min(r), hi.max(r)),
    );
    Some(RateStats {
        mean: sum / Decimal::from(txs.len()),
        min,
        max,
    })
}

/// How the USD balance would change if every transaction were valued at
/// `current_rate` instead of its own rate.
pub fn exchange_impact(txs: &[Transaction], current_rate: Decimal) -> ExchangeImpact {
    let at_current: Decimal = txs
        .iter()
        .map(|t| signed(t, usd_value(t, Valuation::Current(current_rate))))
        .sum();
    let at_historical = total_balance_usd(txs);
    let difference = at_current - at_historical;
    let percentage = if at_historical.is_zero() {
        Decimal::ZERO
    } else {
        difference / at_historical.abs() * Decimal::ONE_HUNDRED
    };
    let rounded = difference.round_dp(2);
    let kind = if rounded > Decimal::ZERO {
        ImpactKind::Gain
    } else if rounded < Decimal::ZERO {
        ImpactKind::Loss
    } else {
        ImpactKind::Neutral
    };
    ExchangeImpact {
        rates: rate_stats(txs),
        current_rate,
        balance_at_current_rate: at_current,
        balance_at_historical_rates: at_historical,
        difference,
        percentage,
        kind,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: YearMonth,
    pub income_usd: Decimal,
    pub expense_usd: Decimal,
    pub balance_usd: Decimal,
}

/// The most recent months that have data, newest first.
pub fn monthly_summary(txs: &[Transaction]) -> Vec<MonthSummary> {
    let mut by_month: BTreeMap<YearMonth, (Decimal, Decimal)> = BTreeMap::new();
    for t in txs {
        let e = by_month
            .entry(t.month())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        match t.kind {
            TransactionType::Income => e.0 += t.usd_amount,
            TransactionType::Expense => e.1 += t.usd_amount,
        }
    }
    by_month
        .into_iter()
        .rev()
        .take(REPORT_MONTHS)
        .map(|(month, (income_usd, expense_usd))| MonthSummary {
            month,
            income_usd,
            expense_usd,
            balance_usd: income_usd - expense_usd,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: YearMonth,
    pub expense_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub month: YearMonth,
    pub income_usd: Decimal,
    pub expense_usd: Decimal,
}

fn window_sums(txs: &[Transaction], today: NaiveDate) -> Vec<(YearMonth, Decimal, Decimal)> {
    let months = YearMonth::of(today).trailing(REPORT_MONTHS);
    let mut sums: BTreeMap<YearMonth, (Decimal, Decimal)> = months
        .iter()
        .map(|m| (*m, (Decimal::ZERO, Decimal::ZERO)))
        .collect();
    for t in txs {
        if let Some(e) = sums.get_mut(&t.month()) {
            match t.kind {
                TransactionType::Income => e.0 += t.usd_amount,
                TransactionType::Expense => e.1 += t.usd_amount,
            }
        }
    }
    sums.into_iter().map(|(m, (i, e))| (m, i, e)).collect()
}

/// Expense per month over the trailing window, oldest first, zero-filled.
pub fn expense_trend(txs: &[Transaction], today: NaiveDate) -> Vec<TrendPoint> {
    window_sums(txs, today)
        .into_iter()
        .map(|(month, _, expense_usd)| TrendPoint { month, expense_usd })
        .collect()
}

pub fn income_expense_comparison(txs: &[Transaction], today: NaiveDate) -> Vec<ComparisonPoint> {
    window_sums(txs, today)
        .into_iter()
        .map(|(month, income_usd, expense_usd)| ComparisonPoint {
            month,
            income_usd,
            expense_usd,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub transaction_count: usize,
    pub balance_usd: Decimal,
    pub balance_cop: Decimal,
    pub month: MonthlyTotals,
    pub categories: Vec<CategoryTotal>,
    pub impact: ExchangeImpact,
}

pub fn dashboard(txs: &[Transaction], today: NaiveDate, current_rate: Decimal) -> Dashboard {
    Dashboard {
        as_of: today,
        transaction_count: txs.len(),
        balance_usd: total_balance_usd(txs),
        balance_cop: total_balance_cop(txs),
        month: monthly_totals(txs, today),
        categories: category_breakdown(txs, today),
        impact: exchange_impact(txs, current_rate),
    }
}

/// History view filters; all are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub month: Option<YearMonth>,
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub search: Option<Regex>,
    pub limit: Option<usize>,
}

impl HistoryFilter {
    fn matches(&self, t: &Transaction) -> bool {
        self.month.is_none_or(|m| m.contains(t.date))
            && self.kind.is_none_or(|k| k == t.kind)
            && self
                .category
                .as_deref()
                .is_none_or(|c| c.to_lowercase() == t.category.to_lowercase())
            && self
                .search
                .as_ref()
                .is_none_or(|re| re.is_match(&t.description))
    }
}

/// Newest first, ties broken by id descending.
pub fn filter_history<'a>(txs: &'a [Transaction], filter: &HistoryFilter) -> Vec<&'a Transaction> {
    let mut out: Vec<&Transaction> = txs.iter().filter(|t| filter.matches(t)).collect();
    out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    if let Some(n) = filter.limit {
        out.truncate(n);
    }
    out
}
