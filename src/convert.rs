// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! COP/USD conversion. Rates are always COP per one USD.

use crate::models::{Currency, Transaction};
use rust_decimal::Decimal;

/// Which rate an aggregation values transactions at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Valuation {
    /// Each transaction's own stored rate.
    Historical,
    /// One rate applied to every transaction.
    Current(Decimal),
}

impl Valuation {
    fn rate_for(&self, tx: &Transaction) -> Decimal {
        match self {
            Valuation::Historical => tx.exchange_rate,
            Valuation::Current(r) => *r,
        }
    }
}

pub fn normalize_to_usd(amount: Decimal, currency: Currency, rate: Decimal) -> Decimal {
    match currency {
        Currency::Usd => amount,
        Currency::Cop => {
            if rate.is_zero() {
                return amount;
            }
            amount / rate
        }
    }
}

pub fn to_cop(amount: Decimal, currency: Currency, rate: Decimal) -> Decimal {
    match currency {
        Currency::Cop => amount,
        Currency::Usd => amount * rate,
    }
}

pub fn usd_value(tx: &Transaction, valuation: Valuation) -> Decimal {
    match valuation {
        // stored at creation, never recomputed
        Valuation::Historical => tx.usd_amount,
        Valuation::Current(_) => normalize_to_usd(tx.amount, tx.currency, valuation.rate_for(tx)),
    }
}

pub fn cop_value(tx: &Transaction, valuation: Valuation) -> Decimal {
    to_cop(tx.amount, tx.currency, valuation.rate_for(tx))
}

/// Amount expressed in `to`, using `rate`.
pub fn convert(amount: Decimal, from: Currency, to: Currency, rate: Decimal) -> Decimal {
    match to {
        Currency::Usd => normalize_to_usd(amount, from, rate),
        Currency::Cop => to_cop(amount, from, rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use chrono::NaiveDate;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn usd_is_identity_for_any_rate() {
        for r in ["1", "3850.25", "4000", "5123.9"] {
            assert_eq!(normalize_to_usd(d("50"), Currency::Usd, d(r)), d("50"));
        }
    }

    #[test]
    fn cop_round_trip() {
        let rate = d("3987.35");
        let amount = d("1234567");
        let usd = normalize_to_usd(amount, Currency::Cop, rate);
        let back = to_cop(usd, Currency::Usd, rate);
        assert!((back - amount).abs() < d("0.000001"));
    }

    #[test]
    fn zero_rate_leaves_amount() {
        assert_eq!(normalize_to_usd(d("10"), Currency::Cop, Decimal::ZERO), d("10"));
    }

    #[test]
    fn historical_vs_current() {
        let tx = Transaction {
            id: 1,
            kind: TransactionType::Income,
            amount: d("400000"),
            currency: Currency::Cop,
            category: "Ingreso".into(),
            description: "x".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            exchange_rate: d("4000"),
            usd_amount: d("100"),
        };
        assert_eq!(usd_value(&tx, Valuation::Historical), d("100"));
        assert_eq!(usd_value(&tx, Valuation::Current(d("5000"))), d("80"));
        assert_eq!(cop_value(&tx, Valuation::Current(d("5000"))), d("400000"));
        assert_eq!(convert(d("2"), Currency::Usd, Currency::Cop, d("4000")), d("8000"));
    }
}
