// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::AppState;
use crate::convert::convert;
use crate::models::Currency;
use crate::utils::{fmt_money, parse_decimal, pretty_table};
use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;

pub fn handle(state: &AppState, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => show(state),
        Some(("refresh", _)) => {
            match state.refresh_rate() {
                Some(rate) => println!("TRM updated: {} COP/USD", rate.round_dp(2)),
                None => println!(
                    "Could not reach the rate service; keeping {} COP/USD",
                    state.current_rate().round_dp(2)
                ),
            }
            Ok(())
        }
        Some(("convert", sub)) => convert_amount(state, sub),
        _ => Ok(()),
    }
}

fn show(state: &AppState) -> Result<()> {
    println!("Baseline TRM: {} COP/USD", state.current_rate().round_dp(2));
    let rows: Vec<Vec<String>> = state
        .rates()
        .cache_entries()
        .into_iter()
        .rev()
        .map(|(d, r)| vec![d, r.round_dp(2).to_string()])
        .collect();
    if rows.is_empty() {
        println!("No cached daily rates.");
    } else {
        println!("{}", pretty_table(&["Date", "COP/USD"], rows));
    }
    Ok(())
}

fn convert_amount(state: &AppState, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").context("amount missing")?)?;
    let from: Currency = sub
        .get_one::<String>("from")
        .context("from missing")?
        .parse()?;
    let rate = match sub.get_one::<String>("rate") {
        Some(raw) => parse_decimal(raw)?,
        None => state.current_rate(),
    };
    if rate <= Decimal::ZERO {
        return Err(anyhow!("Rate must be positive, got {}", rate));
    }
    let to = match from {
        Currency::Cop => Currency::Usd,
        Currency::Usd => Currency::Cop,
    };
    let res = convert(amount, from, to, rate);
    println!(
        "{} -> {} (@ {} COP/USD)",
        fmt_money(&amount, from),
        fmt_money(&res, to),
        rate.round_dp(2)
    );
    Ok(())
}
