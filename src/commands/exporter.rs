// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use serde_json::json;
use std::io::Write;
use std::path::Path;

pub fn handle(txs: &[Transaction], m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = sub
                .get_one::<String>("format")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "csv".into());
            let out = sub.get_one::<String>("out").context("out missing")?;
            export_transactions(txs, &fmt, Path::new(out))?;
            println!("Exported {} transactions to {}", txs.len(), out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes the list oldest first as `csv` or `json`.
pub fn export_transactions(txs: &[Transaction], fmt: &str, out: &Path) -> Result<()> {
    let mut sorted: Vec<&Transaction> = txs.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record([
                "id",
                "date",
                "type",
                "category",
                "description",
                "amount",
                "currency",
                "exchange_rate",
                "usd_amount",
            ])?;
            for t in sorted {
                wtr.write_record([
                    t.id.to_string(),
                    t.date.to_string(),
                    t.kind.to_string(),
                    t.category.clone(),
                    t.description.clone(),
                    t.amount.to_string(),
                    t.currency.to_string(),
                    t.exchange_rate.to_string(),
                    t.usd_amount.round_dp(2).to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let doc = json!({
                "export_date": Local::now().to_rfc3339(),
                "total_transactions": sorted.len(),
                "transactions": sorted,
            });
            let mut f = std::fs::File::create(out)
                .with_context(|| format!("Create {}", out.display()))?;
            f.write_all(serde_json::to_string_pretty(&doc)?.as_bytes())?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    Ok(())
}
