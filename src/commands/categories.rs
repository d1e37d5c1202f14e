// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Transaction, EXPENSE_CATEGORIES};
use crate::utils::pretty_table;
use anyhow::Result;
use std::collections::BTreeSet;

/// Suggested categories plus any others already used by expenses.
pub fn handle(txs: &[Transaction]) -> Result<()> {
    let used: BTreeSet<&str> = txs
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.category.as_str())
        .collect();
    let mut data: Vec<Vec<String>> = EXPENSE_CATEGORIES
        .iter()
        .map(|c| vec![c.to_string(), if used.contains(c) { "yes" } else { "" }.into()])
        .collect();
    for c in used.iter().filter(|c| !EXPENSE_CATEGORIES.contains(*c)) {
        data.push(vec![c.to_string(), "yes".into()]);
    }
    println!("{}", pretty_table(&["Category", "Used"], data));
    Ok(())
}
