// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Local;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use billetera::app::AppState;
use billetera::config::Config;
use billetera::fx::{HttpRateSource, RateProvider};
use billetera::models::TransactionType;
use billetera::{cli, commands, db, store};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let matches = cli::build_cli().get_matches();
    let config = Config::from_env();

    let db_path = match &config.db_path {
        Some(p) => p.clone(),
        None => db::default_db_path()?,
    };
    let mut settings = db::open_at(&db_path)?;
    if let Some(("init", _)) = matches.subcommand() {
        println!("Database initialized at {}", db_path.display());
        return Ok(());
    }

    let base_rate = db::get_base_rate(&settings)?.unwrap_or(config.fallback_trm);
    let rates = RateProvider::new(Box::new(HttpRateSource::new(&config.rate_url)?), base_rate)
        .with_cache(db::load_rate_cache(&settings)?);
    let repository = store::open_repository(&config, db::open_at(&db_path)?, base_rate)?;
    let mut state = AppState::open(repository, rates)?;
    tracing::debug!(mode = ?state.mode(), authenticated = config.is_authenticated(), "state ready");
    let today = Local::now().date_naive();

    let outcome = match matches.subcommand() {
        Some(("income", sub)) => {
            commands::transactions::handle_entry(&mut state, TransactionType::Income, sub, today)
        }
        Some(("expense", sub)) => {
            commands::transactions::handle_entry(&mut state, TransactionType::Expense, sub, today)
        }
        Some(("tx", sub)) => commands::transactions::handle(&mut state, sub),
        Some(("dashboard", sub)) => commands::reports::dashboard(&state, sub, today),
        Some(("report", sub)) => commands::reports::handle(&state, sub, today),
        Some(("fx", sub)) => commands::fx::handle(&state, sub),
        Some(("export", sub)) => commands::exporter::handle(state.transactions(), sub),
        Some(("categories", _)) => commands::categories::handle(state.transactions()),
        _ => {
            cli::build_cli().print_help()?;
            println!();
            Ok(())
        }
    };

    db::set_base_rate(&settings, state.current_rate())?;
    db::save_rate_cache(&mut settings, &state.rates().cache_entries())?;
    outcome
}
