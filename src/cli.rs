// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn entry_args(cmd: Command, default_ccy: &'static str) -> Command {
    cmd.arg(
        Arg::new("amount")
            .long("amount")
            .required(true)
            .help("Positive amount in the transaction currency"),
    )
    .arg(
        Arg::new("currency")
            .long("currency")
            .default_value(default_ccy)
            .help("COP or USD"),
    )
    .arg(Arg::new("description").long("description").required(true))
    .arg(
        Arg::new("date")
            .long("date")
            .help("YYYY-MM-DD (defaults to today)"),
    )
}

pub fn build_cli() -> Command {
    Command::new("billetera")
        .about("COP/USD personal finance tracker")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("income")
                .about("Income entry")
                .subcommand(entry_args(Command::new("add").about("Record income"), "COP")),
        )
        .subcommand(
            Command::new("expense").about("Expense entry").subcommand(
                entry_args(Command::new("add").about("Record an expense"), "USD")
                    .arg(Arg::new("category").long("category").required(true)),
            ),
        )
        .subcommand(
            Command::new("tx")
                .about("Transaction history")
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions, newest first")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("type").long("type").help("income or expense"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .help("Regex matched against the description"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(json_flags(
            Command::new("dashboard").about("Balances, this month, categories and TRM impact"),
        ))
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(json_flags(
                    Command::new("monthly").about("Last months with data"),
                ))
                .subcommand(json_flags(
                    Command::new("categories").about("This month's expenses by category"),
                ))
                .subcommand(json_flags(
                    Command::new("trend").about("Expenses over the trailing six months"),
                ))
                .subcommand(json_flags(
                    Command::new("comparison").about("Income vs expense, trailing six months"),
                ))
                .subcommand(json_flags(
                    Command::new("impact").about("Balance at today's TRM vs historical rates"),
                )),
        )
        .subcommand(
            Command::new("fx")
                .about("Exchange rate (TRM)")
                .subcommand(Command::new("show").about("Show baseline TRM and cached days"))
                .subcommand(Command::new("refresh").about("Clear the cache and fetch the TRM"))
                .subcommand(
                    Command::new("convert")
                        .about("Convert an amount between COP and USD")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").required(true).help("COP or USD"))
                        .arg(
                            Arg::new("rate")
                                .long("rate")
                                .help("COP per USD (defaults to the baseline TRM)"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv or json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("categories").about("List suggested expense categories"))
}
