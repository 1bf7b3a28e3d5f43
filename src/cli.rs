// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    ]
}

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

fn date_range(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("from")
            .long("from")
            .required(true)
            .help("First day, YYYY-MM-DD"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .required(true)
            .help("Last day (inclusive), YYYY-MM-DD"),
    )
    .args(json_flags())
}

pub fn build_cli() -> Command {
    Command::new("pocketledger")
        .version(clap::crate_version!())
        .about("Personal-finance ledger with consistent balances and budgets")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("POCKETLEDGER_DB")
                .help("Path to the SQLite ledger file"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env("POCKETLEDGER_USER")
                .value_parser(value_parser!(i64))
                .help("Act on behalf of this user id"),
        )
        .arg(
            Arg::new("busy-timeout")
                .long("busy-timeout")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Milliseconds to wait for a locked store"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("warn")
                .help("Log level when RUST_LOG is unset"),
        )
        .subcommand(Command::new("init").about("Create the ledger store"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("type").long("type").default_value("bank"))
                        .arg(Arg::new("currency").long("currency").required(true))
                        .arg(
                            Arg::new("initial")
                                .long("initial")
                                .default_value("0")
                                .help("Opening balance"),
                        ),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(
                    Command::new("rename")
                        .arg(id_arg("id", "Account id"))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("type").long("type")),
                )
                .subcommand(Command::new("activate").arg(id_arg("id", "Account id")))
                .subcommand(Command::new("deactivate").arg(id_arg("id", "Account id"))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(
                            Arg::new("parent")
                                .long("parent")
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("list")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense"]),
                        )
                        .args(json_flags()),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and inspect transactions")
                .subcommand(
                    Command::new("add")
                        .arg(id_arg("account", "Source account id"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("income, expense or transfer"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .help("Defaults to the account currency"),
                        )
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("RFC 3339 or YYYY-MM-DD; defaults to now"),
                        )
                        .arg(
                            Arg::new("to")
                                .long("to")
                                .value_parser(value_parser!(i64))
                                .help("Destination account id for transfers"),
                        )
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(
                            Arg::new("account")
                                .long("account")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                        .arg(Arg::new("until").long("until").help("YYYY-MM-DD, inclusive"))
                        .arg(Arg::new("min").long("min"))
                        .arg(Arg::new("max").long("max"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(
                            Arg::new("offset")
                                .long("offset")
                                .value_parser(value_parser!(usize)),
                        )
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("show")
                        .arg(id_arg("id", "Transaction id"))
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change category, description, date or notes")
                        .arg(id_arg("id", "Transaction id"))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_parser(value_parser!(i64))
                                .conflicts_with("clear-category"),
                        )
                        .arg(
                            Arg::new("clear-category")
                                .long("clear-category")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(Command::new("rm").arg(id_arg("id", "Transaction id"))),
        )
        .subcommand(
            Command::new("budget")
                .about("Budgets and their status")
                .subcommand(
                    Command::new("add")
                        .arg(id_arg("category", "Expense category id"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .default_value("monthly")
                                .value_parser(["monthly", "yearly"]),
                        )
                        .arg(
                            Arg::new("start")
                                .long("start")
                                .required(true)
                                .help("YYYY-MM-DD"),
                        )
                        .arg(Arg::new("end").long("end").help("YYYY-MM-DD, inclusive")),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(
                    Command::new("edit")
                        .about("Change a budget's category, amount, period or window")
                        .arg(id_arg("id", "Budget id"))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("amount").long("amount"))
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .value_parser(["monthly", "yearly"]),
                        )
                        .arg(Arg::new("start").long("start").help("YYYY-MM-DD"))
                        .arg(
                            Arg::new("end")
                                .long("end")
                                .help("YYYY-MM-DD, inclusive")
                                .conflicts_with("open-ended"),
                        )
                        .arg(
                            Arg::new("open-ended")
                                .long("open-ended")
                                .action(ArgAction::SetTrue)
                                .help("Remove the end date"),
                        ),
                )
                .subcommand(
                    Command::new("status")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .value_parser(value_parser!(i64))
                                .help("Single budget; all budgets when omitted"),
                        )
                        .args(json_flags()),
                )
                .subcommand(Command::new("rm").arg(id_arg("id", "Budget id"))),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregations over the transaction log")
                .subcommand(date_range(Command::new("summary")))
                .subcommand(date_range(Command::new("monthly"))),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check stored balances against the transaction log")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite drifted balances"),
                ),
        )
}
