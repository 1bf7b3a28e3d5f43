// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use pocketledger::{Store, cli, commands, config::Config, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("warn");
    logging::init(level);

    let config = Config::from_matches(&matches)?;
    let mut store = Store::open_with(&config)
        .with_context(|| format!("Open ledger at {}", config.db_path.display()))?;
    let user = config.user_id;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Ledger initialized at {}", config.db_path.display());
        }
        Some(("account", sub)) => commands::accounts::handle(&mut store, user, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut store, user, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut store, user, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut store, user, sub)?,
        Some(("report", sub)) => commands::reports::handle(store.conn(), user, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&mut store, user, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    tracing::debug!("done");
    Ok(())
}
