// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Store;
use crate::ledger::accounts;
use crate::models::NewAccount;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle(store: &mut Store, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewAccount {
                name: sub.get_one::<String>("name").unwrap().to_string(),
                r#type: sub.get_one::<String>("type").unwrap().to_string(),
                currency: sub.get_one::<String>("currency").unwrap().to_string(),
                initial_balance: parse_decimal(sub.get_one::<String>("initial").unwrap())?,
            };
            let acct = accounts::create(store, user_id, input)?;
            println!(
                "Added account #{} '{}' ({}, {})",
                acct.id,
                acct.name,
                acct.r#type,
                fmt_money(&acct.current_balance, &acct.currency)
            );
        }
        Some(("list", sub)) => {
            let data = accounts::list(store.conn(), user_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.name.clone(),
                            a.r#type.clone(),
                            a.currency.clone(),
                            format!("{:.2}", a.initial_balance),
                            format!("{:.2}", a.current_balance),
                            if a.is_active { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Name", "Type", "CCY", "Initial", "Balance", "Active"],
                        rows
                    )
                );
            }
        }
        Some(("rename", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let typ = sub.get_one::<String>("type").map(|s| s.as_str());
            let acct = accounts::rename(store, user_id, id, name, typ)?;
            println!("Account #{} is now '{}' ({})", acct.id, acct.name, acct.r#type);
        }
        Some(("activate", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            accounts::set_active(store, user_id, id, true)?;
            println!("Activated account #{}", id);
        }
        Some(("deactivate", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            accounts::set_active(store, user_id, id, false)?;
            println!("Deactivated account #{}", id);
        }
        _ => {}
    }
    Ok(())
}
