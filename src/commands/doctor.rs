// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Store;
use crate::ledger::audit;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(store: &mut Store, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    let drift = audit::verify_balances(store.conn(), user_id)?;
    if drift.is_empty() {
        println!("doctor: all balances match the transaction log");
        return Ok(());
    }

    let rows = drift
        .iter()
        .map(|d| {
            vec![
                format!("#{} {}", d.account_id, d.account_name),
                format!("{:.2}", d.stored),
                format!("{:.2}", d.expected),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Account", "Stored", "Expected"], rows));

    if m.get_flag("fix") {
        for d in &drift {
            let fixed = audit::rebuild_balance(store, user_id, d.account_id)?;
            println!("Rebuilt #{} to {:.2}", d.account_id, fixed);
        }
    }
    Ok(())
}
