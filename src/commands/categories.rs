// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Store;
use crate::ledger::categories;
use crate::models::{CategoryType, NewCategory};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(store: &mut Store, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewCategory {
                name: sub.get_one::<String>("name").unwrap().to_string(),
                r#type: sub.get_one::<String>("type").unwrap().parse::<CategoryType>()?,
                parent_id: sub.get_one::<i64>("parent").copied(),
            };
            let cat = categories::create(store, user_id, input)?;
            println!("Added category #{} '{}'", cat.id, cat.name);
        }
        Some(("list", sub)) => {
            let typ = sub
                .get_one::<String>("type")
                .map(|s| s.parse::<CategoryType>())
                .transpose()?;
            let data = categories::list(store.conn(), user_id, typ)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            c.name.clone(),
                            c.r#type.as_str().to_string(),
                            c.parent_id.map(|p| p.to_string()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Category", "Type", "Parent"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
