// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::aggregate;
use crate::utils::{maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, user_id, sub)?,
        Some(("monthly", sub)) => monthly(conn, user_id, sub)?,
        _ => {}
    }
    Ok(())
}

fn range(sub: &clap::ArgMatches) -> Result<(NaiveDate, NaiveDate)> {
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    Ok((from, to))
}

fn summary(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let (from, to) = range(sub)?;
    let data = aggregate::category_summary(conn, user_id, from, to)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.category_name
                        .clone()
                        .unwrap_or_else(|| "(uncategorized)".into()),
                    s.r#type.to_string(),
                    format!("{:.2}", s.total_amount),
                    s.count.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Type", "Total", "Count"], rows));
    }
    Ok(())
}

fn monthly(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let (from, to) = range(sub)?;
    let data = aggregate::monthly_balance(conn, user_id, from, to)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|m| {
                vec![
                    m.month.clone(),
                    format!("{:.2}", m.income_total),
                    format!("{:.2}", m.expense_total),
                    format!("{:.2}", m.balance),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Income", "Expense", "Net"], rows));
    }
    Ok(())
}
