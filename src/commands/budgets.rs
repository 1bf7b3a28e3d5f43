// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Store;
use crate::ledger::{aggregate, budgets};
use crate::models::{BudgetPeriod, BudgetStatus, NewBudget};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle(store: &mut Store, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, user_id, sub)?,
        Some(("list", sub)) => list(store, user_id, sub)?,
        Some(("edit", sub)) => edit(store, user_id, sub)?,
        Some(("status", sub)) => status(store, user_id, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            budgets::delete(store, user_id, id)?;
            println!("Removed budget #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(store: &mut Store, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let input = NewBudget {
        category_id: *sub.get_one::<i64>("category").unwrap(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        period: sub.get_one::<String>("period").unwrap().parse::<BudgetPeriod>()?,
        start_date: parse_date(sub.get_one::<String>("start").unwrap())?,
        end_date: sub
            .get_one::<String>("end")
            .map(|s| parse_date(s))
            .transpose()?,
    };
    let b = budgets::create(store, user_id, input)?;
    println!(
        "Budget #{} set: {} {} from {}",
        b.id,
        b.amount,
        b.period.as_str(),
        b.start_date
    );
    Ok(())
}

fn edit(store: &mut Store, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let current = budgets::get(store.conn(), user_id, id)?;
    let mut changes = NewBudget::from(&current);
    if let Some(cat) = sub.get_one::<i64>("category") {
        changes.category_id = *cat;
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        changes.amount = parse_decimal(a)?;
    }
    if let Some(p) = sub.get_one::<String>("period") {
        changes.period = p.parse::<BudgetPeriod>()?;
    }
    if let Some(d) = sub.get_one::<String>("start") {
        changes.start_date = parse_date(d)?;
    }
    if let Some(d) = sub.get_one::<String>("end") {
        changes.end_date = Some(parse_date(d)?);
    }
    if sub.get_flag("open-ended") {
        changes.end_date = None;
    }
    let b = budgets::update(store, user_id, id, changes)?;
    println!("Updated budget #{}: {} {}", b.id, b.amount, b.period.as_str());
    Ok(())
}

fn list(store: &Store, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let data = budgets::list(store.conn(), user_id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.category_id.to_string(),
                    format!("{:.2}", b.amount),
                    b.period.as_str().to_string(),
                    b.start_date.to_string(),
                    b.end_date.map(|d| d.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Category", "Amount", "Period", "Start", "End"], rows)
        );
    }
    Ok(())
}

fn status(store: &Store, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let data: Vec<BudgetStatus> = match sub.get_one::<i64>("id") {
        Some(id) => vec![aggregate::budget_status(store.conn(), user_id, *id)?],
        None => aggregate::status_for_user(store.conn(), user_id)?,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.budget.id.to_string(),
                    s.budget.category_id.to_string(),
                    format!("{:.2}", s.budget.amount),
                    format!("{:.2}", s.spent),
                    format!("{:.2}", s.remaining),
                    format!("{:.1}%", s.percentage),
                    if s.is_exceeded { "EXCEEDED" } else { "" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Category", "Budget", "Spent", "Remaining", "Used", ""],
                rows
            )
        );
    }
    Ok(())
}
