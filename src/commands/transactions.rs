// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Store;
use crate::ledger::transactions;
use crate::models::{
    NewTransaction, Transaction, TransactionFilter, TransactionType, TransactionUpdate,
};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, parse_timestamp, pretty_table};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(store: &mut Store, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, user_id, sub)?,
        Some(("list", sub)) => list(store.conn(), user_id, sub)?,
        Some(("show", sub)) => show(store.conn(), user_id, sub)?,
        Some(("edit", sub)) => edit(store, user_id, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let removed = transactions::delete(store, user_id, id)?;
            println!(
                "Deleted {} #{} of {} {}",
                removed.r#type, removed.id, removed.amount, removed.currency
            );
        }
        _ => {}
    }
    Ok(())
}

fn add(store: &mut Store, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let transaction_date = match sub.get_one::<String>("date") {
        Some(d) => parse_timestamp(d)?,
        None => Utc::now(),
    };
    let input = NewTransaction {
        account_id: *sub.get_one::<i64>("account").unwrap(),
        category_id: sub.get_one::<i64>("category").copied(),
        r#type: sub.get_one::<String>("type").unwrap().parse::<TransactionType>()?,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        currency: sub
            .get_one::<String>("currency")
            .cloned()
            .unwrap_or_default(),
        description: sub.get_one::<String>("description").cloned(),
        transaction_date,
        to_account_id: sub.get_one::<i64>("to").copied(),
        notes: sub.get_one::<String>("note").cloned(),
    };
    let tx = transactions::create(store, user_id, input)?;
    println!(
        "Recorded {} #{} of {} {} on {}",
        tx.r#type,
        tx.id,
        tx.amount,
        tx.currency,
        tx.transaction_date.format("%Y-%m-%d")
    );
    Ok(())
}

fn edit(store: &mut Store, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let current = transactions::get(store.conn(), user_id, id)?;
    let mut changes = TransactionUpdate::from(&current);
    if let Some(cat) = sub.get_one::<i64>("category") {
        changes.category_id = Some(*cat);
    }
    if sub.get_flag("clear-category") {
        changes.category_id = None;
    }
    if let Some(d) = sub.get_one::<String>("description") {
        changes.description = Some(d.clone());
    }
    if let Some(d) = sub.get_one::<String>("date") {
        changes.transaction_date = parse_timestamp(d)?;
    }
    if let Some(n) = sub.get_one::<String>("note") {
        changes.notes = Some(n.clone());
    }
    let tx = transactions::update(store, user_id, id, changes)?;
    println!("Updated transaction #{}", tx.id);
    Ok(())
}

fn show(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let tx = transactions::get(conn, user_id, id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tx)? {
        println!("{}", render(&[tx]));
    }
    Ok(())
}

fn list(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, user_id, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!("{}", render(&data));
    }
    Ok(())
}

fn opt<'a>(sub: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    sub.get_one::<String>(name).map(|s| s.as_str())
}

pub fn filter_from_matches(sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    Ok(TransactionFilter {
        account_id: sub.get_one::<i64>("account").copied(),
        category_id: sub.get_one::<i64>("category").copied(),
        r#type: opt(sub, "type").map(str::parse::<TransactionType>).transpose()?,
        start_date: opt(sub, "from").map(parse_date).transpose()?,
        end_date: opt(sub, "until").map(parse_date).transpose()?,
        min_amount: opt(sub, "min").map(parse_decimal).transpose()?,
        max_amount: opt(sub, "max").map(parse_decimal).transpose()?,
        limit: sub.get_one::<usize>("limit").copied(),
        offset: sub.get_one::<usize>("offset").copied(),
    })
}

pub fn query_rows(
    conn: &Connection,
    user_id: i64,
    sub: &clap::ArgMatches,
) -> Result<Vec<Transaction>> {
    let filter = filter_from_matches(sub)?;
    Ok(transactions::list(conn, user_id, &filter)?)
}

fn render(data: &[Transaction]) -> comfy_table::Table {
    let rows = data
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.transaction_date.format("%Y-%m-%d %H:%M").to_string(),
                t.r#type.to_string(),
                t.account_id.to_string(),
                t.to_account_id.map(|a| a.to_string()).unwrap_or_default(),
                format!("{:.2}", t.amount),
                t.currency.clone(),
                t.category_id.map(|c| c.to_string()).unwrap_or_default(),
                t.description.clone().unwrap_or_default(),
                t.notes.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(
        &[
            "ID", "Date", "Type", "Account", "To", "Amount", "CCY", "Category", "Description",
            "Note",
        ],
        rows,
    )
}
