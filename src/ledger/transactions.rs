// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The transaction engine.
//!
//! Create and delete write the transaction row and its balance effect in one
//! atomic unit. Update touches descriptive fields only, so it never needs to
//! revisit balances.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::{accounts, balance, categories};
use crate::db::Store;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    NewTransaction, Transaction, TransactionFilter, TransactionType, TransactionUpdate,
};
use crate::utils::{col_decimal, col_enum, col_ts, day_after, day_start, fmt_ts, now_ts};

pub const DEFAULT_PAGE_SIZE: usize = 50;

const COLUMNS: &str = "id, user_id, account_id, category_id, type, amount, currency, description, \
                       transaction_date, to_account_id, notes, created_at, updated_at";

fn map_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        account_id: r.get(2)?,
        category_id: r.get(3)?,
        r#type: col_enum(r, 4)?,
        amount: col_decimal(r, 5)?,
        currency: r.get(6)?,
        description: r.get(7)?,
        transaction_date: col_ts(r, 8)?,
        to_account_id: r.get(9)?,
        notes: r.get(10)?,
        created_at: col_ts(r, 11)?,
        updated_at: col_ts(r, 12)?,
    })
}

/// Shape checks that need no store access.
fn validate(input: &NewTransaction) -> LedgerResult<()> {
    if input.account_id <= 0 {
        return Err(LedgerError::invalid("account_id is required"));
    }
    if input.amount.is_zero() {
        return Err(LedgerError::invalid("amount must be non-zero"));
    }
    match (input.r#type, input.to_account_id) {
        (TransactionType::Transfer, None) => Err(LedgerError::invalid(
            "to_account_id is required for transfers",
        )),
        (TransactionType::Transfer, Some(to)) if to == input.account_id => Err(
            LedgerError::invalid("cannot transfer to the same account"),
        ),
        (TransactionType::Income | TransactionType::Expense, Some(_)) => Err(
            LedgerError::invalid("to_account_id is only valid for transfers"),
        ),
        _ => Ok(()),
    }
}

pub fn create(store: &mut Store, user_id: i64, input: NewTransaction) -> LedgerResult<Transaction> {
    validate(&input)?;
    let amount = input.amount.abs().normalize();

    let unit = store.unit()?;
    let account = accounts::get(&unit, user_id, input.account_id)?;
    if let Some(to) = input.to_account_id {
        accounts::get(&unit, user_id, to)?;
    }
    if let Some(cat) = input.category_id {
        categories::get(&unit, user_id, cat)?;
    }
    let currency = match input.currency.trim() {
        "" => account.currency.clone(),
        c => c.to_uppercase(),
    };

    let now = now_ts();
    unit.execute(
        "INSERT INTO transactions(user_id, account_id, category_id, type, amount, currency,
                                  description, transaction_date, to_account_id, notes,
                                  created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            user_id,
            input.account_id,
            input.category_id,
            input.r#type.as_str(),
            amount.to_string(),
            currency,
            input.description,
            fmt_ts(&input.transaction_date),
            input.to_account_id,
            input.notes,
            now
        ],
    )?;
    let id = unit.last_insert_rowid();

    let deltas = balance::deltas_for(input.r#type, amount, input.account_id, input.to_account_id)?;
    balance::apply_all(&unit, &deltas)?;

    let created = get(&unit, user_id, id)?;
    unit.commit()?;
    tracing::info!(
        user_id,
        transaction_id = id,
        kind = %created.r#type,
        amount = %created.amount,
        account_id = created.account_id,
        "transaction created"
    );
    Ok(created)
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Transaction> {
    let sql = format!("SELECT {COLUMNS} FROM transactions WHERE id=?1 AND user_id=?2");
    conn.query_row(&sql, params![id, user_id], map_row)
        .optional()?
        .ok_or_else(|| LedgerError::transaction_not_found(id))
}

/// Rewrite the non-financial fields. Amount, type and accounts are fixed at
/// creation, so balances are never touched here.
pub fn update(
    store: &mut Store,
    user_id: i64,
    id: i64,
    changes: TransactionUpdate,
) -> LedgerResult<Transaction> {
    let unit = store.unit()?;
    get(&unit, user_id, id)?;
    if let Some(cat) = changes.category_id {
        categories::get(&unit, user_id, cat)?;
    }
    unit.execute(
        "UPDATE transactions
         SET category_id=?1, description=?2, transaction_date=?3, notes=?4, updated_at=?5
         WHERE id=?6 AND user_id=?7",
        params![
            changes.category_id,
            changes.description,
            fmt_ts(&changes.transaction_date),
            changes.notes,
            now_ts(),
            id,
            user_id
        ],
    )?;
    let updated = get(&unit, user_id, id)?;
    unit.commit()?;
    tracing::info!(user_id, transaction_id = id, "transaction updated");
    Ok(updated)
}

/// Reverse the transaction's balance effect and remove it. Returns the removed row.
pub fn delete(store: &mut Store, user_id: i64, id: i64) -> LedgerResult<Transaction> {
    let unit = store.unit()?;
    let existing = get(&unit, user_id, id)?;
    let deltas = balance::deltas_for(
        existing.r#type,
        existing.amount,
        existing.account_id,
        existing.to_account_id,
    )?;
    balance::apply_all(&unit, &balance::reversal(&deltas))?;
    unit.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    unit.commit()?;
    tracing::info!(
        user_id,
        transaction_id = id,
        kind = %existing.r#type,
        amount = %existing.amount,
        "transaction deleted"
    );
    Ok(existing)
}

/// Filtered, paginated listing ordered by date then id, newest first.
pub fn list(
    conn: &Connection,
    user_id: i64,
    filter: &TransactionFilter,
) -> LedgerResult<Vec<Transaction>> {
    let mut sql = format!("SELECT {COLUMNS} FROM transactions WHERE user_id=?");
    let mut args: Vec<Value> = vec![Value::Integer(user_id)];

    if let Some(acct) = filter.account_id {
        sql.push_str(" AND account_id=?");
        args.push(Value::Integer(acct));
    }
    if let Some(cat) = filter.category_id {
        sql.push_str(" AND category_id=?");
        args.push(Value::Integer(cat));
    }
    if let Some(kind) = filter.r#type {
        sql.push_str(" AND type=?");
        args.push(Value::Text(kind.as_str().into()));
    }
    if let (Some(s), Some(e)) = (filter.start_date, filter.end_date) {
        if s > e {
            return Err(LedgerError::invalid("start_date must not be after end_date"));
        }
    }
    if let Some(start) = filter.start_date {
        sql.push_str(" AND transaction_date>=?");
        args.push(Value::Text(fmt_ts(&day_start(start))));
    }
    if let Some(end) = filter.end_date {
        sql.push_str(" AND transaction_date<?");
        args.push(Value::Text(fmt_ts(&day_after(end)?)));
    }
    if let (Some(lo), Some(hi)) = (filter.min_amount, filter.max_amount) {
        if lo > hi {
            return Err(LedgerError::invalid("min_amount must not exceed max_amount"));
        }
    }
    // Both sides go through SQLite's own text-to-real conversion.
    if let Some(lo) = filter.min_amount {
        sql.push_str(" AND CAST(amount AS REAL)>=CAST(? AS REAL)");
        args.push(Value::Text(decimal_arg(lo)));
    }
    if let Some(hi) = filter.max_amount {
        sql.push_str(" AND CAST(amount AS REAL)<=CAST(? AS REAL)");
        args.push(Value::Text(decimal_arg(hi)));
    }

    sql.push_str(" ORDER BY transaction_date DESC, id DESC LIMIT ? OFFSET ?");
    let limit = match filter.limit {
        Some(0) => return Err(LedgerError::invalid("limit must be positive")),
        Some(n) => n,
        None => DEFAULT_PAGE_SIZE,
    };
    args.push(Value::Integer(to_i64(limit)?));
    args.push(Value::Integer(to_i64(filter.offset.unwrap_or(0))?));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), map_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn decimal_arg(d: Decimal) -> String {
    d.normalize().to_string()
}

fn to_i64(n: usize) -> LedgerResult<i64> {
    i64::try_from(n).map_err(|_| LedgerError::invalid(format!("{} is out of range", n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn input(kind: TransactionType, amount: i64, to: Option<i64>) -> NewTransaction {
        NewTransaction {
            account_id: 1,
            category_id: None,
            r#type: kind,
            amount: Decimal::new(amount, 0),
            currency: "USD".into(),
            description: None,
            transaction_date: Utc::now(),
            to_account_id: to,
            notes: None,
        }
    }

    #[test]
    fn zero_amount_is_rejected() {
        let err = validate(&input(TransactionType::Expense, 0, None)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn transfer_needs_distinct_destination() {
        assert!(validate(&input(TransactionType::Transfer, 10, None)).is_err());
        assert!(validate(&input(TransactionType::Transfer, 10, Some(1))).is_err());
        assert!(validate(&input(TransactionType::Transfer, 10, Some(2))).is_ok());
    }

    #[test]
    fn destination_only_for_transfers() {
        assert!(validate(&input(TransactionType::Income, 10, Some(2))).is_err());
        assert!(validate(&input(TransactionType::Income, 10, None)).is_ok());
    }
}
