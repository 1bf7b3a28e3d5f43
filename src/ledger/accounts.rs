// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::db::Store;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, NewAccount};
use crate::utils::{col_decimal, col_ts, now_ts};

const COLUMNS: &str = "id, user_id, name, type, currency, initial_balance, current_balance, \
                       is_active, created_at, updated_at";

fn map_row(r: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        r#type: r.get(3)?,
        currency: r.get(4)?,
        initial_balance: col_decimal(r, 5)?,
        current_balance: col_decimal(r, 6)?,
        is_active: r.get(7)?,
        created_at: col_ts(r, 8)?,
        updated_at: col_ts(r, 9)?,
    })
}

pub fn create(store: &mut Store, user_id: i64, input: NewAccount) -> LedgerResult<Account> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(LedgerError::invalid("account name is required"));
    }
    let currency = input.currency.trim().to_uppercase();
    if currency.is_empty() {
        return Err(LedgerError::invalid("account currency is required"));
    }
    let now = now_ts();
    let balance = input.initial_balance.normalize().to_string();
    store.conn().execute(
        "INSERT INTO accounts(user_id, name, type, currency, initial_balance, current_balance,
                              is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5, 1, ?6, ?6)",
        params![user_id, name, input.r#type.trim(), currency, balance, now],
    )?;
    let id = store.conn().last_insert_rowid();
    tracing::info!(user_id, account_id = id, %currency, "account created");
    get(store.conn(), user_id, id)
}

/// Fetch an account owned by `user_id`. Foreign accounts are indistinguishable
/// from missing ones.
pub fn get(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Account> {
    let sql = format!("SELECT {COLUMNS} FROM accounts WHERE id=?1 AND user_id=?2");
    conn.query_row(&sql, params![id, user_id], map_row)
        .optional()?
        .ok_or_else(|| LedgerError::account_not_found(id))
}

pub fn list(conn: &Connection, user_id: i64) -> LedgerResult<Vec<Account>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM accounts WHERE user_id=?1 ORDER BY created_at DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], map_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Change descriptive fields only; balances and currency stay untouched.
pub fn rename(
    store: &mut Store,
    user_id: i64,
    id: i64,
    name: &str,
    r#type: Option<&str>,
) -> LedgerResult<Account> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::invalid("account name is required"));
    }
    let changed = store.conn().execute(
        "UPDATE accounts SET name=?1, type=COALESCE(?2, type), updated_at=?3
         WHERE id=?4 AND user_id=?5",
        params![name, r#type.map(str::trim), now_ts(), id, user_id],
    )?;
    if changed == 0 {
        return Err(LedgerError::account_not_found(id));
    }
    get(store.conn(), user_id, id)
}

pub fn set_active(store: &mut Store, user_id: i64, id: i64, active: bool) -> LedgerResult<Account> {
    let changed = store.conn().execute(
        "UPDATE accounts SET is_active=?1, updated_at=?2 WHERE id=?3 AND user_id=?4",
        params![active, now_ts(), id, user_id],
    )?;
    if changed == 0 {
        return Err(LedgerError::account_not_found(id));
    }
    tracing::info!(user_id, account_id = id, active, "account activity changed");
    get(store.conn(), user_id, id)
}
