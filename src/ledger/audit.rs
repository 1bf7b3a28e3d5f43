// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Checks that every stored balance still matches the transaction log.

use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use super::{accounts, balance};
use crate::db::Store;
use crate::error::LedgerResult;
use crate::models::{Account, BalanceDrift, TransactionType};
use crate::utils::{add_money, col_decimal, col_enum, now_ts};

/// `initial_balance` plus the signed effect of every existing transaction
/// that touches the account.
pub fn expected_balance(conn: &Connection, account: &Account) -> LedgerResult<Decimal> {
    let mut stmt = conn.prepare(
        "SELECT type, amount, account_id, to_account_id FROM transactions
         WHERE account_id=?1 OR to_account_id=?1",
    )?;
    let rows = stmt.query_map(params![account.id], |r| {
        Ok((
            col_enum::<TransactionType>(r, 0)?,
            col_decimal(r, 1)?,
            r.get::<_, i64>(2)?,
            r.get::<_, Option<i64>>(3)?,
        ))
    })?;
    let mut total = account.initial_balance;
    for row in rows {
        let (kind, amount, from, to) = row?;
        for d in balance::deltas_for(kind, amount, from, to)? {
            if d.account_id == account.id {
                total = add_money(total, d.amount)?;
            }
        }
    }
    Ok(total)
}

/// Accounts of `user_id` whose stored balance disagrees with the log.
pub fn verify_balances(conn: &Connection, user_id: i64) -> LedgerResult<Vec<BalanceDrift>> {
    let mut drift = Vec::new();
    for account in accounts::list(conn, user_id)? {
        let expected = expected_balance(conn, &account)?;
        if expected != account.current_balance {
            tracing::warn!(
                account_id = account.id,
                stored = %account.current_balance,
                %expected,
                "balance drift"
            );
            drift.push(BalanceDrift {
                account_id: account.id,
                account_name: account.name,
                stored: account.current_balance,
                expected,
            });
        }
    }
    Ok(drift)
}

/// Overwrite one account's stored balance with the recomputed value.
pub fn rebuild_balance(store: &mut Store, user_id: i64, account_id: i64) -> LedgerResult<Decimal> {
    let unit = store.unit()?;
    let account = accounts::get(&unit, user_id, account_id)?;
    let expected = expected_balance(&unit, &account)?;
    unit.execute(
        "UPDATE accounts SET current_balance=?1, updated_at=?2 WHERE id=?3",
        params![expected.normalize().to_string(), now_ts(), account_id],
    )?;
    unit.commit()?;
    tracing::info!(user_id, account_id, balance = %expected, "balance rebuilt");
    Ok(expected)
}
