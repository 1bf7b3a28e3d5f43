// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params};

use super::categories;
use crate::db::Store;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, NewBudget};
use crate::utils::{col_date, col_decimal, col_enum, col_opt_date, col_ts, now_ts};

const COLUMNS: &str =
    "id, user_id, category_id, amount, period, start_date, end_date, created_at, updated_at";

fn map_row(r: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: r.get(0)?,
        user_id: r.get(1)?,
        category_id: r.get(2)?,
        amount: col_decimal(r, 3)?,
        period: col_enum(r, 4)?,
        start_date: col_date(r, 5)?,
        end_date: col_opt_date(r, 6)?,
        created_at: col_ts(r, 7)?,
        updated_at: col_ts(r, 8)?,
    })
}

fn check_window(input: &NewBudget) -> LedgerResult<()> {
    match input.end_date {
        Some(end) if end < input.start_date => Err(LedgerError::invalid(
            "end_date must not be before start_date",
        )),
        _ => Ok(()),
    }
}

pub fn create(store: &mut Store, user_id: i64, input: NewBudget) -> LedgerResult<Budget> {
    check_window(&input)?;
    categories::get(store.conn(), user_id, input.category_id)?;
    let now = now_ts();
    store.conn().execute(
        "INSERT INTO budgets(user_id, category_id, amount, period, start_date, end_date,
                             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            user_id,
            input.category_id,
            input.amount.normalize().to_string(),
            input.period.as_str(),
            input.start_date.to_string(),
            input.end_date.map(|d| d.to_string()),
            now
        ],
    )?;
    let id = store.conn().last_insert_rowid();
    tracing::info!(user_id, budget_id = id, category_id = input.category_id, "budget created");
    get(store.conn(), user_id, id)
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Budget> {
    let sql = format!("SELECT {COLUMNS} FROM budgets WHERE id=?1 AND user_id=?2");
    conn.query_row(&sql, params![id, user_id], map_row)
        .optional()?
        .ok_or_else(|| LedgerError::budget_not_found(id))
}

pub fn list(conn: &Connection, user_id: i64) -> LedgerResult<Vec<Budget>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM budgets WHERE user_id=?1 ORDER BY start_date DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], map_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Replace the budget's category, amount, period and window.
pub fn update(store: &mut Store, user_id: i64, id: i64, input: NewBudget) -> LedgerResult<Budget> {
    check_window(&input)?;
    let unit = store.unit()?;
    get(&unit, user_id, id)?;
    categories::get(&unit, user_id, input.category_id)?;
    unit.execute(
        "UPDATE budgets
         SET category_id=?1, amount=?2, period=?3, start_date=?4, end_date=?5, updated_at=?6
         WHERE id=?7 AND user_id=?8",
        params![
            input.category_id,
            input.amount.normalize().to_string(),
            input.period.as_str(),
            input.start_date.to_string(),
            input.end_date.map(|d| d.to_string()),
            now_ts(),
            id,
            user_id
        ],
    )?;
    let updated = get(&unit, user_id, id)?;
    unit.commit()?;
    tracing::info!(user_id, budget_id = id, amount = %updated.amount, "budget updated");
    Ok(updated)
}

pub fn delete(store: &mut Store, user_id: i64, id: i64) -> LedgerResult<()> {
    let removed = store.conn().execute(
        "DELETE FROM budgets WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if removed == 0 {
        return Err(LedgerError::budget_not_found(id));
    }
    tracing::info!(user_id, budget_id = id, "budget deleted");
    Ok(())
}
