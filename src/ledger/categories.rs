// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::db::Store;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryType, NewCategory};
use crate::utils::{col_enum, col_ts, now_ts};

const COLUMNS: &str = "id, user_id, name, type, parent_id, is_active, created_at, updated_at";

fn map_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        r#type: col_enum(r, 3)?,
        parent_id: r.get(4)?,
        is_active: r.get(5)?,
        created_at: col_ts(r, 6)?,
        updated_at: col_ts(r, 7)?,
    })
}

/// `parent_id` is stored as given; the hierarchy is not checked for existence,
/// ownership or cycles.
pub fn create(store: &mut Store, user_id: i64, input: NewCategory) -> LedgerResult<Category> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(LedgerError::invalid("category name is required"));
    }
    let now = now_ts();
    store.conn().execute(
        "INSERT INTO categories(user_id, name, type, parent_id, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
        params![user_id, name, input.r#type.as_str(), input.parent_id, now],
    )?;
    let id = store.conn().last_insert_rowid();
    tracing::info!(user_id, category_id = id, "category created");
    get(store.conn(), user_id, id)
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Category> {
    let sql = format!("SELECT {COLUMNS} FROM categories WHERE id=?1 AND user_id=?2");
    conn.query_row(&sql, params![id, user_id], map_row)
        .optional()?
        .ok_or_else(|| LedgerError::category_not_found(id))
}

pub fn list(
    conn: &Connection,
    user_id: i64,
    r#type: Option<CategoryType>,
) -> LedgerResult<Vec<Category>> {
    let mut sql = format!("SELECT {COLUMNS} FROM categories WHERE user_id=?1");
    if r#type.is_some() {
        sql.push_str(" AND type=?2");
    }
    sql.push_str(" ORDER BY name ASC, id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = match r#type {
        Some(t) => stmt.query_map(params![user_id, t.as_str()], map_row)?,
        None => stmt.query_map(params![user_id], map_row)?,
    };
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
