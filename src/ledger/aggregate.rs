// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only reporting over the transaction log.
//!
//! These run outside any atomic unit and see whatever the store has committed
//! at the time of the query. Sums are folded in Rust so money stays exact.

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

use super::budgets;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetStatus, CategorySummary, MonthlyBalance, TransactionType};
use crate::utils::{add_money, col_decimal, col_enum, day_after, day_start, fmt_ts};

/// Half-open `[from, until)` timestamp bounds for an inclusive day range.
fn day_window(start: NaiveDate, end: NaiveDate) -> LedgerResult<(String, String)> {
    if start > end {
        return Err(LedgerError::invalid("start date must not be after end date"));
    }
    Ok((fmt_ts(&day_start(start)), fmt_ts(&day_after(end)?)))
}

/// Income and expense totals per (category, type) in `[start, end]`, largest first.
pub fn category_summary(
    conn: &Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> LedgerResult<Vec<CategorySummary>> {
    let (from, until) = day_window(start, end)?;
    let mut stmt = conn.prepare(
        "SELECT t.category_id, c.name, t.type, t.amount
         FROM transactions t
         LEFT JOIN categories c ON t.category_id=c.id AND c.user_id=t.user_id
         WHERE t.user_id=?1
           AND t.transaction_date>=?2 AND t.transaction_date<?3
           AND t.type IN ('income','expense')",
    )?;
    let rows = stmt.query_map(params![user_id, from, until], |r| {
        Ok((
            r.get::<_, Option<i64>>(0)?,
            r.get::<_, Option<String>>(1)?,
            col_enum::<TransactionType>(r, 2)?,
            col_decimal(r, 3)?,
        ))
    })?;

    let mut groups: BTreeMap<(Option<i64>, TransactionType), CategorySummary> = BTreeMap::new();
    for row in rows {
        let (category_id, category_name, kind, amount) = row?;
        let entry = groups
            .entry((category_id, kind))
            .or_insert_with(|| CategorySummary {
                category_id,
                category_name,
                r#type: kind,
                total_amount: Decimal::ZERO,
                count: 0,
            });
        entry.total_amount = add_money(entry.total_amount, amount)?;
        entry.count += 1;
    }

    let mut items: Vec<CategorySummary> = groups.into_values().collect();
    // Uncategorised groups sort after named ones on equal totals.
    items.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.category_id.is_none().cmp(&b.category_id.is_none()))
            .then_with(|| a.category_id.cmp(&b.category_id))
            .then_with(|| a.r#type.cmp(&b.r#type))
    });
    Ok(items)
}

/// Income, expense and net per calendar month in `[start, end]`, oldest first.
pub fn monthly_balance(
    conn: &Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> LedgerResult<Vec<MonthlyBalance>> {
    let (from, until) = day_window(start, end)?;
    let mut stmt = conn.prepare(
        "SELECT substr(transaction_date,1,7) AS month, type, amount
         FROM transactions
         WHERE user_id=?1
           AND transaction_date>=?2 AND transaction_date<?3
           AND type IN ('income','expense')",
    )?;
    let rows = stmt.query_map(params![user_id, from, until], |r| {
        Ok((
            r.get::<_, String>(0)?,
            col_enum::<TransactionType>(r, 1)?,
            col_decimal(r, 2)?,
        ))
    })?;

    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for row in rows {
        let (month, kind, amount) = row?;
        let entry = map.entry(month).or_insert((Decimal::ZERO, Decimal::ZERO));
        match kind {
            TransactionType::Income => entry.0 = add_money(entry.0, amount)?,
            TransactionType::Expense => entry.1 = add_money(entry.1, amount)?,
            TransactionType::Transfer => {}
        }
    }
    Ok(map
        .into_iter()
        .map(|(month, (income_total, expense_total))| MonthlyBalance {
            month,
            income_total,
            expense_total,
            balance: income_total - expense_total,
        })
        .collect())
}

/// Spending against one budget over its period: from the start date through
/// the end date, or through now when the budget is open-ended.
pub fn budget_status(
    conn: &Connection,
    user_id: i64,
    budget_id: i64,
) -> LedgerResult<BudgetStatus> {
    let budget = budgets::get(conn, user_id, budget_id)?;
    status_of(conn, budget)
}

/// Status of every budget the user owns, newest period first.
pub fn status_for_user(conn: &Connection, user_id: i64) -> LedgerResult<Vec<BudgetStatus>> {
    budgets::list(conn, user_id)?
        .into_iter()
        .map(|b| status_of(conn, b))
        .collect()
}

fn status_of(conn: &Connection, budget: Budget) -> LedgerResult<BudgetStatus> {
    let from = fmt_ts(&day_start(budget.start_date));
    let (until_sql, until) = match budget.end_date {
        Some(end) => ("transaction_date<?4", fmt_ts(&day_after(end)?)),
        None => ("transaction_date<=?4", fmt_ts(&Utc::now())),
    };
    let sql = format!(
        "SELECT amount FROM transactions
         WHERE user_id=?1 AND category_id=?2 AND type='expense'
           AND transaction_date>=?3 AND {until_sql}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![budget.user_id, budget.category_id, from, until],
        |r| col_decimal(r, 0),
    )?;
    let mut spent = Decimal::ZERO;
    for row in rows {
        spent = add_money(spent, row?)?;
    }

    let remaining = budget
        .amount
        .checked_sub(spent)
        .ok_or_else(|| LedgerError::invalid("budget remainder out of range"))?;
    let percentage = percent_of(spent, budget.amount);
    let is_exceeded = spent > budget.amount;
    Ok(BudgetStatus {
        budget,
        spent,
        remaining,
        percentage,
        is_exceeded,
    })
}

/// `spent` as a percentage of `amount`; 0 for a non-positive amount. Ratios
/// beyond the decimal range fall back to floating point.
fn percent_of(spent: Decimal, amount: Decimal) -> f64 {
    if amount <= Decimal::ZERO {
        return 0.0;
    }
    spent
        .checked_div(amount)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|p| p.to_f64())
        .unwrap_or_else(|| {
            let s = spent.to_f64().unwrap_or(0.0);
            let a = amount.to_f64().unwrap_or(f64::MIN_POSITIVE);
            s / a * 100.0
        })
}
