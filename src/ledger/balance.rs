// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance maintenance.
//!
//! `current_balance` is a materialized aggregate of the transaction log. It is
//! only ever changed through [`apply_delta`], and only from inside the atomic
//! unit that writes or removes the transaction row implying the change.

use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::TransactionType;
use crate::utils::{add_money, now_ts};

/// A signed change to one account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub account_id: i64,
    pub amount: Decimal,
}

/// The balance effect of a transaction: income credits the account, expense
/// debits it, a transfer debits the source and credits the destination.
pub fn deltas_for(
    kind: TransactionType,
    amount: Decimal,
    account_id: i64,
    to_account_id: Option<i64>,
) -> LedgerResult<Vec<Delta>> {
    let magnitude = amount.abs();
    match kind {
        TransactionType::Income => Ok(vec![Delta {
            account_id,
            amount: magnitude,
        }]),
        TransactionType::Expense => Ok(vec![Delta {
            account_id,
            amount: -magnitude,
        }]),
        TransactionType::Transfer => {
            let to = to_account_id
                .ok_or_else(|| LedgerError::invalid("to_account_id is required for transfers"))?;
            Ok(vec![
                Delta {
                    account_id,
                    amount: -magnitude,
                },
                Delta {
                    account_id: to,
                    amount: magnitude,
                },
            ])
        }
    }
}

/// Mirror image of `deltas`, used to undo a transaction's effect.
pub fn reversal(deltas: &[Delta]) -> Vec<Delta> {
    deltas
        .iter()
        .map(|d| Delta {
            account_id: d.account_id,
            amount: -d.amount,
        })
        .collect()
}

/// `current_balance += delta` on one account, returning the new balance.
///
/// `conn` must be the open unit of the owning transaction write. No business
/// validation happens here; the caller supplies the sign.
pub fn apply_delta(conn: &Connection, account_id: i64, delta: Decimal) -> LedgerResult<Decimal> {
    let current: Option<String> = conn
        .query_row(
            "SELECT current_balance FROM accounts WHERE id=?1",
            params![account_id],
            |r| r.get(0),
        )
        .optional()?;
    let current = current.ok_or_else(|| LedgerError::account_not_found(account_id))?;
    let current = current.parse::<Decimal>().map_err(|e| {
        LedgerError::Persistence(rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(e),
        ))
    })?;
    let next = add_money(current, delta).map_err(|_| {
        LedgerError::invalid(format!("balance of account {} out of range", account_id))
    })?;
    conn.execute(
        "UPDATE accounts SET current_balance=?1, updated_at=?2 WHERE id=?3",
        params![next.normalize().to_string(), now_ts(), account_id],
    )?;
    tracing::debug!(account_id, %delta, balance = %next, "balance adjusted");
    Ok(next)
}

pub fn apply_all(conn: &Connection, deltas: &[Delta]) -> LedgerResult<()> {
    for d in deltas {
        apply_delta(conn, d.account_id, d.amount)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_moves_money_between_two_accounts() {
        let d = deltas_for(TransactionType::Transfer, Decimal::new(300, 0), 1, Some(2)).unwrap();
        assert_eq!(
            d,
            vec![
                Delta {
                    account_id: 1,
                    amount: Decimal::new(-300, 0)
                },
                Delta {
                    account_id: 2,
                    amount: Decimal::new(300, 0)
                },
            ]
        );
        let net: Decimal = d.iter().map(|x| x.amount).sum();
        assert!(net.is_zero());
    }

    #[test]
    fn reversal_negates_each_delta() {
        let d = deltas_for(TransactionType::Expense, Decimal::new(200, 0), 7, None).unwrap();
        let r = reversal(&d);
        assert_eq!(
            r,
            vec![Delta {
                account_id: 7,
                amount: Decimal::new(200, 0)
            }]
        );
    }

    #[test]
    fn transfer_without_destination_is_rejected() {
        let err = deltas_for(TransactionType::Transfer, Decimal::ONE, 1, None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn sign_comes_from_type_not_amount() {
        let d = deltas_for(TransactionType::Income, Decimal::new(-50, 0), 3, None).unwrap();
        assert_eq!(d[0].amount, Decimal::new(50, 0));
    }
}
