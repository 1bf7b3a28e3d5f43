// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use crate::config::{Config, DEFAULT_BUSY_TIMEOUT_MS};
use crate::error::LedgerResult;

/// The durable ledger store: one SQLite connection, opened at startup and
/// dropped at shutdown. Every mutating engine call runs inside a [`Store::unit`].
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path, busy_timeout: Duration) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        // WAL lets aggregation reads proceed against the last committed state
        // while a writer holds the lock.
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |r| r.get(0))?;
        let mut store = Self { conn };
        store.init_schema()?;
        tracing::debug!(path = %path.display(), "opened ledger store");
        Ok(store)
    }

    pub fn open_with(config: &Config) -> LedgerResult<Self> {
        Self::open(&config.db_path, config.busy_timeout)
    }

    pub fn open_in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
        let mut store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Read access for snapshot queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin an atomic unit. The write lock is taken immediately, so units that
    /// touch the same rows serialize here; dropping the unit without
    /// `commit()` discards every statement executed through it.
    pub fn unit(&mut self) -> LedgerResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    fn init_schema(&mut self) -> LedgerResult<()> {
        self.conn.execute_batch(
            r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        currency TEXT NOT NULL,
        initial_balance TEXT NOT NULL,
        current_balance TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_accounts_user ON accounts(user_id);

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        parent_id INTEGER, -- unchecked self-reference
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        account_id INTEGER NOT NULL,
        category_id INTEGER,
        type TEXT NOT NULL CHECK(type IN ('income','expense','transfer')),
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        description TEXT,
        transaction_date TEXT NOT NULL,
        to_account_id INTEGER,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id),
        FOREIGN KEY(to_account_id) REFERENCES accounts(id),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, transaction_date);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_to_account ON transactions(to_account_id);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        period TEXT NOT NULL CHECK(period IN ('monthly','yearly')),
        start_date TEXT NOT NULL,
        end_date TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_budgets_user ON budgets(user_id);
    "#,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_init_is_idempotent() {
        let mut store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        let n: i64 = store
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('accounts','categories','transactions','budgets')",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(n, 4);
    }

    #[test]
    fn dropped_unit_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        {
            let unit = store.unit().unwrap();
            unit.execute(
                "INSERT INTO categories(user_id, name, type, created_at, updated_at) VALUES (1, 'x', 'expense', 'a', 'a')",
                [],
            )
            .unwrap();
        }
        let n: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }
}
