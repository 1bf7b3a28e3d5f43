// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(LedgerError::invalid(format!(
                "type must be 'income', 'expense', or 'transfer', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for CategoryType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::invalid(format!(
                "category type must be 'income' or 'expense', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(LedgerError::invalid(format!(
                "period must be 'monthly' or 'yearly', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub r#type: String,
    pub currency: String,
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub r#type: CategoryType,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub r#type: TransactionType,
    /// Always a positive magnitude; the type carries the sign.
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub to_account_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account. The current balance starts at `initial_balance`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub r#type: String,
    pub currency: String,
    pub initial_balance: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub r#type: CategoryType,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub to_account_id: Option<i64>,
    pub notes: Option<String>,
}

/// The mutable, non-financial fields of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<&Transaction> for TransactionUpdate {
    fn from(t: &Transaction) -> Self {
        Self {
            category_id: t.category_id,
            description: t.description.clone(),
            transaction_date: t.transaction_date,
            notes: t.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub r#type: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category_id: i64,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl From<&Budget> for NewBudget {
    fn from(b: &Budget) -> Self {
        Self {
            category_id: b.category_id,
            amount: b.amount,
            period: b.period,
            start_date: b.start_date,
            end_date: b.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percentage: f64,
    pub is_exceeded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub r#type: TransactionType,
    pub total_amount: Decimal,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBalance {
    pub month: String, // YYYY-MM
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub balance: Decimal,
}

/// An account whose stored balance disagrees with its transaction log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceDrift {
    pub account_id: i64,
    pub account_name: String,
    pub stored: Decimal,
    pub expected: Decimal,
}
