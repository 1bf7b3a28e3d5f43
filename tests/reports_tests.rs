// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketledger::Store;
use pocketledger::ledger::{accounts, aggregate, categories, transactions};
use pocketledger::models::{
    CategoryType, NewAccount, NewCategory, NewTransaction, TransactionType,
};
use pocketledger::utils::parse_timestamp;
use rust_decimal::Decimal;

const USER: i64 = 1;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (Store, i64, i64, i64) {
    let mut store = Store::open_in_memory().unwrap();
    let acct = accounts::create(
        &mut store,
        USER,
        NewAccount {
            name: "Checking".into(),
            r#type: "bank".into(),
            currency: "EUR".into(),
            initial_balance: dec("1000"),
        },
    )
    .unwrap()
    .id;
    let food = categories::create(
        &mut store,
        USER,
        NewCategory {
            name: "Food".into(),
            r#type: CategoryType::Expense,
            parent_id: None,
        },
    )
    .unwrap()
    .id;
    let salary = categories::create(
        &mut store,
        USER,
        NewCategory {
            name: "Salary".into(),
            r#type: CategoryType::Income,
            parent_id: Some(4242),
        },
    )
    .unwrap()
    .id;
    (store, acct, food, salary)
}

fn record(
    store: &mut Store,
    account: i64,
    entries: &[(Option<i64>, TransactionType, &str, &str)],
) {
    for &(category, kind, amount, when) in entries {
        transactions::create(
            store,
            USER,
            NewTransaction {
                account_id: account,
                category_id: category,
                r#type: kind,
                amount: dec(amount),
                currency: "EUR".into(),
                description: None,
                transaction_date: parse_timestamp(when).unwrap(),
                to_account_id: None,
                notes: None,
            },
        )
        .unwrap();
    }
}

fn march() -> (NaiveDate, NaiveDate) {
    (day(2025, 3, 1), day(2025, 3, 31))
}

#[test]
fn category_summary_groups_food_expenses() {
    let (mut store, acct, food, _) = setup();
    record(
        &mut store,
        acct,
        &[
            (Some(food), TransactionType::Expense, "30", "2025-03-02T10:00:00Z"),
            (Some(food), TransactionType::Expense, "70", "2025-03-20T18:00:00Z"),
        ],
    );

    let (from, to) = march();
    let s = aggregate::category_summary(store.conn(), USER, from, to).unwrap();
    assert_eq!(s.len(), 1);
    assert_eq!(s[0].category_id, Some(food));
    assert_eq!(s[0].category_name.as_deref(), Some("Food"));
    assert_eq!(s[0].r#type, TransactionType::Expense);
    assert_eq!(s[0].total_amount, dec("100"));
    assert_eq!(s[0].count, 2);
}

#[test]
fn category_summary_orders_by_total_and_keeps_uncategorized() {
    let (mut store, acct, food, salary) = setup();
    let savings = accounts::create(
        &mut store,
        USER,
        NewAccount {
            name: "Savings".into(),
            r#type: "bank".into(),
            currency: "EUR".into(),
            initial_balance: Decimal::ZERO,
        },
    )
    .unwrap()
    .id;
    record(
        &mut store,
        acct,
        &[
            (Some(salary), TransactionType::Income, "2500", "2025-03-01T00:00:00Z"),
            (Some(food), TransactionType::Expense, "45.50", "2025-03-05T00:00:00Z"),
            (None, TransactionType::Expense, "12", "2025-03-06T00:00:00Z"),
            // Last day is inclusive; the day after is not.
            (None, TransactionType::Expense, "3", "2025-03-31T23:59:59Z"),
            (None, TransactionType::Expense, "1000", "2025-04-01T00:00:00Z"),
        ],
    );
    transactions::create(
        &mut store,
        USER,
        NewTransaction {
            account_id: acct,
            category_id: None,
            r#type: TransactionType::Transfer,
            amount: dec("900"),
            currency: "EUR".into(),
            description: None,
            transaction_date: parse_timestamp("2025-03-07T00:00:00Z").unwrap(),
            to_account_id: Some(savings),
            notes: None,
        },
    )
    .unwrap();

    let (from, to) = march();
    let s = aggregate::category_summary(store.conn(), USER, from, to).unwrap();
    let shape: Vec<(Option<&str>, TransactionType, Decimal, u64)> = s
        .iter()
        .map(|g| (g.category_name.as_deref(), g.r#type, g.total_amount, g.count))
        .collect();
    assert_eq!(
        shape,
        vec![
            (Some("Salary"), TransactionType::Income, dec("2500"), 1),
            (Some("Food"), TransactionType::Expense, dec("45.50"), 1),
            (None, TransactionType::Expense, dec("15"), 2),
        ]
    );
}

#[test]
fn monthly_balance_is_chronological() {
    let (mut store, acct, food, salary) = setup();
    record(
        &mut store,
        acct,
        &[
            (Some(salary), TransactionType::Income, "2000", "2025-02-01T09:00:00Z"),
            (Some(food), TransactionType::Expense, "150.25", "2025-02-14T09:00:00Z"),
            (Some(food), TransactionType::Expense, "80", "2025-01-20T09:00:00Z"),
            (Some(salary), TransactionType::Income, "2000", "2025-03-01T09:00:00Z"),
        ],
    );

    let m = aggregate::monthly_balance(store.conn(), USER, day(2025, 1, 1), day(2025, 2, 28))
        .unwrap();
    assert_eq!(m.len(), 2);
    assert_eq!(m[0].month, "2025-01");
    assert_eq!(m[0].income_total, Decimal::ZERO);
    assert_eq!(m[0].expense_total, dec("80"));
    assert_eq!(m[0].balance, dec("-80"));
    assert_eq!(m[1].month, "2025-02");
    assert_eq!(m[1].income_total, dec("2000"));
    assert_eq!(m[1].expense_total, dec("150.25"));
    assert_eq!(m[1].balance, dec("1849.75"));
}

#[test]
fn reversed_range_is_rejected() {
    let (store, ..) = setup();
    let (from, to) = (day(2025, 3, 1), day(2025, 2, 1));
    let err = aggregate::monthly_balance(store.conn(), USER, from, to).unwrap_err();
    assert!(err.is_validation());
    let err = aggregate::category_summary(store.conn(), USER, from, to).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn other_users_see_nothing() {
    let (mut store, acct, food, _) = setup();
    record(
        &mut store,
        acct,
        &[(Some(food), TransactionType::Expense, "30", "2025-03-02T10:00:00Z")],
    );
    let (from, to) = march();
    let s = aggregate::category_summary(store.conn(), USER + 1, from, to).unwrap();
    assert!(s.is_empty());
}
