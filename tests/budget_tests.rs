// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketledger::Store;
use pocketledger::ledger::{accounts, aggregate, budgets, categories, transactions};
use pocketledger::models::{
    BudgetPeriod, CategoryType, NewAccount, NewBudget, NewCategory, NewTransaction,
    TransactionType,
};
use pocketledger::utils::parse_timestamp;
use rust_decimal::Decimal;

const USER: i64 = 1;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

struct Fixture {
    store: Store,
    account: i64,
    dining: i64,
    travel: i64,
}

fn expense_category(store: &mut Store, name: &str) -> i64 {
    categories::create(
        store,
        USER,
        NewCategory {
            name: name.into(),
            r#type: CategoryType::Expense,
            parent_id: None,
        },
    )
    .unwrap()
    .id
}

fn setup() -> Fixture {
    let mut store = Store::open_in_memory().unwrap();
    let account = accounts::create(
        &mut store,
        USER,
        NewAccount {
            name: "Card".into(),
            r#type: "credit".into(),
            currency: "USD".into(),
            initial_balance: Decimal::ZERO,
        },
    )
    .unwrap()
    .id;
    let dining = expense_category(&mut store, "Dining");
    let travel = expense_category(&mut store, "Travel");
    Fixture {
        store,
        account,
        dining,
        travel,
    }
}

fn spend(f: &mut Fixture, category: i64, kind: TransactionType, amount: &str, when: &str) {
    transactions::create(
        &mut f.store,
        USER,
        NewTransaction {
            account_id: f.account,
            category_id: Some(category),
            r#type: kind,
            amount: dec(amount),
            currency: "USD".into(),
            description: None,
            transaction_date: parse_timestamp(when).unwrap(),
            to_account_id: None,
            notes: None,
        },
    )
    .unwrap();
}

fn budget(f: &mut Fixture, category: i64, amount: &str, start: &str, end: Option<&str>) -> i64 {
    budgets::create(
        &mut f.store,
        USER,
        NewBudget {
            category_id: category,
            amount: dec(amount),
            period: BudgetPeriod::Monthly,
            start_date: date(start),
            end_date: end.map(date),
        },
    )
    .unwrap()
    .id
}

#[test]
fn overspent_monthly_budget() {
    let mut f = setup();
    let dining = f.dining;
    let id = budget(&mut f, dining, "1000", "2025-08-01", Some("2025-08-31"));
    spend(&mut f, dining, TransactionType::Expense, "700", "2025-08-03T12:00:00Z");
    spend(&mut f, dining, TransactionType::Expense, "500", "2025-08-31T23:00:00Z");

    let s = aggregate::budget_status(f.store.conn(), USER, id).unwrap();
    assert_eq!(s.spent, dec("1200"));
    assert_eq!(s.remaining, dec("-200"));
    assert_eq!(s.percentage, 120.0);
    assert!(s.is_exceeded);
}

#[test]
fn only_expenses_of_the_category_inside_the_window_count() {
    let mut f = setup();
    let (dining, travel) = (f.dining, f.travel);
    let id = budget(&mut f, dining, "200", "2025-08-01", Some("2025-08-31"));
    spend(&mut f, dining, TransactionType::Expense, "50", "2025-08-10T08:00:00Z");
    spend(&mut f, dining, TransactionType::Expense, "40", "2025-07-31T23:59:59Z");
    spend(&mut f, dining, TransactionType::Expense, "40", "2025-09-01T00:00:00Z");
    spend(&mut f, dining, TransactionType::Income, "30", "2025-08-11T08:00:00Z");
    spend(&mut f, travel, TransactionType::Expense, "99", "2025-08-12T08:00:00Z");

    let s = aggregate::budget_status(f.store.conn(), USER, id).unwrap();
    assert_eq!(s.spent, dec("50"));
    assert_eq!(s.remaining, dec("150"));
    assert_eq!(s.percentage, 25.0);
    assert!(!s.is_exceeded);
}

#[test]
fn open_ended_budget_runs_until_now() {
    let mut f = setup();
    let travel = f.travel;
    let id = budget(&mut f, travel, "300", "2024-01-01", None);
    spend(&mut f, travel, TransactionType::Expense, "300", "2024-06-01T00:00:00Z");
    spend(&mut f, travel, TransactionType::Expense, "1", "2999-01-01T00:00:00Z");

    let s = aggregate::budget_status(f.store.conn(), USER, id).unwrap();
    assert_eq!(s.spent, dec("300"));
    assert_eq!(s.remaining, Decimal::ZERO);
    assert!(!s.is_exceeded);
}

#[test]
fn zero_budget_reports_zero_percent() {
    let mut f = setup();
    let dining = f.dining;
    let id = budget(&mut f, dining, "0", "2025-08-01", Some("2025-08-31"));
    spend(&mut f, dining, TransactionType::Expense, "10", "2025-08-02T00:00:00Z");

    let s = aggregate::budget_status(f.store.conn(), USER, id).unwrap();
    assert_eq!(s.percentage, 0.0);
    assert!(s.is_exceeded);
}

#[test]
fn tiny_budget_percentage_does_not_overflow() {
    let mut f = setup();
    let dining = f.dining;
    let id = budget(&mut f, dining, "0.000000000000000000000001", "2025-08-01", None);
    spend(&mut f, dining, TransactionType::Expense, "1000000", "2025-08-02T00:00:00Z");

    let s = aggregate::budget_status(f.store.conn(), USER, id).unwrap();
    assert_eq!(s.spent, dec("1000000"));
    assert!(s.percentage.is_finite());
    assert!(s.percentage > 1e31);
    assert!(s.is_exceeded);
}

#[test]
fn raising_the_amount_changes_status() {
    let mut f = setup();
    let dining = f.dining;
    let id = budget(&mut f, dining, "100", "2025-08-01", Some("2025-08-31"));
    spend(&mut f, dining, TransactionType::Expense, "150", "2025-08-05T00:00:00Z");
    assert!(aggregate::budget_status(f.store.conn(), USER, id).unwrap().is_exceeded);

    let current = budgets::get(f.store.conn(), USER, id).unwrap();
    let mut changes = NewBudget::from(&current);
    changes.amount = dec("300");
    changes.period = BudgetPeriod::Yearly;
    let updated = budgets::update(&mut f.store, USER, id, changes).unwrap();
    assert_eq!(updated.amount, dec("300"));
    assert_eq!(updated.period, BudgetPeriod::Yearly);
    assert_eq!(updated.created_at, current.created_at);

    let s = aggregate::budget_status(f.store.conn(), USER, id).unwrap();
    assert_eq!(s.spent, dec("150"));
    assert_eq!(s.remaining, dec("150"));
    assert_eq!(s.percentage, 50.0);
    assert!(!s.is_exceeded);
}

#[test]
fn update_checks_window_and_ownership() {
    let mut f = setup();
    let dining = f.dining;
    let id = budget(&mut f, dining, "100", "2025-08-01", None);
    let current = budgets::get(f.store.conn(), USER, id).unwrap();

    let mut inverted = NewBudget::from(&current);
    inverted.end_date = Some(date("2025-07-01"));
    let err = budgets::update(&mut f.store, USER, id, inverted).unwrap_err();
    assert!(err.is_validation());

    let err = budgets::update(&mut f.store, USER + 1, id, NewBudget::from(&current)).unwrap_err();
    assert!(err.is_not_found());

    let foreign_cat = categories::create(
        &mut f.store,
        USER + 1,
        NewCategory {
            name: "Theirs".into(),
            r#type: CategoryType::Expense,
            parent_id: None,
        },
    )
    .unwrap();
    let mut moved = NewBudget::from(&current);
    moved.category_id = foreign_cat.id;
    let err = budgets::update(&mut f.store, USER, id, moved).unwrap_err();
    assert!(err.is_not_found());

    let unchanged = budgets::get(f.store.conn(), USER, id).unwrap();
    assert_eq!(unchanged.category_id, dining);
    assert_eq!(unchanged.end_date, None);
    assert_eq!(unchanged.updated_at, current.updated_at);
}

#[test]
fn budgets_of_other_users_are_not_found() {
    let mut f = setup();
    let dining = f.dining;
    let id = budget(&mut f, dining, "100", "2025-08-01", None);
    let err = aggregate::budget_status(f.store.conn(), USER + 1, id).unwrap_err();
    assert!(err.is_not_found());
    assert!(budgets::delete(&mut f.store, USER + 1, id).unwrap_err().is_not_found());
}

#[test]
fn end_before_start_is_rejected() {
    let mut f = setup();
    let err = budgets::create(
        &mut f.store,
        USER,
        NewBudget {
            category_id: f.dining,
            amount: dec("10"),
            period: BudgetPeriod::Yearly,
            start_date: date("2025-08-01"),
            end_date: Some(date("2025-07-01")),
        },
    )
    .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn status_for_user_covers_every_budget() {
    let mut f = setup();
    let (dining, travel) = (f.dining, f.travel);
    let older = budget(&mut f, dining, "100", "2025-01-01", Some("2025-01-31"));
    let newer = budget(&mut f, travel, "100", "2025-02-01", Some("2025-02-28"));
    let all = aggregate::status_for_user(f.store.conn(), USER).unwrap();
    let ids: Vec<i64> = all.iter().map(|s| s.budget.id).collect();
    assert_eq!(ids, vec![newer, older]);
}
