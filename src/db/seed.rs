//! Development data generators for an otherwise empty database.
//!
//! Row plans are built synchronously from an `Rng`, then written in one database
//! transaction. [`assign_unclaimed_transactions`] instead attaches existing rows that
//! have no customer to customers that have few transactions.

use crate::db::customers::CustomersStorage;
use crate::db::models::{Category, CustomerOption, NewCashflow, NewTransaction, TransactionType};
use crate::db::mysql::MySqlPool;
use crate::error::DashboardError;
use crate::period::MonthWindow;
use chrono::{Datelike, Months, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

const CASHFLOW_MONTHS: u32 = 12;
const CASHFLOW_PAST_MONTHS: u32 = 6;
const SEED_CUSTOMERS: i64 = 10;
const SEED_CATEGORIES: i64 = 5;
const MIN_CUSTOMER_TRANSACTIONS: i64 = 5;
const ASSIGN_REVENUE: i64 = 3;
const ASSIGN_EXPENSE: i64 = 2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowSeedOutcome {
    pub existing: i64,
    pub added: usize,
    pub rows: Vec<NewCashflow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSeedOutcome {
    pub transaction_count: usize,
    pub months_added: Vec<String>,
}

/// Twelve monthly rows starting on the first of the month six months before `today`.
/// The first six carry actuals within ±20% of projection; the rest are projection only.
pub fn plan_cashflow(today: NaiveDate, rng: &mut impl Rng) -> Vec<NewCashflow> {
    let first = MonthWindow::containing(today).start - Months::new(CASHFLOW_PAST_MONTHS);
    (0..CASHFLOW_MONTHS)
        .map(|i| {
            let period_date = first + Months::new(i);
            let inflow = Decimal::from(rng.gen_range(10_000i64..15_000));
            let outflow = Decimal::from(rng.gen_range(8_000i64..12_000));
            let is_past = i < CASHFLOW_PAST_MONTHS;
            let mut actual = |base: Decimal| {
                is_past.then(|| (base * Decimal::new(rng.gen_range(80..=120), 2)).round_dp(2))
            };
            let actual_inflow = actual(inflow);
            let actual_outflow = actual(outflow);
            NewCashflow {
                period_date,
                projected_inflow: inflow,
                projected_outflow: outflow,
                actual_inflow,
                actual_outflow,
                notes: format!("Generated data for {}", period_date.format("%B %Y")),
            }
        })
        .collect()
}

/// Per customer: 3 revenue + 2 expense rows in the current month and 2 + 2 in the
/// previous one, on random days 1..=28 with random categories of the matching type.
pub fn plan_recent_transactions(
    today: NaiveDate,
    customers: &[CustomerOption],
    revenue_categories: &[Category],
    expense_categories: &[Category],
    rng: &mut impl Rng,
) -> Vec<NewTransaction> {
    let current = MonthWindow::containing(today);
    let previous = current.previous();
    let mut out = Vec::with_capacity(customers.len() * 9);

    for customer in customers {
        for (month, revenue_count, expense_count) in [(current, 3, 2), (previous, 2, 2)] {
            for _ in 0..revenue_count {
                let Some(category) = revenue_categories.choose(rng) else {
                    break;
                };
                out.push(NewTransaction {
                    transaction_date: random_day(month, rng),
                    description: Some(format!(
                        "{} revenue from {}",
                        category.category_name, customer.name
                    )),
                    amount: Decimal::from(rng.gen_range(1_000i64..10_000)),
                    kind: TransactionType::Revenue,
                    category_id: category.id,
                    customer_id: Some(customer.id),
                    recurring: rng.gen_bool(0.5),
                    recurring_frequency: rng.gen_bool(0.5).then(|| "monthly".to_string()),
                });
            }
            for _ in 0..expense_count {
                let Some(category) = expense_categories.choose(rng) else {
                    break;
                };
                out.push(NewTransaction {
                    transaction_date: random_day(month, rng),
                    description: Some(format!(
                        "{} expense for {}",
                        category.category_name, customer.name
                    )),
                    amount: Decimal::from(rng.gen_range(500i64..3_500)),
                    kind: TransactionType::Expense,
                    category_id: category.id,
                    customer_id: Some(customer.id),
                    recurring: rng.gen_bool(0.3),
                    recurring_frequency: rng.gen_bool(0.3).then(|| "monthly".to_string()),
                });
            }
        }
    }
    out
}

fn random_day(month: MonthWindow, rng: &mut impl Rng) -> NaiveDate {
    let day = rng.gen_range(1..=28);
    month.start.with_day(day).unwrap_or(month.start)
}

/// Insert the cashflow plan unless the table already has rows.
pub async fn seed_cashflow(
    pool: &MySqlPool,
    today: NaiveDate,
) -> Result<CashflowSeedOutcome, DashboardError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cashflow")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!(existing, "cashflow already populated; skipping seed");
        return Ok(CashflowSeedOutcome {
            existing,
            added: 0,
            rows: Vec::new(),
        });
    }

    let rows = plan_cashflow(today, &mut rand::thread_rng());

    let mut tx = pool.begin().await?;
    for row in &rows {
        sqlx::query(
            r#"
            INSERT INTO cashflow (
                period_date, projected_inflow, projected_outflow,
                actual_inflow, actual_outflow, notes
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.period_date)
        .bind(row.projected_inflow)
        .bind(row.projected_outflow)
        .bind(row.actual_inflow)
        .bind(row.actual_outflow)
        .bind(&row.notes)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(added = rows.len(), "seeded cashflow rows");
    Ok(CashflowSeedOutcome {
        existing,
        added: rows.len(),
        rows,
    })
}

/// Insert current- and previous-month transactions for the first customers.
pub async fn seed_recent_transactions(
    pool: &MySqlPool,
    today: NaiveDate,
) -> Result<TransactionSeedOutcome, DashboardError> {
    let customers = CustomersStorage::new(pool.clone())
        .first(SEED_CUSTOMERS)
        .await?;
    if customers.is_empty() {
        return Err(DashboardError::not_found(
            "No customers found to add transactions for",
        ));
    }

    let (revenue_categories, expense_categories) = tokio::try_join!(
        categories(pool, TransactionType::Revenue),
        categories(pool, TransactionType::Expense),
    )?;
    if revenue_categories.is_empty() || expense_categories.is_empty() {
        return Err(DashboardError::not_found("No categories found"));
    }

    let planned = plan_recent_transactions(
        today,
        &customers,
        &revenue_categories,
        &expense_categories,
        &mut rand::thread_rng(),
    );

    let mut tx = pool.begin().await?;
    for row in &planned {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                transaction_date, description, amount, type,
                category_id, customer_id, recurring, recurring_frequency
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.transaction_date)
        .bind(&row.description)
        .bind(row.amount)
        .bind(row.kind.as_str())
        .bind(row.category_id)
        .bind(row.customer_id)
        .bind(row.recurring)
        .bind(&row.recurring_frequency)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    let current = MonthWindow::containing(today);
    info!(count = planned.len(), customers = customers.len(), "seeded recent transactions");
    Ok(TransactionSeedOutcome {
        transaction_count: planned.len(),
        months_added: vec![current.label(), current.previous().label()],
    })
}

async fn categories(
    pool: &MySqlPool,
    kind: TransactionType,
) -> Result<Vec<Category>, DashboardError> {
    let rows = sqlx::query_as::<_, Category>(
        "SELECT id, category_name, type FROM categories WHERE type = ? ORDER BY id LIMIT ?",
    )
    .bind(kind.as_str())
    .bind(SEED_CATEGORIES)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAssignment {
    pub customer_id: i64,
    pub name: String,
    pub revenue_added: u64,
    pub expenses_added: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub assignments: Vec<CustomerAssignment>,
    pub customer_count: usize,
    /// Per-customer transaction counts before any assignment.
    pub transaction_counts: BTreeMap<i64, i64>,
    /// Rows without a customer before any assignment.
    pub unclaimed_transactions: i64,
}

/// Customers holding fewer than [`MIN_CUSTOMER_TRANSACTIONS`] transactions, in input order.
pub fn customers_needing_transactions<'a>(
    customers: &'a [CustomerOption],
    counts: &BTreeMap<i64, i64>,
) -> Vec<&'a CustomerOption> {
    customers
        .iter()
        .filter(|c| counts.get(&c.id).copied().unwrap_or(0) < MIN_CUSTOMER_TRANSACTIONS)
        .collect()
}

async fn claim(
    conn: &mut sqlx::MySqlConnection,
    customer_id: i64,
    kind: TransactionType,
    limit: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE transactions
        SET customer_id = ?
        WHERE customer_id IS NULL AND type = ?
        ORDER BY id
        LIMIT ?
        "#,
    )
    .bind(customer_id)
    .bind(kind.as_str())
    .bind(limit)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Give each of the first customers with few transactions up to three unassigned revenue
/// rows and two unassigned expense rows.
pub async fn assign_unclaimed_transactions(
    pool: &MySqlPool,
) -> Result<AssignmentOutcome, DashboardError> {
    let customers = CustomersStorage::new(pool.clone())
        .first(SEED_CUSTOMERS)
        .await?;
    if customers.is_empty() {
        return Err(DashboardError::not_found("No customers found"));
    }

    let counts: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT customer_id, COUNT(*)
        FROM transactions
        WHERE customer_id IS NOT NULL
        GROUP BY customer_id
        "#,
    )
    .fetch_all(pool)
    .await?;
    let transaction_counts: BTreeMap<i64, i64> = counts.into_iter().collect();

    let unclaimed_transactions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE customer_id IS NULL")
            .fetch_one(pool)
            .await?;

    let mut assignments = Vec::new();
    let mut tx = pool.begin().await?;
    for customer in customers_needing_transactions(&customers, &transaction_counts) {
        let revenue_added =
            claim(&mut tx, customer.id, TransactionType::Revenue, ASSIGN_REVENUE).await?;
        let expenses_added =
            claim(&mut tx, customer.id, TransactionType::Expense, ASSIGN_EXPENSE).await?;
        assignments.push(CustomerAssignment {
            customer_id: customer.id,
            name: customer.name.clone(),
            revenue_added,
            expenses_added,
        });
    }
    tx.commit().await?;

    info!(
        customers = assignments.len(),
        unclaimed = unclaimed_transactions,
        "assigned unclaimed transactions"
    );
    Ok(AssignmentOutcome {
        assignments,
        customer_count: customers.len(),
        transaction_counts,
        unclaimed_transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cashflow_plan_spans_past_and_future() {
        let mut rng = StdRng::seed_from_u64(7);
        let rows = plan_cashflow(date(2024, 3, 15), &mut rng);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].period_date, date(2023, 9, 1));
        assert_eq!(rows[11].period_date, date(2024, 8, 1));
        assert!(rows[..6].iter().all(|r| r.actual_inflow.is_some() && r.actual_outflow.is_some()));
        assert!(rows[6..].iter().all(|r| r.actual_inflow.is_none() && r.actual_outflow.is_none()));
    }

    #[test]
    fn cashflow_actuals_stay_within_twenty_percent() {
        let mut rng = StdRng::seed_from_u64(42);
        for row in plan_cashflow(date(2024, 1, 1), &mut rng).iter().take(6) {
            let actual = row.actual_inflow.unwrap();
            assert!(actual >= row.projected_inflow * Decimal::new(80, 2));
            assert!(actual <= row.projected_inflow * Decimal::new(120, 2));
        }
    }

    #[test]
    fn transaction_plan_covers_both_months() {
        let customers = vec![
            CustomerOption { id: 1, name: "Acme".into() },
            CustomerOption { id: 2, name: "Globex".into() },
        ];
        let revenue = vec![Category {
            id: 10,
            category_name: "Consulting".into(),
            kind: TransactionType::Revenue,
        }];
        let expense = vec![Category {
            id: 20,
            category_name: "Travel".into(),
            kind: TransactionType::Expense,
        }];
        let mut rng = StdRng::seed_from_u64(1);
        let rows = plan_recent_transactions(date(2025, 1, 20), &customers, &revenue, &expense, &mut rng);

        assert_eq!(rows.len(), 18);
        let in_january = rows.iter().filter(|r| r.transaction_date.month() == 1).count();
        let in_december = rows
            .iter()
            .filter(|r| r.transaction_date.year() == 2024 && r.transaction_date.month() == 12)
            .count();
        assert_eq!(in_january, 10);
        assert_eq!(in_december, 8);
        assert!(rows.iter().all(|r| match r.kind {
            TransactionType::Revenue => r.category_id == 10,
            TransactionType::Expense => r.category_id == 20,
        }));
    }

    #[test]
    fn only_customers_below_threshold_get_assignments() {
        let customers = vec![
            CustomerOption { id: 1, name: "Acme".into() },
            CustomerOption { id: 2, name: "Globex".into() },
            CustomerOption { id: 3, name: "Initech".into() },
        ];
        let counts = BTreeMap::from([(1, 7), (2, 4)]);
        let ids: Vec<i64> = customers_needing_transactions(&customers, &counts)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
