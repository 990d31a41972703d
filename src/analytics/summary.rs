use crate::db::MySqlPool;
use crate::error::DashboardError;
use crate::period::{self, MonthWindow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Headline cards: current month against the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub monthly_revenue: Decimal,
    pub monthly_expenses: Decimal,
    pub net_profit: Decimal,
    pub cash_balance: Decimal,
    pub revenue_change: Decimal,
    pub expenses_change: Decimal,
    pub net_profit_change: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct PeriodTotals {
    pub revenue: Decimal,
    pub expenses: Decimal,
}

impl PeriodTotals {
    pub fn net(&self) -> Decimal {
        self.revenue - self.expenses
    }
}

impl FinancialSummary {
    pub fn from_totals(current: PeriodTotals, previous: PeriodTotals, cash_balance: Decimal) -> Self {
        Self {
            monthly_revenue: current.revenue,
            monthly_expenses: current.expenses,
            net_profit: current.net(),
            cash_balance,
            revenue_change: period::percent_change(current.revenue, previous.revenue),
            expenses_change: period::percent_change(current.expenses, previous.expenses),
            net_profit_change: period::percent_change(current.net(), previous.net()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MonthlyData {
    pub month: String,
    pub revenue: Decimal,
    pub expense: Decimal,
}

const WINDOW_TOTALS: &str = r#"
SELECT
    COALESCE(SUM(CASE WHEN type = 'revenue' THEN amount ELSE 0 END), 0) AS revenue,
    COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0 END), 0) AS expenses
FROM transactions
WHERE transaction_date >= ? AND transaction_date < ?
  AND (? IS NULL OR customer_id = ?)
"#;

const LIFETIME_TOTALS: &str = r#"
SELECT
    COALESCE(SUM(CASE WHEN type = 'revenue' THEN amount ELSE 0 END), 0) AS revenue,
    COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0 END), 0) AS expenses
FROM transactions
WHERE (? IS NULL OR customer_id = ?)
"#;

const MONTHLY_SERIES: &str = r#"
SELECT
    DATE_FORMAT(transaction_date, '%Y-%m') AS month,
    COALESCE(SUM(CASE WHEN type = 'revenue' THEN amount ELSE 0 END), 0) AS revenue,
    COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0 END), 0) AS expense
FROM transactions
WHERE (? IS NULL OR transaction_date >= ?)
  AND (? IS NULL OR customer_id = ?)
GROUP BY month
ORDER BY month
"#;

async fn window_totals(
    pool: &MySqlPool,
    window: MonthWindow,
    customer_id: Option<i64>,
) -> Result<PeriodTotals, sqlx::Error> {
    sqlx::query_as::<_, PeriodTotals>(WINDOW_TOTALS)
        .bind(window.start)
        .bind(window.end)
        .bind(customer_id)
        .bind(customer_id)
        .fetch_one(pool)
        .await
}

/// Current-month totals, previous-month deltas and the all-time cash balance,
/// optionally restricted to one customer's transactions.
pub async fn financial_summary(
    pool: &MySqlPool,
    today: NaiveDate,
    customer_id: Option<i64>,
) -> Result<FinancialSummary, DashboardError> {
    let current = MonthWindow::containing(today);
    let previous = current.previous();

    let lifetime = sqlx::query_as::<_, PeriodTotals>(LIFETIME_TOTALS)
        .bind(customer_id)
        .bind(customer_id)
        .fetch_one(pool);

    let (current, previous, lifetime) = tokio::try_join!(
        window_totals(pool, current, customer_id),
        window_totals(pool, previous, customer_id),
        lifetime,
    )?;

    Ok(FinancialSummary::from_totals(current, previous, lifetime.net()))
}

/// `YYYY-MM` revenue/expense buckets. Company-wide: the last six months.
/// Per customer: the customer's whole history.
pub async fn monthly_revenue_expenses(
    pool: &MySqlPool,
    today: NaiveDate,
    customer_id: Option<i64>,
) -> Result<Vec<MonthlyData>, DashboardError> {
    let since = match customer_id {
        Some(_) => None,
        None => Some(period::months_back(today, 6)),
    };
    let rows = sqlx::query_as::<_, MonthlyData>(MONTHLY_SERIES)
        .bind(since)
        .bind(since)
        .bind(customer_id)
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
