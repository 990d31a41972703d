//! Secondary analytics: growth, LTV distribution, cohort revenue, recurring mix,
//! expense composition, pipeline velocity and per-customer profitability.
//!
//! Ratios that would divide by a per-group SQL aggregate are computed here instead,
//! so empty groups come out as 0 rather than NULL.

use crate::db::MySqlPool;
use crate::error::DashboardError;
use crate::period;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, FromRow)]
struct NewCustomersRow {
    month: String,
    new_customers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerGrowth {
    pub month: String,
    pub new_customers: i64,
    /// New customers relative to the customer base before the month.
    pub growth_rate: Decimal,
}

fn growth_series(rows: Vec<NewCustomersRow>) -> Vec<CustomerGrowth> {
    let mut base = 0i64;
    rows.into_iter()
        .map(|row| {
            let growth_rate = period::percent_of(row.new_customers.into(), base.into());
            base += row.new_customers;
            CustomerGrowth {
                month: row.month,
                new_customers: row.new_customers,
                growth_rate,
            }
        })
        .collect()
}

pub async fn customer_growth(pool: &MySqlPool) -> Result<Vec<CustomerGrowth>, DashboardError> {
    let rows = sqlx::query_as::<_, NewCustomersRow>(
        r#"
        SELECT DATE_FORMAT(acquisition_date, '%Y-%m') AS month, COUNT(*) AS new_customers
        FROM customers
        GROUP BY month
        ORDER BY month
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(growth_series(rows))
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CustomerLifetimeValue {
    pub business_size: String,
    pub avg_ltv: Decimal,
    pub min_ltv: Decimal,
    pub max_ltv: Decimal,
    pub ltv_stddev: Decimal,
}

pub async fn customer_lifetime_value(
    pool: &MySqlPool,
) -> Result<Vec<CustomerLifetimeValue>, DashboardError> {
    let rows = sqlx::query_as::<_, CustomerLifetimeValue>(
        r#"
        SELECT
            business_size,
            CAST(AVG(lifetime_value) AS DECIMAL(15, 2)) AS avg_ltv,
            MIN(lifetime_value) AS min_ltv,
            MAX(lifetime_value) AS max_ltv,
            CAST(COALESCE(STDDEV(lifetime_value), 0) AS DECIMAL(15, 2)) AS ltv_stddev
        FROM customers
        GROUP BY business_size
        ORDER BY business_size
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Customer tenure buckets, by days since acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CustomerAge {
    UpToThreeMonths,
    ThreeToSixMonths,
    SixToTwelveMonths,
    OverTwelveMonths,
}

impl CustomerAge {
    pub fn from_days(days: i64) -> Self {
        match days {
            ..=90 => CustomerAge::UpToThreeMonths,
            91..=180 => CustomerAge::ThreeToSixMonths,
            181..=365 => CustomerAge::SixToTwelveMonths,
            _ => CustomerAge::OverTwelveMonths,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CustomerAge::UpToThreeMonths => "0-3 months",
            CustomerAge::ThreeToSixMonths => "3-6 months",
            CustomerAge::SixToTwelveMonths => "6-12 months",
            CustomerAge::OverTwelveMonths => "Over 12 months",
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
struct CustomerRevenueRow {
    acquisition_date: NaiveDate,
    revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueByCustomerAge {
    pub customer_age: &'static str,
    pub total_revenue: Decimal,
    pub customer_count: i64,
    pub avg_revenue_per_customer: Decimal,
}

fn bucket_by_age(today: NaiveDate, rows: Vec<CustomerRevenueRow>) -> Vec<RevenueByCustomerAge> {
    let mut buckets: BTreeMap<CustomerAge, (Decimal, i64)> = BTreeMap::new();
    for row in rows {
        let age = CustomerAge::from_days((today - row.acquisition_date).num_days());
        let entry = buckets.entry(age).or_default();
        entry.0 += row.revenue;
        entry.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(age, (total, count))| RevenueByCustomerAge {
            customer_age: age.label(),
            total_revenue: total,
            customer_count: count,
            avg_revenue_per_customer: (total / Decimal::from(count)).round_dp(2),
        })
        .collect()
}

pub async fn revenue_by_customer_age(
    pool: &MySqlPool,
    today: NaiveDate,
) -> Result<Vec<RevenueByCustomerAge>, DashboardError> {
    let rows = sqlx::query_as::<_, CustomerRevenueRow>(
        r#"
        SELECT c.acquisition_date, SUM(t.amount) AS revenue
        FROM transactions t
        JOIN customers c ON c.id = t.customer_id
        WHERE t.type = 'revenue'
        GROUP BY c.id, c.acquisition_date
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(bucket_by_age(today, rows))
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RecurringRevenue {
    pub month: String,
    pub recurring_revenue: Decimal,
    pub non_recurring_revenue: Decimal,
    pub recurring_transactions: i64,
    pub non_recurring_transactions: i64,
}

pub async fn recurring_revenue(pool: &MySqlPool) -> Result<Vec<RecurringRevenue>, DashboardError> {
    let rows = sqlx::query_as::<_, RecurringRevenue>(
        r#"
        SELECT
            DATE_FORMAT(transaction_date, '%Y-%m') AS month,
            COALESCE(SUM(CASE WHEN recurring THEN amount ELSE 0 END), 0) AS recurring_revenue,
            COALESCE(SUM(CASE WHEN NOT recurring THEN amount ELSE 0 END), 0) AS non_recurring_revenue,
            COUNT(CASE WHEN recurring THEN 1 END) AS recurring_transactions,
            COUNT(CASE WHEN NOT recurring THEN 1 END) AS non_recurring_transactions
        FROM transactions
        WHERE type = 'revenue'
        GROUP BY month
        ORDER BY month
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, FromRow)]
struct CategoryMonthRow {
    category_name: String,
    month: String,
    total_expense: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseTrend {
    pub category_name: String,
    pub month: String,
    pub total_expense: Decimal,
    pub percentage_of_monthly_expense: Decimal,
}

fn expense_shares(rows: Vec<CategoryMonthRow>) -> Vec<ExpenseTrend> {
    let mut monthly: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in &rows {
        *monthly.entry(row.month.clone()).or_default() += row.total_expense;
    }
    rows.into_iter()
        .map(|row| {
            let month_total = monthly.get(&row.month).copied().unwrap_or_default();
            ExpenseTrend {
                percentage_of_monthly_expense: period::percent_of(row.total_expense, month_total),
                category_name: row.category_name,
                month: row.month,
                total_expense: row.total_expense,
            }
        })
        .collect()
}

pub async fn expense_trends(pool: &MySqlPool) -> Result<Vec<ExpenseTrend>, DashboardError> {
    let rows = sqlx::query_as::<_, CategoryMonthRow>(
        r#"
        SELECT
            cat.category_name,
            DATE_FORMAT(t.transaction_date, '%Y-%m') AS month,
            SUM(t.amount) AS total_expense
        FROM transactions t
        JOIN categories cat ON cat.id = t.category_id
        WHERE t.type = 'expense'
        GROUP BY cat.category_name, month
        ORDER BY month, total_expense DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(expense_shares(rows))
}

#[derive(Debug, Clone, PartialEq, FromRow)]
struct StageVelocityRow {
    stage_name: String,
    total_deals: i64,
    avg_days_in_stage: Decimal,
    avg_deal_value: Decimal,
    conversions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealVelocity {
    pub stage_name: String,
    pub total_deals: i64,
    pub avg_days_in_stage: Decimal,
    pub avg_deal_value: Decimal,
    pub conversion_rate: Decimal,
}

impl From<StageVelocityRow> for DealVelocity {
    fn from(row: StageVelocityRow) -> Self {
        Self {
            conversion_rate: period::percent_of(row.conversions.into(), row.total_deals.into()),
            stage_name: row.stage_name,
            total_deals: row.total_deals,
            avg_days_in_stage: row.avg_days_in_stage.round_dp(1),
            avg_deal_value: row.avg_deal_value.round_dp(2),
        }
    }
}

/// Per-stage pipeline speed for deals that entered in the last six months.
/// Open deals count their days up to `today`.
pub async fn deal_velocity(
    pool: &MySqlPool,
    today: NaiveDate,
) -> Result<Vec<DealVelocity>, DashboardError> {
    let rows = sqlx::query_as::<_, StageVelocityRow>(
        r#"
        SELECT
            stage_name,
            COUNT(*) AS total_deals,
            COALESCE(AVG(DATEDIFF(COALESCE(exit_date, ?), entry_date)), 0) AS avg_days_in_stage,
            COALESCE(AVG(value), 0) AS avg_deal_value,
            COUNT(CASE WHEN converted THEN 1 END) AS conversions
        FROM sales_pipeline
        WHERE entry_date >= ?
        GROUP BY stage_name, stage_order
        ORDER BY stage_order
        "#,
    )
    .bind(today)
    .bind(period::months_back(today, 6))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(DealVelocity::from).collect())
}

#[derive(Debug, Clone, PartialEq, FromRow)]
struct CustomerTotalsRow {
    customer_name: String,
    business_size: String,
    total_revenue: Decimal,
    total_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerProfitability {
    pub customer_name: String,
    pub business_size: String,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub profit: Decimal,
    pub profit_margin: Decimal,
}

fn rank_by_margin(rows: Vec<CustomerTotalsRow>) -> Vec<CustomerProfitability> {
    let mut out: Vec<_> = rows
        .into_iter()
        .map(|row| {
            let profit = row.total_revenue - row.total_cost;
            CustomerProfitability {
                profit_margin: period::percent_of(profit, row.total_revenue),
                profit,
                customer_name: row.customer_name,
                business_size: row.business_size,
                total_revenue: row.total_revenue,
                total_cost: row.total_cost,
            }
        })
        .collect();
    out.sort_by(|a, b| b.profit_margin.cmp(&a.profit_margin));
    out
}

/// Customers with any revenue, best margin first.
pub async fn customer_profitability(
    pool: &MySqlPool,
) -> Result<Vec<CustomerProfitability>, DashboardError> {
    let rows = sqlx::query_as::<_, CustomerTotalsRow>(
        r#"
        SELECT
            c.name AS customer_name,
            c.business_size,
            COALESCE(SUM(CASE WHEN t.type = 'revenue' THEN t.amount ELSE 0 END), 0) AS total_revenue,
            COALESCE(SUM(CASE WHEN t.type = 'expense' THEN t.amount ELSE 0 END), 0) AS total_cost
        FROM customers c
        LEFT JOIN transactions t ON t.customer_id = c.id
        GROUP BY c.id, c.name, c.business_size
        HAVING total_revenue > 0
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rank_by_margin(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn growth_rate_uses_prior_customer_base() {
        let series = growth_series(vec![
            NewCustomersRow { month: "2024-01".into(), new_customers: 4 },
            NewCustomersRow { month: "2024-02".into(), new_customers: 2 },
            NewCustomersRow { month: "2024-03".into(), new_customers: 3 },
        ]);
        assert_eq!(series[0].growth_rate, dec!(0));
        assert_eq!(series[1].growth_rate, dec!(50));
        assert_eq!(series[2].growth_rate, dec!(50));
    }

    #[test]
    fn age_bucket_boundaries() {
        assert_eq!(CustomerAge::from_days(0), CustomerAge::UpToThreeMonths);
        assert_eq!(CustomerAge::from_days(90), CustomerAge::UpToThreeMonths);
        assert_eq!(CustomerAge::from_days(91), CustomerAge::ThreeToSixMonths);
        assert_eq!(CustomerAge::from_days(365), CustomerAge::SixToTwelveMonths);
        assert_eq!(CustomerAge::from_days(366), CustomerAge::OverTwelveMonths);
    }

    #[test]
    fn revenue_is_bucketed_by_tenure() {
        let today = date(2024, 12, 31);
        let out = bucket_by_age(
            today,
            vec![
                CustomerRevenueRow { acquisition_date: date(2024, 12, 1), revenue: dec!(100) },
                CustomerRevenueRow { acquisition_date: date(2024, 11, 1), revenue: dec!(300) },
                CustomerRevenueRow { acquisition_date: date(2020, 1, 1), revenue: dec!(1000) },
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].customer_age, "0-3 months");
        assert_eq!(out[0].customer_count, 2);
        assert_eq!(out[0].avg_revenue_per_customer, dec!(200));
        assert_eq!(out[1].customer_age, "Over 12 months");
        assert_eq!(out[1].total_revenue, dec!(1000));
    }

    #[test]
    fn expense_share_is_relative_to_its_month() {
        let out = expense_shares(vec![
            CategoryMonthRow { category_name: "Rent".into(), month: "2024-01".into(), total_expense: dec!(750) },
            CategoryMonthRow { category_name: "Travel".into(), month: "2024-01".into(), total_expense: dec!(250) },
            CategoryMonthRow { category_name: "Rent".into(), month: "2024-02".into(), total_expense: dec!(500) },
        ]);
        assert_eq!(out[0].percentage_of_monthly_expense, dec!(75));
        assert_eq!(out[1].percentage_of_monthly_expense, dec!(25));
        assert_eq!(out[2].percentage_of_monthly_expense, dec!(100));
    }

    #[test]
    fn profitability_is_ranked_by_margin() {
        let out = rank_by_margin(vec![
            CustomerTotalsRow {
                customer_name: "Thin".into(),
                business_size: "small".into(),
                total_revenue: dec!(1000),
                total_cost: dec!(900),
            },
            CustomerTotalsRow {
                customer_name: "Fat".into(),
                business_size: "large".into(),
                total_revenue: dec!(1000),
                total_cost: dec!(200),
            },
        ]);
        assert_eq!(out[0].customer_name, "Fat");
        assert_eq!(out[0].profit, dec!(800));
        assert_eq!(out[0].profit_margin, dec!(80));
        assert_eq!(out[1].profit_margin, dec!(10));
    }
}
