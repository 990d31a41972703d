use crate::db::MySqlPool;
use crate::error::DashboardError;
use crate::period;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CustomerSegment {
    pub business_size: String,
    pub count: i64,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
struct StageCounts {
    stage_name: String,
    stage_order: i32,
    entries: i64,
    conversions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesFunnelStage {
    pub stage_name: String,
    pub stage_order: i32,
    pub entries: i64,
    pub conversions: i64,
    pub conversion_rate: Decimal,
}

impl From<StageCounts> for SalesFunnelStage {
    fn from(row: StageCounts) -> Self {
        Self {
            conversion_rate: period::percent_of(row.conversions.into(), row.entries.into()),
            stage_name: row.stage_name,
            stage_order: row.stage_order,
            entries: row.entries,
            conversions: row.conversions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
struct CashflowRow {
    period_date: NaiveDate,
    projected_inflow: Decimal,
    projected_outflow: Decimal,
    actual_inflow: Option<Decimal>,
    actual_outflow: Option<Decimal>,
}

/// One period of the cashflow timeline. Actuals are absent for future periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowPoint {
    pub projection_date: NaiveDate,
    pub projected_inflow: Decimal,
    pub projected_outflow: Decimal,
    pub actual_inflow: Option<Decimal>,
    pub actual_outflow: Option<Decimal>,
    pub projected_net: Decimal,
    pub actual_net: Option<Decimal>,
}

impl From<CashflowRow> for CashflowPoint {
    fn from(row: CashflowRow) -> Self {
        let actual_net = match (row.actual_inflow, row.actual_outflow) {
            (Some(inflow), Some(outflow)) => Some(inflow - outflow),
            _ => None,
        };
        Self {
            projection_date: row.period_date,
            projected_inflow: row.projected_inflow,
            projected_outflow: row.projected_outflow,
            actual_inflow: row.actual_inflow,
            actual_outflow: row.actual_outflow,
            projected_net: row.projected_inflow - row.projected_outflow,
            actual_net,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct KpiMetric {
    pub metric_name: String,
    pub metric_value: Decimal,
    pub target_value: Decimal,
    pub metric_type: String,
    pub description: Option<String>,
    pub metric_date: NaiveDate,
    /// `metric_value / target_value * 100`.
    #[sqlx(skip)]
    pub attainment: Decimal,
}

impl KpiMetric {
    fn with_attainment(mut self) -> Self {
        self.attainment = period::percent_of(self.metric_value, self.target_value);
        self
    }
}

/// Customers grouped by business size, largest total lifetime value first.
pub async fn customer_segments(pool: &MySqlPool) -> Result<Vec<CustomerSegment>, DashboardError> {
    let rows = sqlx::query_as::<_, CustomerSegment>(
        r#"
        SELECT
            business_size,
            COUNT(*) AS count,
            COALESCE(SUM(lifetime_value), 0) AS total_value
        FROM customers
        GROUP BY business_size
        ORDER BY total_value DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn sales_funnel(pool: &MySqlPool) -> Result<Vec<SalesFunnelStage>, DashboardError> {
    let rows = sqlx::query_as::<_, StageCounts>(
        r#"
        SELECT
            stage_name,
            stage_order,
            COUNT(*) AS entries,
            COUNT(CASE WHEN converted THEN 1 END) AS conversions
        FROM sales_pipeline
        GROUP BY stage_name, stage_order
        ORDER BY stage_order
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(SalesFunnelStage::from).collect())
}

/// Company-wide rows when `customer_id` is `None`, that customer's rows otherwise.
pub async fn cashflow_timeline(
    pool: &MySqlPool,
    customer_id: Option<i64>,
) -> Result<Vec<CashflowPoint>, DashboardError> {
    let rows = sqlx::query_as::<_, CashflowRow>(
        r#"
        SELECT period_date, projected_inflow, projected_outflow, actual_inflow, actual_outflow
        FROM cashflow
        WHERE customer_id <=> ?
        ORDER BY period_date
        "#,
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CashflowPoint::from).collect())
}

/// Metrics recorded on the most recent `metric_date` for the scope.
pub async fn kpi_metrics(
    pool: &MySqlPool,
    customer_id: Option<i64>,
) -> Result<Vec<KpiMetric>, DashboardError> {
    let rows = sqlx::query_as::<_, KpiMetric>(
        r#"
        SELECT metric_name, metric_value, target_value, metric_type, description, metric_date
        FROM kpi_metrics
        WHERE customer_id <=> ?
          AND metric_date = (
              SELECT MAX(metric_date) FROM kpi_metrics WHERE customer_id <=> ?
          )
        ORDER BY metric_name
        "#,
    )
    .bind(customer_id)
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(KpiMetric::with_attainment).collect())
}
