use crate::analytics::charts::{self, CashflowPoint, CustomerSegment, KpiMetric, SalesFunnelStage};
use crate::analytics::summary::{self, FinancialSummary, MonthlyData};
use crate::db::models::TransactionView;
use crate::db::{MySqlPool, TransactionsStorage};
use crate::error::DashboardError;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

pub const RECENT_TRANSACTIONS: i64 = 10;

/// Everything the landing page renders, in one payload.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub financial_summary: FinancialSummary,
    pub monthly_data: Vec<MonthlyData>,
    pub customer_segments: Vec<CustomerSegment>,
    pub sales_funnel: Vec<SalesFunnelStage>,
    pub cashflow_timeline: Vec<CashflowPoint>,
    pub kpi_metrics: Vec<KpiMetric>,
    pub recent_transactions: Vec<TransactionView>,
    pub customer_id: Option<i64>,
    /// Set when at least one section failed and holds its empty default.
    pub partial: bool,
    pub failed_sections: Vec<&'static str>,
}

/// Take the section's value, or log the failure, record it and fall back to empty.
fn settle<T: Default>(
    section: &'static str,
    result: Result<T, DashboardError>,
    failed: &mut Vec<&'static str>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(section, error = %e, "dashboard section failed; returning empty");
            failed.push(section);
            T::default()
        }
    }
}

/// Run every dashboard query concurrently. Segments and funnel are company-wide;
/// the other sections honour `customer_id`.
pub async fn dashboard(
    pool: &MySqlPool,
    today: NaiveDate,
    customer_id: Option<i64>,
) -> Dashboard {
    let transactions = TransactionsStorage::new(pool.clone());

    let (summary, monthly, segments, funnel, cashflow, kpis, recent) = futures::join!(
        summary::financial_summary(pool, today, customer_id),
        summary::monthly_revenue_expenses(pool, today, customer_id),
        charts::customer_segments(pool),
        charts::sales_funnel(pool),
        charts::cashflow_timeline(pool, customer_id),
        charts::kpi_metrics(pool, customer_id),
        transactions.recent(RECENT_TRANSACTIONS, customer_id),
    );

    let mut failed = Vec::new();
    let dashboard = Dashboard {
        financial_summary: settle("financialSummary", summary, &mut failed),
        monthly_data: settle("monthlyData", monthly, &mut failed),
        customer_segments: settle("customerSegments", segments, &mut failed),
        sales_funnel: settle("salesFunnel", funnel, &mut failed),
        cashflow_timeline: settle("cashflowTimeline", cashflow, &mut failed),
        kpi_metrics: settle("kpiMetrics", kpis, &mut failed),
        recent_transactions: settle("recentTransactions", recent, &mut failed),
        customer_id,
        partial: false,
        failed_sections: Vec::new(),
    };

    Dashboard {
        partial: !failed.is_empty(),
        failed_sections: failed,
        ..dashboard
    }
}
