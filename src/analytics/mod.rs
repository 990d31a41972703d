//! Aggregation layer: every function is one or a few parameterized SQL queries plus
//! light arithmetic on the rows.

pub mod charts;
pub mod dashboard;
pub mod insights;
pub mod summary;

pub use charts::{
    CashflowPoint, CustomerSegment, KpiMetric, SalesFunnelStage, cashflow_timeline,
    customer_segments, kpi_metrics, sales_funnel,
};
pub use dashboard::{Dashboard, dashboard};
pub use insights::{
    CustomerGrowth, CustomerLifetimeValue, CustomerProfitability, DealVelocity, ExpenseTrend,
    RecurringRevenue, RevenueByCustomerAge, customer_growth, customer_lifetime_value,
    customer_profitability, deal_velocity, expense_trends, recurring_revenue,
    revenue_by_customer_age,
};
pub use summary::{FinancialSummary, MonthlyData, financial_summary, monthly_revenue_expenses};
