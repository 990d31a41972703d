use axum::{Json, extract::State};

use crate::analytics::{
    self, CashflowPoint, CustomerGrowth, CustomerLifetimeValue, CustomerProfitability,
    CustomerSegment, DealVelocity, ExpenseTrend, FinancialSummary, KpiMetric, RecurringRevenue,
    RevenueByCustomerAge, SalesFunnelStage,
};
use crate::middleware::customer_scope::CustomerScope;
use crate::period;
use crate::types::envelope::ApiResponse;
use crate::{DashboardError, router::LedgerState};

type ApiResult<T> = Result<Json<ApiResponse<T>>, DashboardError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub async fn summary_handler(
    State(state): State<LedgerState>,
    CustomerScope(customer_id): CustomerScope,
) -> ApiResult<FinancialSummary> {
    ok(analytics::financial_summary(&state.pool, period::today(), customer_id).await?)
}

pub async fn segments_handler(State(state): State<LedgerState>) -> ApiResult<Vec<CustomerSegment>> {
    ok(analytics::customer_segments(&state.pool).await?)
}

pub async fn funnel_handler(State(state): State<LedgerState>) -> ApiResult<Vec<SalesFunnelStage>> {
    ok(analytics::sales_funnel(&state.pool).await?)
}

pub async fn cashflow_handler(
    State(state): State<LedgerState>,
    CustomerScope(customer_id): CustomerScope,
) -> ApiResult<Vec<CashflowPoint>> {
    ok(analytics::cashflow_timeline(&state.pool, customer_id).await?)
}

pub async fn kpis_handler(
    State(state): State<LedgerState>,
    CustomerScope(customer_id): CustomerScope,
) -> ApiResult<Vec<KpiMetric>> {
    ok(analytics::kpi_metrics(&state.pool, customer_id).await?)
}

pub async fn customer_growth_handler(
    State(state): State<LedgerState>,
) -> ApiResult<Vec<CustomerGrowth>> {
    ok(analytics::customer_growth(&state.pool).await?)
}

pub async fn lifetime_value_handler(
    State(state): State<LedgerState>,
) -> ApiResult<Vec<CustomerLifetimeValue>> {
    ok(analytics::customer_lifetime_value(&state.pool).await?)
}

pub async fn revenue_by_age_handler(
    State(state): State<LedgerState>,
) -> ApiResult<Vec<RevenueByCustomerAge>> {
    ok(analytics::revenue_by_customer_age(&state.pool, period::today()).await?)
}

pub async fn recurring_revenue_handler(
    State(state): State<LedgerState>,
) -> ApiResult<Vec<RecurringRevenue>> {
    ok(analytics::recurring_revenue(&state.pool).await?)
}

pub async fn expense_trends_handler(
    State(state): State<LedgerState>,
) -> ApiResult<Vec<ExpenseTrend>> {
    ok(analytics::expense_trends(&state.pool).await?)
}

pub async fn deal_velocity_handler(
    State(state): State<LedgerState>,
) -> ApiResult<Vec<DealVelocity>> {
    ok(analytics::deal_velocity(&state.pool, period::today()).await?)
}

pub async fn profitability_handler(
    State(state): State<LedgerState>,
) -> ApiResult<Vec<CustomerProfitability>> {
    ok(analytics::customer_profitability(&state.pool).await?)
}
