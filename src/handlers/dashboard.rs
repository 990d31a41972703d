use axum::{Json, extract::State};
use tracing::debug;

use crate::analytics::{self, Dashboard, MonthlyData};
use crate::middleware::customer_scope::CustomerScope;
use crate::period;
use crate::types::envelope::ApiResponse;
use crate::{DashboardError, router::LedgerState};

/// GET /api/dashboard?customerId=
///
/// Sections that fail are returned empty and listed in `failedSections`.
pub async fn dashboard_handler(
    State(state): State<LedgerState>,
    CustomerScope(customer_id): CustomerScope,
) -> Json<ApiResponse<Dashboard>> {
    let dashboard = analytics::dashboard(&state.pool, period::today(), customer_id).await;
    debug!(?customer_id, partial = dashboard.partial, "dashboard assembled");
    Json(ApiResponse::success(dashboard))
}

/// GET /api/dashboard/monthly-data?customerId=
pub async fn monthly_data_handler(
    State(state): State<LedgerState>,
    CustomerScope(customer_id): CustomerScope,
) -> Result<Json<ApiResponse<Vec<MonthlyData>>>, DashboardError> {
    let rows =
        analytics::monthly_revenue_expenses(&state.pool, period::today(), customer_id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
