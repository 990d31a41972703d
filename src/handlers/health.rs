use axum::{Json, extract::State};

use crate::db::mysql;
use crate::types::envelope::ApiResponse;
use crate::{DashboardError, router::LedgerState};

/// GET /api/health -> `SELECT 1` against the pool.
pub async fn health_handler(
    State(state): State<LedgerState>,
) -> Result<Json<ApiResponse<()>>, DashboardError> {
    mysql::ping(&state.pool).await?;
    Ok(Json(ApiResponse::message_only(
        "Database connection successful",
    )))
}
