//! Development-only data generators. Mounted only when
//! `server.enable_seed_routes` is set.

use axum::{Json, extract::State};

use crate::db::seed::{self, AssignmentOutcome, CashflowSeedOutcome, TransactionSeedOutcome};
use crate::period;
use crate::types::envelope::ApiResponse;
use crate::{DashboardError, router::LedgerState};

/// POST /api/seed/cashflow
pub async fn cashflow_handler(
    State(state): State<LedgerState>,
) -> Result<Json<ApiResponse<CashflowSeedOutcome>>, DashboardError> {
    let outcome = seed::seed_cashflow(&state.pool, period::today()).await?;
    let message = if outcome.added == 0 {
        format!("Cashflow data already exists ({} records)", outcome.existing)
    } else {
        format!("Successfully added {} cashflow records", outcome.added)
    };
    Ok(Json(ApiResponse::success(outcome).with_message(message)))
}

/// POST /api/seed/transactions
pub async fn transactions_handler(
    State(state): State<LedgerState>,
) -> Result<Json<ApiResponse<TransactionSeedOutcome>>, DashboardError> {
    let outcome = seed::seed_recent_transactions(&state.pool, period::today()).await?;
    let message = format!(
        "Successfully added {} transactions for {}",
        outcome.transaction_count,
        outcome.months_added.join(" and ")
    );
    Ok(Json(ApiResponse::success(outcome).with_message(message)))
}

/// POST /api/seed/assign-customers
pub async fn assign_customers_handler(
    State(state): State<LedgerState>,
) -> Result<Json<ApiResponse<AssignmentOutcome>>, DashboardError> {
    let outcome = seed::assign_unclaimed_transactions(&state.pool).await?;
    Ok(Json(
        ApiResponse::success(outcome).with_message("Test data updated successfully"),
    ))
}
