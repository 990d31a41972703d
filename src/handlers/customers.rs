use axum::{
    Json,
    extract::rejection::PathRejection,
    extract::{Path, State},
};
use serde::Serialize;

use crate::analytics::{self, MonthlyData};
use crate::db::models::{Customer, CustomerOption, TransactionView};
use crate::period;
use crate::types::envelope::ApiResponse;
use crate::{DashboardError, router::LedgerState};

/// Everything the customer page needs in one payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    pub customer_info: Customer,
    pub transactions: Vec<TransactionView>,
    pub monthly_data: Vec<MonthlyData>,
    pub transaction_count: usize,
    pub monthly_data_count: usize,
}

/// GET /api/customers -> `{id, name}` pairs for the customer selector.
pub async fn list_handler(
    State(state): State<LedgerState>,
) -> Result<Json<ApiResponse<Vec<CustomerOption>>>, DashboardError> {
    let rows = state.customers.list_options().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// GET /api/customers/{id}
pub async fn detail_handler(
    State(state): State<LedgerState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<CustomerDetail>>, DashboardError> {
    let Path(id) = id?;
    let customer_info = state
        .customers
        .find(id)
        .await?
        .ok_or_else(|| DashboardError::not_found(format!("Customer with ID {id} not found")))?;

    let (transactions, monthly_data) = tokio::try_join!(
        state.customers.transactions(id),
        analytics::monthly_revenue_expenses(&state.pool, period::today(), Some(id)),
    )?;

    Ok(Json(ApiResponse::success(CustomerDetail {
        customer_info,
        transaction_count: transactions.len(),
        monthly_data_count: monthly_data.len(),
        transactions,
        monthly_data,
    })))
}
