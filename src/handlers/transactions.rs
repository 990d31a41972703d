use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::info;

use crate::db::models::TransactionView;
use crate::types::envelope::{ApiResponse, Pagination};
use crate::types::transactions::{CreateTransactionBody, PatchTransactionBody, TransactionQuery};
use crate::{DashboardError, router::LedgerState};

fn not_found(id: i64) -> DashboardError {
    DashboardError::not_found(format!("Transaction with ID {id} not found"))
}

/// GET /api/transactions -> filtered, paginated listing.
pub async fn list_handler(
    State(state): State<LedgerState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, DashboardError> {
    let Query(query) = query?;
    let listing = query.into_filter()?;
    let (rows, total) = state
        .transactions
        .list(&listing.filter, listing.limit, listing.offset)
        .await?;
    Ok(Json(ApiResponse::success(rows).with_pagination(Pagination {
        total,
        limit: listing.limit,
        offset: listing.offset,
    })))
}

/// GET /api/transactions/{id}
pub async fn get_handler(
    State(state): State<LedgerState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<TransactionView>>, DashboardError> {
    let Path(id) = id?;
    let tx = state.transactions.get(id).await?;
    Ok(Json(ApiResponse::success(tx)))
}

/// POST /api/transactions -> 201 with the stored row.
pub async fn create_handler(
    State(state): State<LedgerState>,
    body: Result<Json<CreateTransactionBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionView>>), DashboardError> {
    let Json(body) = body?;
    let new_tx = body.validate()?;
    let stored = state.transactions.create(new_tx).await?;
    info!(id = stored.id, kind = %stored.kind, amount = %stored.amount, "transaction created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(stored).with_message("Transaction created successfully")),
    ))
}

/// PATCH /api/transactions/{id} -> only the supplied members change.
pub async fn update_handler(
    State(state): State<LedgerState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<PatchTransactionBody>, JsonRejection>,
) -> Result<Json<ApiResponse<TransactionView>>, DashboardError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let patch = body.validate()?;
    let unchanged = patch.is_empty();

    let updated = state
        .transactions
        .update(id, patch)
        .await?
        .ok_or_else(|| not_found(id))?;

    let message = if unchanged {
        "No changes to update"
    } else {
        info!(id, "transaction updated");
        "Transaction updated successfully"
    };
    Ok(Json(ApiResponse::success(updated).with_message(message)))
}

/// DELETE /api/transactions/{id}
pub async fn delete_handler(
    State(state): State<LedgerState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, DashboardError> {
    let Path(id) = id?;
    if !state.transactions.delete(id).await? {
        return Err(not_found(id));
    }
    info!(id, "transaction deleted");
    Ok(Json(ApiResponse::message_only(
        "Transaction deleted successfully",
    )))
}
