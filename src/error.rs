use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum DashboardError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl DashboardError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        DashboardError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DashboardError::NotFound(msg.into())
    }

    fn is_foreign_key_violation(&self) -> bool {
        match self {
            DashboardError::DatabaseError(e) => e
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation()),
            _ => false,
        }
    }
}

impl From<JsonRejection> for DashboardError {
    fn from(rejection: JsonRejection) -> Self {
        DashboardError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for DashboardError {
    fn from(rejection: PathRejection) -> Self {
        DashboardError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for DashboardError {
    fn from(rejection: QueryRejection) -> Self {
        DashboardError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> axum::response::Response {
        if self.is_foreign_key_violation() {
            let body = ApiErrorResponse::new(
                "Invalid request",
                "Referenced category or customer does not exist.",
            );
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }

        let (status, body) = match self {
            DashboardError::DatabaseError(SqlxError::RowNotFound) => (
                StatusCode::NOT_FOUND,
                ApiErrorResponse::new("Not found", "Record not found."),
            ),
            DashboardError::DatabaseError(e) => {
                error!(error = %e, "database query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new(
                        "Internal server error",
                        "An internal server error occurred.",
                    ),
                )
            }
            DashboardError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("Invalid request", msg),
            ),
            DashboardError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ApiErrorResponse::new("Not found", msg))
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub status: &'static str,
    pub message: String,
    pub error: String,
}

impl ApiErrorResponse {
    pub fn new(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: DashboardError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn row_not_found_maps_to_404() {
        let (status, body) = render(SqlxError::RowNotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn database_failures_do_not_leak_details() {
        let (status, body) = render(SqlxError::PoolTimedOut.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal server error occurred.");
        assert!(!body.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn bad_request_echoes_reason() {
        let (status, body) = render(DashboardError::bad_request("Invalid customer ID")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid request");
        assert_eq!(body["error"], "Invalid customer ID");
    }
}
