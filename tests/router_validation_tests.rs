use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use ledgerboard::config::DatabaseConfig;
use ledgerboard::db;
use ledgerboard::router::{LedgerState, ledger_router};
use serde_json::Value;
use tower::ServiceExt;

/// Router over a pool that can never connect; anything reaching the database
/// fails after a one second acquire timeout.
fn unreachable_app(enable_seed_routes: bool) -> Router {
    let cfg = DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        acquire_timeout_secs: 1,
        max_connections: 2,
        ..DatabaseConfig::default()
    };
    let pool = db::connect_lazy(&cfg);
    ledger_router(LedgerState::new(pool), enable_seed_routes)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn invalid_customer_id_is_rejected_before_querying() {
    for uri in [
        "/api/dashboard?customerId=abc",
        "/api/dashboard/monthly-data?customerId=-1",
        "/api/analytics/summary?customerId=1.5",
        "/api/analytics/cashflow?customerId=x",
        "/api/analytics/kpis?customerId=0",
    ] {
        let (status, body) = send(unreachable_app(false), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Invalid customer ID");
    }
}

#[tokio::test]
async fn bad_listing_parameters_return_400() {
    for uri in [
        "/api/transactions?type=refund",
        "/api/transactions?limit=0",
        "/api/transactions?limit=5000",
        "/api/transactions?offset=-10",
        "/api/transactions?startDate=2024-13-01",
        "/api/transactions?startDate=2024-06-01&endDate=2024-05-01",
    ] {
        let (status, body) = send(unreachable_app(false), get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Invalid request");
    }
}

#[tokio::test]
async fn create_rejects_malformed_and_incomplete_bodies() {
    let (status, body) = send(
        unreachable_app(false),
        json_request("POST", "/api/transactions", "{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, body) = send(
        unreachable_app(false),
        json_request("POST", "/api/transactions", r#"{"amount": 12.5}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Missing required fields: transaction_date, amount, type, and category_id are required"
    );

    let (status, _) = send(
        unreachable_app(false),
        json_request(
            "POST",
            "/api/transactions",
            r#"{"transaction_date": "2024-03-01", "amount": 0, "type": "revenue", "category_id": 1}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_ids_return_400() {
    let (status, body) = send(unreachable_app(false), get("/api/transactions/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = send(unreachable_app(false), get("/api/customers/first")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        unreachable_app(false),
        json_request("PATCH", "/api/transactions/x", r#"{"amount": 5}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn seed_routes_are_absent_unless_enabled() {
    for uri in [
        "/api/seed/cashflow",
        "/api/seed/transactions",
        "/api/seed/assign-customers",
    ] {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(unreachable_app(false), req).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn enabled_seed_routes_reach_the_database() {
    for uri in [
        "/api/seed/cashflow",
        "/api/seed/transactions",
        "/api/seed/assign-customers",
    ] {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(unreachable_app(true), req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["status"], "error");
    }
}

#[tokio::test]
async fn database_outage_returns_generic_500() {
    for uri in ["/api/customers", "/api/health", "/api/analytics/segments"] {
        let (status, body) = send(unreachable_app(false), get(uri)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "An internal server error occurred.");
    }
}

#[tokio::test]
async fn dashboard_degrades_to_partial_when_sections_fail() {
    let (status, body) = send(unreachable_app(false), get("/api/dashboard?customerId=7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body.get("partial").is_none());

    let data = &body["data"];
    assert_eq!(data["partial"], true);
    assert_eq!(data["customerId"], 7);
    assert_eq!(data["failedSections"].as_array().unwrap().len(), 7);
    assert_eq!(data["recentTransactions"], serde_json::json!([]));
    assert_eq!(data["financialSummary"]["monthlyRevenue"], 0.0);
}
