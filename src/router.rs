use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::db::{CustomersStorage, MySqlPool, TransactionsStorage};
use crate::handlers::{analytics, customers, dashboard, health, seed, transactions};

#[derive(Clone)]
pub struct LedgerState {
    pub pool: MySqlPool,
    pub transactions: TransactionsStorage,
    pub customers: CustomersStorage,
}

impl LedgerState {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            transactions: TransactionsStorage::new(pool.clone()),
            customers: CustomersStorage::new(pool.clone()),
            pool,
        }
    }
}

pub fn ledger_router(state: LedgerState, enable_seed_routes: bool) -> Router {
    let analytics_routes = Router::new()
        .route("/summary", get(analytics::summary_handler))
        .route("/segments", get(analytics::segments_handler))
        .route("/funnel", get(analytics::funnel_handler))
        .route("/cashflow", get(analytics::cashflow_handler))
        .route("/kpis", get(analytics::kpis_handler))
        .route("/customer-growth", get(analytics::customer_growth_handler))
        .route("/lifetime-value", get(analytics::lifetime_value_handler))
        .route("/revenue-by-age", get(analytics::revenue_by_age_handler))
        .route("/recurring-revenue", get(analytics::recurring_revenue_handler))
        .route("/expense-trends", get(analytics::expense_trends_handler))
        .route("/deal-velocity", get(analytics::deal_velocity_handler))
        .route("/profitability", get(analytics::profitability_handler));

    let mut api = Router::new()
        .route("/health", get(health::health_handler))
        .route("/dashboard", get(dashboard::dashboard_handler))
        .route("/dashboard/monthly-data", get(dashboard::monthly_data_handler))
        .nest("/analytics", analytics_routes)
        .route(
            "/transactions",
            get(transactions::list_handler).post(transactions::create_handler),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get_handler)
                .patch(transactions::update_handler)
                .delete(transactions::delete_handler),
        )
        .route("/customers", get(customers::list_handler))
        .route("/customers/{id}", get(customers::detail_handler));

    if enable_seed_routes {
        api = api
            .route("/seed/cashflow", post(seed::cashflow_handler))
            .route("/seed/transactions", post(seed::transactions_handler))
            .route("/seed/assign-customers", post(seed::assign_customers_handler));
    }

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
