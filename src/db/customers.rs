use crate::db::models::{Customer, CustomerOption, TransactionView};
use crate::db::mysql::MySqlPool;
use crate::db::transactions::TransactionFilter;
use crate::error::DashboardError;

#[derive(Clone)]
pub struct CustomersStorage {
    pool: MySqlPool,
}

impl CustomersStorage {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list_options(&self) -> Result<Vec<CustomerOption>, DashboardError> {
        let rows = sqlx::query_as::<_, CustomerOption>(
            "SELECT id, name FROM customers ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Customer>, DashboardError> {
        let row = sqlx::query_as::<_, Customer>(
            r#"SELECT id, name, email, business_size, lifetime_value, acquisition_date
               FROM customers WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Every transaction of one customer, newest first.
    pub async fn transactions(&self, id: i64) -> Result<Vec<TransactionView>, DashboardError> {
        let mut qb = TransactionFilter::for_customer(Some(id)).list_query(i64::MAX, 0);
        let rows = qb
            .build_query_as::<TransactionView>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// First `limit` customers by id.
    pub async fn first(&self, limit: i64) -> Result<Vec<CustomerOption>, DashboardError> {
        let rows = sqlx::query_as::<_, CustomerOption>(
            "SELECT id, name FROM customers ORDER BY id LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
