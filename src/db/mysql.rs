use crate::config::DatabaseConfig;
use crate::db::schema;
use crate::error::DashboardError;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use tracing::info;

pub type MySqlPool = Pool<MySql>;

/// Open the connection pool and verify one connection can be established.
pub async fn connect(cfg: &DatabaseConfig) -> Result<MySqlPool, DashboardError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(cfg.max_connections.max(1))
        .acquire_timeout(cfg.acquire_timeout())
        .connect_with(cfg.connect_options())
        .await?;
    info!(
        host = %cfg.host,
        port = cfg.port,
        database = %cfg.name,
        max_connections = cfg.max_connections,
        "database connection pool initialized"
    );
    Ok(pool)
}

/// Build the pool without connecting; the first query opens a connection.
pub fn connect_lazy(cfg: &DatabaseConfig) -> MySqlPool {
    MySqlPoolOptions::new()
        .max_connections(cfg.max_connections.max(1))
        .acquire_timeout(cfg.acquire_timeout())
        .connect_lazy_with(cfg.connect_options())
}

/// Initialize the schema by executing the bundled DDL.
pub async fn init_schema(pool: &MySqlPool) -> Result<(), DashboardError> {
    for stmt in schema::statements() {
        sqlx::query(stmt).execute(pool).await?;
    }
    info!("schema initialized");
    Ok(())
}

/// `SELECT 1` round trip.
pub async fn ping(pool: &MySqlPool) -> Result<(), DashboardError> {
    let _: i64 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
