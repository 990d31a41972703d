use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ledgerboard::config::Config;
use ledgerboard::db;
use ledgerboard::router::{LedgerState, ledger_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.server.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.server.listen_addr,
        db_host = %cfg.database.host,
        db_name = %cfg.database.name,
        loglevel = %cfg.server.loglevel,
        seed_routes = cfg.server.enable_seed_routes,
    );

    let pool = db::connect(&cfg.database).await?;
    if cfg.database.init_schema {
        db::init_schema(&pool).await?;
    }
    if cfg.server.enable_seed_routes {
        warn!("development seed routes are enabled");
    }

    let state = LedgerState::new(pool.clone());
    let app = ledger_router(state, cfg.server.enable_seed_routes);

    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.server.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
