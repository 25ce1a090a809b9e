//! SIRET API Server
//!
//! Serves GET/POST/PUT/DELETE on /siret backed by Postgres.
//!
//! Environment:
//!   DATABASE_URL (or DB_USER/DB_PASSWORD/DB_HOST/DB_PORT/DB_NAME)
//!   SIRET_BIND_ADDR (default: 0.0.0.0:${PORT:-3000})
//!   SIRET_LOG_DIR / SIRET_LOG_FILE (default: ./log.txt)
//!   SIRET_REQUIRE_TRADE_NAME (default: false)

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use siret_api::{
    action_log::ActionLog,
    api::{build_router, AppState},
    config::ServerConfig,
    database::{DatabaseManager, EstablishmentStore},
    services::SiretService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,siret_api=debug,tower_http=debug")),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    // Database connection
    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    let store = db.establishment_store();
    store
        .ping()
        .await
        .context("database connectivity check failed")?;

    std::fs::create_dir_all(&config.log_dir).with_context(|| {
        format!("failed to create log directory {}", config.log_dir.display())
    })?;
    let (action_log, _log_guard) = ActionLog::to_file(&config.log_dir, &config.log_file);
    info!(
        "Action log: {}",
        config.log_dir.join(&config.log_file).display()
    );

    let service = SiretService::new(Arc::new(store), config.policy);
    let app = build_router(AppState::new(Arc::new(service), action_log));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("SIRET API listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
