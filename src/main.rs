use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pdd_api::config::config;
use pdd_api::database::DatabaseManager;
use pdd_api::storage::LocalFileStorage;
use pdd_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting PDD API in {:?} mode", config.environment);
    if pdd_api::is_development!() {
        tracing::warn!("Development defaults in use; set APP_ENV and JWT_SECRET for deployments");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }

    let storage = LocalFileStorage::new(&config.storage.media_root, &config.storage.media_url);
    let state = AppState::new(pool, config.clone(), Arc::new(storage));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("PDD API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
