pub mod db;
pub mod user;

use sqlx::PgPool;

use crate::config::config;
use crate::database::DatabaseManager;

/// Eager pool from the process configuration; commands fail fast without a database
pub(crate) async fn connect() -> anyhow::Result<PgPool> {
    let pool = DatabaseManager::connect(&config().database).await?;
    Ok(pool)
}
