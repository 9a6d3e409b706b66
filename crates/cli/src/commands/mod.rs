//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod tokens;
pub mod user;

use shopdemo_api::config::{ApiConfig, ConfigError};
use shopdemo_api::db;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] db::RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] shopdemo_api::services::AuthError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] shopdemo_core::EmailError),

    #[error("Invalid role: {0}. Valid roles: admin, user")]
    InvalidRole(String),

    #[error("No user with email: {0}")]
    UserNotFound(String),
}

/// Load configuration and open a small pool for a one-off command.
async fn connect() -> Result<(ApiConfig, PgPool), CommandError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, 2).await?;
    Ok((config, pool))
}
