//! CLI command implementations.

pub mod import;
pub mod migrate;
pub mod sessions;

use sqlx::PgPool;
use thiserror::Error;

use stockroom_web::config::{ConfigError, WebConfig};
use stockroom_web::db::{self, RepositoryError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Session store error: {0}")]
    SessionStore(#[from] tower_sessions::session_store::Error),

    #[error(transparent)]
    Import(#[from] import::ImportError),
}

/// Connect to the database named by the environment.
pub async fn connect() -> Result<PgPool, CliError> {
    let config = WebConfig::from_env()?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&config.database_url).await?)
}
