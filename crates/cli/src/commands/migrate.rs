//! Database migration command.
//!
//! Runs the embedded migrations from `crates/web/migrations/`, then the
//! session store's own migration (`tower_sessions.session`).

use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

use super::CliError;

/// Run all migrations.
pub async fn run(pool: &PgPool) -> Result<(), CliError> {
    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../web/migrations").run(pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
