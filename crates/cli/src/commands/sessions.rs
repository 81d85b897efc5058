//! Session maintenance commands.
//!
//! Session ids are not signed, so restarting the server does not log
//! anybody out. `purge` is the way to invalidate every session at once.

use sqlx::PgPool;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;

use super::CliError;

/// Delete every stored session.
pub async fn purge(pool: &PgPool) -> Result<(), CliError> {
    let result = sqlx::query(r#"DELETE FROM "tower_sessions"."session""#)
        .execute(pool)
        .await?;

    tracing::info!(deleted = result.rows_affected(), "Sessions purged");
    Ok(())
}

/// Delete sessions past their expiry.
pub async fn prune(pool: &PgPool) -> Result<(), CliError> {
    PostgresStore::new(pool.clone()).delete_expired().await?;

    tracing::info!("Expired sessions deleted");
    Ok(())
}
