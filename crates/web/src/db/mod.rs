//! Persistence for the catalog and user accounts.
//!
//! # Database: `stockroom`
//!
//! ## Tables
//!
//! - `catalog.user` - Accounts (unique email, Argon2 password hash)
//! - `catalog.product` - Catalog entries
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Ports
//!
//! Handlers never talk to `sqlx` directly. They go through two ports,
//! [`UserStore`] and [`CatalogStore`], held as trait objects in
//! [`AppState`](crate::state::AppState). `PostgreSQL` implementations live in
//! [`users`] and [`products`]; in-memory implementations live in
//! [`memory`] behind the `test-support` feature.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p stockroom-cli -- migrate
//! ```

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use stockroom_core::{CatalogQuery, Email, NewProduct, Product, ProductId, ProductPatch};

use crate::models::user::{NewUser, User};

#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemoryCatalogStore, MemoryUserStore};
pub use products::PgCatalogStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Port for user account persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user and their password hash by exact email.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<(User, String)>, RepositoryError>;

    /// Insert a new user.
    ///
    /// Fails with [`RepositoryError::Conflict`] when the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
}

/// Port for catalog persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Count the products matching `query`'s filters.
    async fn count(&self, query: &CatalogQuery) -> Result<u64, RepositoryError>;

    /// Fetch at most `limit` matching products, ordered as `query` asks.
    async fn fetch(&self, query: &CatalogQuery, limit: u32)
    -> Result<Vec<Product>, RepositoryError>;

    /// Every category name currently in the catalog, sorted.
    async fn distinct_categories(&self) -> Result<Vec<String>, RepositoryError>;

    /// Get a product by id.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a product and return it with its id.
    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Insert many products in one unit of work. Returns the number inserted.
    async fn insert_batch(&self, products: &[NewProduct]) -> Result<u64, RepositoryError>;

    /// Overwrite the supplied fields. Returns `false` if no such product.
    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<bool, RepositoryError>;

    /// Delete a product. Returns `false` if no such product.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
