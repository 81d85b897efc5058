//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{CatalogStore, PgCatalogStore, PgUserStore, UserStore};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The stores are trait objects so tests can
/// run the full router against in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Create application state from explicit stores.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { users, catalog }),
        }
    }

    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn from_pool(pool: &PgPool) -> Self {
        Self::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgCatalogStore::new(pool.clone())),
        )
    }

    /// Get the credential store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get the catalog repository.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.catalog.as_ref()
    }
}
