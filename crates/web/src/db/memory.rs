//! In-memory stores for tests and local experiments.
//!
//! Both stores keep rows in insertion order behind a `tokio` `RwLock`, so
//! natural ordering and id assignment match the `PostgreSQL` stores.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use stockroom_core::{
    CatalogQuery, Email, NewProduct, Product, ProductId, ProductPatch, UserId,
};

use super::{CatalogStore, RepositoryError, UserStore};
use crate::models::user::{NewUser, User};

#[derive(Default)]
struct UserTable {
    next_id: i32,
    rows: Vec<(User, String)>,
}

/// [`UserStore`] backed by a vector.
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Returns `true` if no account has been stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_string()));
        }

        table.next_id += 1;
        let stored = User {
            id: UserId::new(table.next_id),
            username: user.username,
            email: user.email,
            created_at: Utc::now(),
        };
        table.rows.push((stored.clone(), user.password_hash));
        Ok(stored)
    }
}

#[derive(Default)]
struct ProductTable {
    next_id: i32,
    rows: Vec<Product>,
}

impl ProductTable {
    fn push(&mut self, product: NewProduct) -> Product {
        self.next_id += 1;
        let stored = product.with_id(ProductId::new(self.next_id));
        self.rows.push(stored.clone());
        stored
    }
}

/// [`CatalogStore`] backed by a vector.
#[derive(Default)]
pub struct MemoryCatalogStore {
    table: RwLock<ProductTable>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-filled with `products`, ids assigned in order.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = NewProduct>) -> Self {
        let mut table = ProductTable::default();
        for product in products {
            table.push(product);
        }
        Self {
            table: RwLock::new(table),
        }
    }

    /// Snapshot of every stored product in insertion order.
    pub async fn all(&self) -> Vec<Product> {
        self.table.read().await.rows.clone()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn count(&self, query: &CatalogQuery) -> Result<u64, RepositoryError> {
        let table = self.table.read().await;
        let count = table.rows.iter().filter(|p| query.matches(p)).count();
        Ok(count as u64)
    }

    async fn fetch(
        &self,
        query: &CatalogQuery,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let table = self.table.read().await;
        let mut matched: Vec<Product> = table
            .rows
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        // Stable, so ties keep insertion order.
        matched.sort_by(|a, b| query.compare(a, b));
        matched.truncate(limit as usize);
        Ok(matched)
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let table = self.table.read().await;
        let mut categories: Vec<String> =
            table.rows.iter().map(|p| p.category_name.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        Ok(self.table.write().await.push(product))
    }

    async fn insert_batch(&self, products: &[NewProduct]) -> Result<u64, RepositoryError> {
        let mut table = self.table.write().await;
        for product in products {
            table.push(product.clone());
        }
        Ok(products.len() as u64)
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<bool, RepositoryError> {
        let mut table = self.table.write().await;
        let Some(product) = table.rows.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        patch.apply(product);
        Ok(true)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|p| p.id != id);
        Ok(table.rows.len() < before)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
