//! Catalog repository for database operations.
//!
//! Listing queries are composed with [`sqlx::QueryBuilder`]: every user
//! value is a bound parameter, only fixed SQL fragments are pushed as text.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use stockroom_core::{
    CatalogQuery, NewProduct, Product, ProductId, ProductPatch, SortDirection, SortField,
};

use super::{CatalogStore, RepositoryError};

/// Rows per multi-row `INSERT` (6 bind parameters each).
const INSERT_CHUNK_SIZE: usize = 1000;

const PRODUCT_COLUMNS: &str = "id, asin, title, category_name, stars, price, reviews";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    asin: String,
    title: String,
    category_name: String,
    stars: f64,
    price: f64,
    reviews: Option<i32>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            asin: row.asin,
            title: row.title,
            category_name: row.category_name,
            stars: row.stars,
            price: row.price,
            reviews: row.reviews,
        }
    }
}

/// `PostgreSQL`-backed [`CatalogStore`].
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the `WHERE` clause for `query`'s filters.
fn push_filters(builder: &mut QueryBuilder<'static, Postgres>, query: &CatalogQuery) {
    let mut separator = " WHERE ";

    if let Some(search) = &query.search {
        builder
            .push(separator)
            .push("strpos(lower(title), lower(")
            .push_bind(search.clone())
            .push(")) > 0");
        separator = " AND ";
    }
    if let Some(category) = &query.category {
        builder
            .push(separator)
            .push("category_name = ")
            .push_bind(category.clone());
        separator = " AND ";
    }
    if let Some(min) = query.min_price {
        builder.push(separator).push("price >= ").push_bind(min);
        separator = " AND ";
    }
    if let Some(max) = query.max_price {
        builder.push(separator).push("price <= ").push_bind(max);
        separator = " AND ";
    }
    if let Some(min) = query.min_stars {
        builder.push(separator).push("stars >= ").push_bind(min);
    }
}

/// `ORDER BY` clause; `id` keeps ties and natural order stable.
///
/// Missing review counts come first when ascending and last when
/// descending, matching [`CatalogQuery::compare`].
const fn order_clause(query: &CatalogQuery) -> &'static str {
    let Some(sort) = query.sort else {
        return " ORDER BY id";
    };
    match (sort.field, sort.direction) {
        (SortField::Price, SortDirection::Ascending) => " ORDER BY price ASC, id",
        (SortField::Price, SortDirection::Descending) => " ORDER BY price DESC, id",
        (SortField::Reviews, SortDirection::Ascending) => " ORDER BY reviews ASC NULLS FIRST, id",
        (SortField::Reviews, SortDirection::Descending) => {
            " ORDER BY reviews DESC NULLS LAST, id"
        }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn count(&self, query: &CatalogQuery) -> Result<u64, RepositoryError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM catalog.product");
        push_filters(&mut builder, query);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn fetch(
        &self,
        query: &CatalogQuery,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut builder = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM catalog.product"));
        push_filters(&mut builder, query);
        builder.push(order_clause(query));
        builder.push(" LIMIT ").push_bind(i64::from(limit));

        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let categories = sqlx::query_scalar::<_, String>(
            r"
            SELECT DISTINCT category_name
            FROM catalog.product
            ORDER BY category_name
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM catalog.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO catalog.product (asin, title, category_name, stars, price, reviews)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.asin)
        .bind(&product.title)
        .bind(&product.category_name)
        .bind(product.stars)
        .bind(product.price)
        .bind(product.reviews)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn insert_batch(&self, products: &[NewProduct]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in products.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO catalog.product (asin, title, category_name, stars, price, reviews) ",
            );
            builder.push_values(chunk, |mut row, product| {
                row.push_bind(product.asin.clone())
                    .push_bind(product.title.clone())
                    .push_bind(product.category_name.clone())
                    .push_bind(product.stars)
                    .push_bind(product.price)
                    .push_bind(product.reviews);
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE catalog.product
            SET title = COALESCE($2, title),
                category_name = COALESCE($3, category_name),
                stars = COALESCE($4, stars),
                price = COALESCE($5, price)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.category_name)
        .bind(patch.stars)
        .bind(patch.price)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use stockroom_core::CatalogParams;

    use super::*;

    fn sql_for(params: &CatalogParams) -> String {
        let query = CatalogQuery::build(params);
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM catalog.product");
        push_filters(&mut builder, &query);
        builder.push(order_clause(&query));
        builder.sql().to_owned()
    }

    #[test]
    fn test_unfiltered_sql() {
        assert_eq!(
            sql_for(&CatalogParams::default()),
            "SELECT COUNT(*) FROM catalog.product ORDER BY id"
        );
    }

    #[test]
    fn test_filters_bind_every_value() {
        let sql = sql_for(&CatalogParams {
            search: Some("lamp'; DROP TABLE x; --".to_owned()),
            category: Some("Lighting".to_owned()),
            min_price: Some("10".to_owned()),
            max_price: Some("20".to_owned()),
            min_stars: Some("4".to_owned()),
            sort_by: Some("price_desc".to_owned()),
        });

        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM catalog.product \
             WHERE strpos(lower(title), lower($1)) > 0 \
             AND category_name = $2 \
             AND price >= $3 \
             AND price <= $4 \
             AND stars >= $5 \
             ORDER BY price DESC, id"
        );
    }

    #[test]
    fn test_unparseable_bound_adds_no_clause() {
        let sql = sql_for(&CatalogParams {
            min_price: Some("abc".to_owned()),
            max_price: Some("20".to_owned()),
            ..CatalogParams::default()
        });
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM catalog.product WHERE price <= $1 ORDER BY id"
        );
    }

    #[test]
    fn test_reviews_order_places_missing_counts() {
        let asc = CatalogQuery::build(&CatalogParams {
            sort_by: Some("reviews_asc".to_owned()),
            ..CatalogParams::default()
        });
        assert_eq!(order_clause(&asc), " ORDER BY reviews ASC NULLS FIRST, id");

        let desc = CatalogQuery::build(&CatalogParams {
            sort_by: Some("reviews_desc".to_owned()),
            ..CatalogParams::default()
        });
        assert_eq!(order_clause(&desc), " ORDER BY reviews DESC NULLS LAST, id");
    }
}
