//! Bulk product import from a CSV export.
//!
//! # Usage
//!
//! ```bash
//! stockroom import amz_ca_total_products_data_processed.csv
//! ```
//!
//! The file needs a header row with at least `asin`, `title`, `stars`,
//! `reviews`, `price` and `categoryName`. Other columns are ignored. The
//! whole file is parsed before anything is written, and all rows are
//! inserted in one transaction.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use stockroom_core::NewProduct;
use stockroom_web::db::{CatalogStore, PgCatalogStore};

use super::CliError;

/// Errors that can occur while reading an import file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("invalid record at line {line}: {source}")]
    Record { line: u64, source: csv::Error },
}

/// One CSV row.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    asin: String,
    title: String,
    stars: f64,
    reviews: Option<i32>,
    price: f64,
    #[serde(rename = "categoryName")]
    category_name: String,
}

impl From<CsvRecord> for NewProduct {
    fn from(record: CsvRecord) -> Self {
        Self {
            asin: record.asin,
            title: record.title,
            category_name: record.category_name,
            stars: record.stars,
            price: record.price,
            reviews: record.reviews,
        }
    }
}

/// Parse every record, failing on the first bad row.
fn parse_products<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<NewProduct>, ImportError> {
    let mut products = Vec::new();

    for result in reader.deserialize::<CsvRecord>() {
        let record = result.map_err(|source| ImportError::Record {
            line: source.position().map_or(0, csv::Position::line),
            source,
        })?;
        products.push(record.into());
    }

    Ok(products)
}

/// Import the products in `path`.
pub async fn run(pool: &PgPool, path: &Path) -> Result<(), CliError> {
    let reader = csv::Reader::from_path(path).map_err(|source| ImportError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let products = parse_products(reader)?;
    tracing::info!(rows = products.len(), "Parsed import file");

    let inserted = PgCatalogStore::new(pool.clone())
        .insert_batch(&products)
        .await?;

    tracing::info!(inserted, "Import complete!");
    Ok(())
}
