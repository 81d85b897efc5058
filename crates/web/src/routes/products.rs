//! Catalog route handlers.
//!
//! Every handler here takes [`RequireAuth`] as its first extractor, so an
//! anonymous request is redirected before the catalog is touched.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use stockroom_core::{
    CatalogParams, CatalogQuery, NewProduct, PAGE_SIZE, Product, ProductId, ProductPatch,
    SortOrder,
};

use super::notice::{MessageQuery, Notice};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Sort choices offered on the listing page, in display order.
const SORT_OPTIONS: [(&str, &str); 4] = [
    ("price_asc", "Price: low to high"),
    ("price_desc", "Price: high to low"),
    ("reviews_asc", "Reviews: fewest first"),
    ("reviews_desc", "Reviews: most first"),
];

// =============================================================================
// View Types
// =============================================================================

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub asin: String,
    pub title: String,
    pub category_name: String,
    pub stars: f64,
    /// Price for display, two decimals.
    pub price: String,
    /// Exact stored price, used to pre-fill the edit form.
    pub price_input: String,
    pub reviews: Option<i32>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            asin: product.asin,
            title: product.title,
            category_name: product.category_name,
            stars: product.stars,
            price: format!("{:.2}", product.price),
            price_input: product.price.to_string(),
            reviews: product.reviews,
        }
    }
}

/// Category entry for the filter dropdown.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub name: String,
    pub selected: bool,
}

/// Sort entry for the sort dropdown.
#[derive(Debug, Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Raw filter inputs echoed back into the filter form.
#[derive(Debug, Clone, Default)]
pub struct FilterValues {
    pub search: String,
    pub min_price: String,
    pub max_price: String,
    pub min_stars: String,
}

impl From<&CatalogParams> for FilterValues {
    fn from(params: &CatalogParams) -> Self {
        let value = |field: &Option<String>| field.clone().unwrap_or_default();
        Self {
            search: value(&params.search),
            min_price: value(&params.min_price),
            max_price: value(&params.max_price),
            min_stars: value(&params.min_stars),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add product form data.
///
/// Every field is required; stars and price must parse as numbers.
#[derive(Debug, Default, Deserialize)]
pub struct AddProductForm {
    pub asin: Option<String>,
    pub title: Option<String>,
    #[serde(alias = "categoryName", alias = "category")]
    pub category_name: Option<String>,
    pub stars: Option<String>,
    pub price: Option<String>,
}

impl AddProductForm {
    fn into_new_product(self) -> Result<NewProduct, AppError> {
        Ok(NewProduct {
            asin: required(self.asin, "asin")?,
            title: required(self.title, "title")?,
            category_name: required(self.category_name, "categoryName")?,
            stars: required_number(self.stars, "stars")?,
            price: required_number(self.price, "price")?,
            reviews: None,
        })
    }
}

/// Edit product form data.
///
/// Absent fields keep their stored value, and so do numbers that fail to
/// parse.
#[derive(Debug, Default, Deserialize)]
pub struct EditProductForm {
    pub title: Option<String>,
    #[serde(alias = "category_name", alias = "categoryName")]
    pub category: Option<String>,
    pub stars: Option<String>,
    pub price: Option<String>,
}

impl From<EditProductForm> for ProductPatch {
    fn from(form: EditProductForm) -> Self {
        Self {
            title: form.title,
            category_name: form.category,
            stars: form.stars.as_deref().and_then(parse_number),
            price: form.price.as_deref().and_then(parse_number),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::BadRequest(format!("missing field: {field}")))
}

fn required_number(value: Option<String>, field: &str) -> Result<f64, AppError> {
    let raw = required(value, field)?;
    parse_number(&raw).ok_or_else(|| AppError::BadRequest(format!("{field} must be a number")))
}

/// Parse a path id; anything that is not an id cannot name a product.
fn parse_id(raw: &str) -> Result<ProductId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("product {raw}")))
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct IndexTemplate {
    pub username: String,
    pub notice: Option<Notice>,
    pub products: Vec<ProductView>,
    pub total_count: u64,
    pub categories: Vec<CategoryOption>,
    pub sort_options: Vec<SortOption>,
    pub filters: FilterValues,
}

/// Add product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/add.html")]
pub struct AddTemplate {
    pub username: String,
}

/// Edit product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/edit.html")]
pub struct EditTemplate {
    pub username: String,
    pub product: ProductView,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ShowTemplate {
    pub username: String,
    pub product: ProductView,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the filtered, sorted catalog listing (first page only).
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let message = MessageQuery::from_pairs(pairs.iter().map(|(k, v)| (k, v)));
    let params = CatalogParams::from_pairs(pairs.iter().map(|(k, v)| (k, v)));
    let query = CatalogQuery::build(&params);
    let catalog = state.catalog();

    let total_count = catalog.count(&query).await?;
    let products = if total_count > 0 {
        catalog.fetch(&query, PAGE_SIZE).await?
    } else {
        Vec::new()
    };

    let categories = catalog
        .distinct_categories()
        .await?
        .into_iter()
        .map(|name| CategoryOption {
            selected: query.category.as_deref() == Some(name.as_str()),
            name,
        })
        .collect();

    let selected_sort = query.sort.as_ref().map(SortOrder::as_param);
    let sort_options = SORT_OPTIONS
        .iter()
        .map(|&(value, label)| SortOption {
            value,
            label,
            selected: selected_sort == Some(value),
        })
        .collect();

    tracing::debug!(
        total_count,
        shown = products.len(),
        filtered = !query.is_unfiltered(),
        "Catalog listed"
    );

    Ok(IndexTemplate {
        username: user.username,
        notice: message.notice(),
        products: products.into_iter().map(ProductView::from).collect(),
        total_count,
        categories,
        sort_options,
        filters: FilterValues::from(&params),
    })
}

/// Display the add product form.
pub async fn add_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    AddTemplate {
        username: user.username,
    }
}

/// Handle add product form submission.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<AddProductForm>,
) -> Result<Response, AppError> {
    let product = state.catalog().insert(form.into_new_product()?).await?;
    tracing::info!(product_id = %product.id, "Product added");

    Ok(Redirect::to("/?success=product_added").into_response())
}

/// Display the edit form for an existing product.
#[instrument(skip(user, state), fields(user_id = %user.id))]
pub async fn edit_page(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let product = state
        .catalog()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(EditTemplate {
        username: user.username,
        product: product.into(),
    })
}

/// Handle edit form submission.
#[instrument(skip(user, state, form), fields(user_id = %user.id))]
pub async fn edit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<EditProductForm>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let patch = ProductPatch::from(form);
    let unchanged = patch.is_empty();

    if !state.catalog().update(id, patch).await? {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    tracing::info!(product_id = %id, unchanged, "Product updated");

    Ok(Redirect::to("/?success=product_updated").into_response())
}

/// Delete a product. Deleting a missing product still redirects.
#[instrument(skip(user, state), fields(user_id = %user.id))]
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    if let Ok(id) = parse_id(&id) {
        let deleted = state.catalog().delete(id).await?;
        tracing::info!(product_id = %id, deleted, "Product delete requested");
    }

    Ok(Redirect::to("/?success=product_deleted").into_response())
}

/// Display a single product.
#[instrument(skip(user, state), fields(user_id = %user.id))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let product = state
        .catalog()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ShowTemplate {
        username: user.username,
        product: product.into(),
    })
}
