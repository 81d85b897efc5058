//! Catalog query construction.
//!
//! Listing requests arrive as loosely-typed query-string parameters. They
//! are parsed here, once, into a [`CatalogQuery`] with explicit optional
//! fields. Every rule is a silent default: a parameter that cannot be used
//! is dropped, never reported.
//!
//! | Parameter   | Effect                                                   |
//! |-------------|----------------------------------------------------------|
//! | `search`    | case-insensitive substring match on the title            |
//! | `category`  | exact, case-sensitive match on the category name         |
//! | `min_price` | inclusive lower bound on price                           |
//! | `max_price` | inclusive upper bound on price                           |
//! | `min_stars` | inclusive lower bound on the star rating                 |
//! | `sort_by`   | `price_asc`, `price_desc`, `reviews_asc`, `reviews_desc` |
//!
//! All filters are AND-combined. There is no disjunction.

use core::cmp::Ordering;

use crate::types::Product;

/// Number of products shown on the listing page. Only the first page is
/// ever fetched.
pub const PAGE_SIZE: u32 = 10;

/// Raw listing parameters exactly as they appear in the query string.
#[derive(Debug, Clone, Default)]
pub struct CatalogParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_stars: Option<String>,
    pub sort_by: Option<String>,
}

impl CatalogParams {
    /// Collect listing parameters from decoded query-string pairs.
    ///
    /// A repeated key keeps its first value. Unknown keys are ignored.
    ///
    /// ```
    /// use stockroom_core::CatalogParams;
    ///
    /// let params = CatalogParams::from_pairs([("min_price", "1"), ("min_price", "2")]);
    /// assert_eq!(params.min_price.as_deref(), Some("1"));
    /// ```
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "search" => &mut params.search,
                "category" => &mut params.category,
                "min_price" => &mut params.min_price,
                "max_price" => &mut params.max_price,
                "min_stars" => &mut params.min_stars,
                "sort_by" => &mut params.sort_by,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.as_ref().to_owned());
            }
        }
        params
    }
}

/// Field a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Reviews,
}

/// Direction of an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A requested ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    /// Parse a `sort_by` value. Unknown values yield `None` (natural order).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (field, direction) = match value {
            "price_asc" => (SortField::Price, SortDirection::Ascending),
            "price_desc" => (SortField::Price, SortDirection::Descending),
            "reviews_asc" => (SortField::Reviews, SortDirection::Ascending),
            "reviews_desc" => (SortField::Reviews, SortDirection::Descending),
            _ => return None,
        };
        Some(Self { field, direction })
    }

    /// The `sort_by` value this ordering was parsed from.
    #[must_use]
    pub const fn as_param(&self) -> &'static str {
        match (self.field, self.direction) {
            (SortField::Price, SortDirection::Ascending) => "price_asc",
            (SortField::Price, SortDirection::Descending) => "price_desc",
            (SortField::Reviews, SortDirection::Ascending) => "reviews_asc",
            (SortField::Reviews, SortDirection::Descending) => "reviews_desc",
        }
    }
}

/// A typed, validated catalog query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    /// Case-insensitive title substring. Never empty.
    pub search: Option<String>,
    /// Exact category name. Never empty.
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_stars: Option<f64>,
    /// `None` means natural (store) order.
    pub sort: Option<SortOrder>,
}

impl CatalogQuery {
    /// Build a query from raw listing parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use stockroom_core::{CatalogParams, CatalogQuery};
    ///
    /// let params = CatalogParams {
    ///     min_price: Some("10".into()),
    ///     max_price: Some("abc".into()),
    ///     ..CatalogParams::default()
    /// };
    /// let query = CatalogQuery::build(&params);
    /// assert_eq!(query.min_price, Some(10.0));
    /// assert_eq!(query.max_price, None);
    /// ```
    #[must_use]
    pub fn build(params: &CatalogParams) -> Self {
        Self {
            search: non_empty(params.search.as_deref()),
            category: non_empty(params.category.as_deref()),
            min_price: parse_number(params.min_price.as_deref()),
            max_price: parse_number(params.max_price.as_deref()),
            min_stars: parse_number(params.min_stars.as_deref()),
            sort: params.sort_by.as_deref().and_then(SortOrder::parse),
        }
    }

    /// Returns `true` if no filter applies (ordering is ignored).
    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        self.search.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_stars.is_none()
    }

    /// Evaluate every filter of this query against a product.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search
            && !product
                .title
                .to_lowercase()
                .contains(&search.to_lowercase())
        {
            return false;
        }
        if let Some(category) = &self.category
            && product.category_name != *category
        {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.min_stars.is_some_and(|min| product.stars < min) {
            return false;
        }
        true
    }

    /// Order two products by this query's sort key.
    ///
    /// Returns `Ordering::Equal` for natural order so a stable sort keeps
    /// store order. A missing review count sorts before any count.
    #[must_use]
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let Some(sort) = self.sort else {
            return Ordering::Equal;
        };
        let ordering = match sort.field {
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::Reviews => a.reviews.cmp(&b.reviews),
        };
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Parse a numeric parameter; anything unusable counts as absent.
fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| !n.is_nan())
}
