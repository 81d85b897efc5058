//! Product records.

use serde::{Deserialize, Serialize};

use super::ProductId;

/// A catalog entry as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: ProductId,
    /// External (ASIN-like) identifier. Not unique.
    pub asin: String,
    /// Product title, the target of text search.
    pub title: String,
    /// Category name, matched exactly when filtering.
    pub category_name: String,
    /// Star rating. No range is enforced.
    pub stars: f64,
    /// Price. No sign is enforced.
    pub price: f64,
    /// Review count, known only for imported products.
    pub reviews: Option<i32>,
}

/// Fields for a product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub asin: String,
    pub title: String,
    pub category_name: String,
    pub stars: f64,
    pub price: f64,
    pub reviews: Option<i32>,
}

impl NewProduct {
    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            asin: self.asin,
            title: self.title,
            category_name: self.category_name,
            stars: self.stars,
            price: self.price,
            reviews: self.reviews,
        }
    }
}

/// A partial update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub category_name: Option<String>,
    pub stars: Option<f64>,
    pub price: Option<f64>,
}

impl ProductPatch {
    /// Returns `true` if the patch would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category_name.is_none()
            && self.stars.is_none()
            && self.price.is_none()
    }

    /// Overwrite the supplied fields of `product`.
    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(category_name) = self.category_name {
            product.category_name = category_name;
        }
        if let Some(stars) = self.stars {
            product.stars = stars;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
    }
}
