//! Core types for Stockroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod product;

pub use email::Email;
pub use id::*;
pub use product::{NewProduct, Product, ProductPatch};
