//! Stockroom Core - Shared types library.
//!
//! This crate provides the types used across all Stockroom components:
//! - `web` - The catalog web application
//! - `cli` - Command-line tools for migrations, bulk import and sessions
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. This keeps the query rules testable in
//! isolation and shared between every store implementation.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, emails and product records
//! - [`query`] - Translation of raw listing parameters into a [`CatalogQuery`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod query;
pub mod types;

pub use query::{CatalogParams, CatalogQuery, PAGE_SIZE, SortDirection, SortField, SortOrder};
pub use types::*;
