//! Business logic services for the web application.
//!
//! # Services
//!
//! - `auth` - Account registration and password verification

pub mod auth;
