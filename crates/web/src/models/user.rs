//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use stockroom_core::{Email, UserId};

/// A registered user (domain type).
///
/// Users are immutable after signup. The password hash never leaves the
/// credential store, so it is not part of this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name shown in the page header.
    pub username: String,
    /// Login email, unique and case-sensitive.
    pub email: Email,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
}

/// A user about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
}
