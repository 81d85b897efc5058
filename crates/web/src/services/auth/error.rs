//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// A failed login is not an error: [`AuthService::verify`](super::AuthService::verify)
/// returns `Ok(None)` so callers cannot tell an unknown email from a wrong
/// password.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An account with this email already exists.
    #[error("email already registered")]
    DuplicateEmail,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
