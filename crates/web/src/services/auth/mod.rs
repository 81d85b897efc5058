//! Authentication service.
//!
//! Registers accounts and verifies email/password pairs against Argon2id
//! hashes held by a [`UserStore`].

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{info, warn};

use stockroom_core::Email;

use crate::db::{RepositoryError, UserStore};
use crate::models::user::{NewUser, User};

/// Hash checked when the email is unknown, so both login failures cost one
/// Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("stockroom-unknown-account").ok());

/// Authentication service.
///
/// Borrows the credential store for the duration of a request.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserStore) -> Self {
        Self { users }
    }

    /// Register a new user.
    ///
    /// Nothing about the inputs is validated; the email is stored as typed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::from(email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(password)?;

        // A concurrent signup can still pass the check above; the unique
        // index turns that into a conflict.
        let user = self
            .users
            .insert(NewUser {
                username: username.to_string(),
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verify an email/password pair.
    ///
    /// Returns `Ok(None)` both for an unknown email and for a wrong password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Option<User>, AuthError> {
        let email = Email::from(email);

        let Some((user, password_hash)) = self.users.find_by_email(&email).await? else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            return Ok(None);
        };

        if verify_password(password, &password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC string.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        warn!("Stored password hash is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryUserStore, MockUserStore};

    #[tokio::test]
    async fn test_register_then_verify() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);

        let user = auth.register("ann", "ann@x.com", "p1").await.unwrap();
        assert_eq!(user.email.as_str(), "ann@x.com");

        let verified = auth.verify("ann@x.com", "p1").await.unwrap().unwrap();
        assert_eq!(verified.id, user.id);
        assert_eq!(verified.username, "ann");
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);
        auth.register("ann", "ann@x.com", "p1").await.unwrap();

        let (_, hash) = store
            .find_by_email(&Email::from("ann@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert_ne!(hash, "p1");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_duplicate_email_keeps_original_account() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);
        auth.register("ann", "a@x.com", "p1").await.unwrap();

        let err = auth.register("bob", "a@x.com", "p2").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(store.len().await, 1);

        let verified = auth.verify("a@x.com", "p1").await.unwrap().unwrap();
        assert_eq!(verified.username, "ann");
        assert!(auth.verify("a@x.com", "p2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);
        auth.register("ann", "Ann@x.com", "p1").await.unwrap();

        assert!(auth.verify("ann@x.com", "p1").await.unwrap().is_none());
        assert!(auth.register("ann2", "ann@x.com", "p1").await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_verifications_look_the_same() {
        let store = MemoryUserStore::new();
        let auth = AuthService::new(&store);
        auth.register("ann", "a@x.com", "p1").await.unwrap();

        let wrong_password = auth.verify("a@x.com", "nope").await.unwrap();
        let unknown_email = auth.verify("b@x.com", "p1").await.unwrap();
        assert_eq!(wrong_password, unknown_email);
        assert!(wrong_password.is_none());
    }

    #[tokio::test]
    async fn test_insert_race_maps_to_duplicate_email() {
        let mut store = MockUserStore::new();
        store.expect_find_by_email().returning(|_| Ok(None));
        store
            .expect_insert()
            .returning(|_| Err(RepositoryError::Conflict("email already exists".to_string())));

        let auth = AuthService::new(&store);
        let err = auth.register("ann", "a@x.com", "p1").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }

    #[test]
    fn test_malformed_stored_hash_never_verifies() {
        assert!(!verify_password("p1", "plaintext"));
    }
}
