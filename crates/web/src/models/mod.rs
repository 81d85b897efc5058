//! Domain models for the web application.
//!
//! Product records live in `stockroom-core`; this module holds the
//! account and session types that only the server needs.

pub mod session;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewUser, User};
