//! Authentication extractors and session helpers.
//!
//! Protected handlers take [`RequireAuth`]; the rejection redirects to the
//! login page before the handler (and so the catalog) is ever reached.
//! Accepted requests carry the user in their Sentry scope.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::{CurrentUser, User, session_keys};

/// Where unauthenticated requests to protected pages are sent.
pub const LOGIN_REQUIRED_REDIRECT: &str = "/login?error=login_required";

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// No valid session identity.
    RedirectToLogin,
    /// The session layer is not installed.
    MissingSessionLayer,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_REQUIRED_REDIRECT).into_response(),
            Self::MissingSessionLayer => {
                tracing::error!("Session layer missing from router");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Read the current user from the session, if any.
///
/// A session that fails to load is treated as anonymous.
async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to read session"))
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSessionLayer)?;

        let user = current_user(session)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        // Each request runs in its own Sentry hub.
        set_sentry_user(&user.id, &user.username);
        Ok(Self(user))
    }
}

/// Start an authenticated session for `user`.
///
/// The session id is rotated first so an id issued before login cannot be
/// reused afterwards.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn start_session(
    session: &Session,
    user: &User,
) -> Result<CurrentUser, tower_sessions::session::Error> {
    let current = CurrentUser::from(user);
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, &current).await?;
    Ok(current)
}

/// End the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn end_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use tower_sessions::MemoryStore;

    use stockroom_core::UserId;

    use super::*;

    fn parts_with(session: Session) -> Parts {
        let (mut parts, ()) = Request::new(()).into_parts();
        parts.extensions.insert(session);
        parts
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_authenticated_request_carries_sentry_user() {
        let events = sentry::test::with_captured_events(|| {
            block_on(async {
                let session = Session::new(None, Arc::new(MemoryStore::default()), None);
                let current = CurrentUser {
                    id: UserId::new(7),
                    username: "ann".to_string(),
                };
                session
                    .insert(session_keys::CURRENT_USER, &current)
                    .await
                    .unwrap();

                let RequireAuth(user) = RequireAuth::from_request_parts(&mut parts_with(session), &())
                    .await
                    .unwrap();
                assert_eq!(user, current);
            });
            sentry::capture_message("catalog listed", sentry::Level::Info);
        });

        let user = events.first().and_then(|event| event.user.as_ref()).unwrap();
        assert_eq!(user.id.as_deref(), Some("7"));
        assert_eq!(user.username.as_deref(), Some("ann"));
    }

    #[test]
    fn test_anonymous_request_is_redirected_without_sentry_user() {
        let events = sentry::test::with_captured_events(|| {
            block_on(async {
                let session = Session::new(None, Arc::new(MemoryStore::default()), None);
                let rejection = RequireAuth::from_request_parts(&mut parts_with(session), &()).await;
                assert!(matches!(rejection, Err(AuthRejection::RedirectToLogin)));
            });
            sentry::capture_message("anonymous", sentry::Level::Info);
        });

        assert!(events.first().unwrap().user.is_none());
    }
}
