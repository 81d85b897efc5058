//! Authentication route handlers.
//!
//! Signup, login and logout. Failures redirect back to the form with a
//! notice code; a failed login never says which half of the pair was wrong.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::notice::{MessageQuery, Notice};
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, end_session, start_session};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub notice: Option<Notice>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub notice: Option<Notice>,
}

// =============================================================================
// Signup
// =============================================================================

/// Display the signup page.
pub async fn signup_page(Query(pairs): Query<Vec<(String, String)>>) -> impl IntoResponse {
    SignupTemplate {
        notice: MessageQuery::from_pairs(pairs).notice(),
    }
}

/// Handle signup form submission.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.users());

    match auth
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(_) => Ok(Redirect::to("/login?success=registered").into_response()),
        Err(AuthError::DuplicateEmail) => {
            tracing::info!("Signup rejected: email already registered");
            Ok(Redirect::to("/signup?error=email_taken").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(pairs): Query<Vec<(String, String)>>) -> impl IntoResponse {
    LoginTemplate {
        notice: MessageQuery::from_pairs(pairs).notice(),
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.users());

    let Some(user) = auth.verify(&form.email, &form.password).await? else {
        tracing::info!("Login failed");
        return Ok(Redirect::to("/login?error=invalid_credentials").into_response());
    };

    let current = start_session(&session, &user).await?;
    set_sentry_user(&current.id, &current.username);
    tracing::info!(user_id = %current.id, "User logged in");

    Ok(Redirect::to("/?success=logged_in").into_response())
}

/// Log out and destroy the session.
pub async fn logout(
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Response, AppError> {
    end_session(&session).await?;
    clear_sentry_user();
    tracing::info!(user_id = %user.id, "User logged out");

    Ok(Redirect::to("/login?success=logged_out").into_response())
}
