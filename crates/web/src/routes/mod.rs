//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (store ping)
//!
//! # Auth
//! GET  /signup                    - Signup page
//! POST /signup                    - Signup action
//! GET  /login                     - Login page
//! POST /login                     - Login action
//! GET  /logout                    - Logout action (requires auth)
//!
//! # Catalog (requires auth)
//! GET  /                          - Filtered listing
//! GET  /add_product               - Add form
//! POST /add_product               - Add action
//! GET  /edit_product/{id}         - Edit form
//! POST /edit_product/{id}         - Edit action
//! POST /delete_product/{id}       - Delete action
//! GET  /display_product/{id}      - Product detail
//! ```

pub mod auth;
pub mod notice;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/add_product", get(products::add_page).post(products::add))
        .route(
            "/edit_product/{id}",
            get(products::edit_page).post(products::edit),
        )
        .route("/delete_product/{id}", post(products::delete))
        .route("/display_product/{id}", get(products::show))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth_routes())
        .merge(product_routes())
}

/// Assemble the application router with its state and session layer.
///
/// Tracing, request-id and Sentry layers are added by the binary.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    routes().layer(sessions).with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
