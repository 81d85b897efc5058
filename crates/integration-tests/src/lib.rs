//! Integration tests for Stockroom.
//!
//! Tests drive the real router in process with `tower::ServiceExt::oneshot`.
//! Accounts and catalog live in the in-memory stores from
//! `stockroom-web`'s `test-support` feature; sessions live in
//! `tower_sessions::MemoryStore`. No database or network is needed.
//!
//! ```bash
//! cargo test -p stockroom-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use stockroom_core::NewProduct;
use stockroom_web::db::{MemoryCatalogStore, MemoryUserStore};
use stockroom_web::middleware::session::{SESSION_COOKIE_NAME, session_layer};
use stockroom_web::routes;
use stockroom_web::state::AppState;

/// What a test needs from a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Assert a 303 redirect to `location` and return `self`.
    pub fn assert_redirect(&self, location: &str) -> &Self {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(location));
        self
    }
}

/// One browser talking to a fresh application instance.
pub struct TestApp {
    router: Router,
    pub users: Arc<MemoryUserStore>,
    pub catalog: Arc<MemoryCatalogStore>,
    cookie: Option<String>,
}

impl TestApp {
    /// Application with an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_products(Vec::<NewProduct>::new())
    }

    /// Application whose catalog starts with `products`, ids assigned in order
    /// from 1.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = NewProduct>) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let catalog = Arc::new(MemoryCatalogStore::with_products(products));
        let state = AppState::new(users.clone(), catalog.clone());
        let router = routes::app(state, session_layer(MemoryStore::default(), false));

        Self {
            router,
            users,
            catalog,
            cookie: None,
        }
    }

    /// Forget the session cookie, as a different browser would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// Present `value` as the session cookie from now on.
    pub fn set_session_cookie(&mut self, value: &str) {
        self.cookie = Some(format!("{SESSION_COOKIE_NAME}={value}"));
    }

    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    /// Send a POST request with a urlencoded form body.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(Method::POST, uri, Some(body)).await
    }

    /// Register an account through the signup form.
    pub async fn signup(&mut self, username: &str, email: &str, password: &str) -> TestResponse {
        self.post_form(
            "/signup",
            &[
                ("username", username),
                ("email", email),
                ("password", password),
            ],
        )
        .await
    }

    /// Log in through the login form.
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    /// Sign up and log in a default user.
    pub async fn logged_in() -> Self {
        Self::logged_in_with_products(Vec::<NewProduct>::new()).await
    }

    /// Sign up and log in a default user against a pre-filled catalog.
    pub async fn logged_in_with_products(products: impl IntoIterator<Item = NewProduct>) -> Self {
        let mut app = Self::with_products(products);
        app.signup("tester", "tester@example.com", "correct horse")
            .await
            .assert_redirect("/login?success=registered");
        app.login("tester@example.com", "correct horse")
            .await
            .assert_redirect("/?success=logged_in");
        app
    }

    async fn send(&mut self, method: Method, uri: &str, form: Option<String>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                request = request.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            self.store_cookie(value.to_str().unwrap());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    fn store_cookie(&mut self, set_cookie: &str) {
        let Some(pair) = set_cookie.split(';').next() else {
            return;
        };
        let Some((name, value)) = pair.split_once('=') else {
            return;
        };
        if name.trim() != SESSION_COOKIE_NAME {
            return;
        }

        let removed = value.is_empty() || set_cookie.contains("Max-Age=0");
        self.cookie = (!removed).then(|| pair.trim().to_string());
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A product with the fields the listing tests care about.
#[must_use]
pub fn product(title: &str, category: &str, price: f64) -> NewProduct {
    NewProduct {
        asin: format!("B-{title}"),
        title: title.to_string(),
        category_name: category.to_string(),
        stars: 4.0,
        price,
        reviews: None,
    }
}

/// Product titles listed on a rendered catalog page, in display order.
#[must_use]
pub fn listed_titles(body: &str) -> Vec<String> {
    body.split("<a href=\"/display_product/")
        .skip(1)
        .filter_map(|chunk| {
            let start = chunk.find('>')? + 1;
            let end = chunk.find("</a>")?;
            chunk.get(start..end).map(str::to_string)
        })
        .collect()
}

/// The `value` attribute of the input named `name` on a rendered form.
#[must_use]
pub fn input_value(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\"");
    let tag_start = body.find(&marker)?;
    let tag = body.get(tag_start..)?;
    let tag = tag.get(..tag.find('>')?)?;
    let value = tag.get(tag.find("value=\"")? + "value=\"".len()..)?;
    value.get(..value.find('"')?).map(str::to_string)
}
