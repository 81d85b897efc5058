//! Integration tests for catalog listing, filtering and CRUD.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use stockroom_core::{NewProduct, ProductId};
use stockroom_integration_tests::{TestApp, input_value, listed_titles, product};
use stockroom_web::db::CatalogStore;

fn abc() -> Vec<NewProduct> {
    vec![
        product("Alpha", "X", 5.0),
        product("Bravo", "Y", 15.0),
        product("Charlie", "X", 25.0),
    ]
}

// ============================================================================
// Listing and filters
// ============================================================================

#[tokio::test]
async fn test_category_filter_matches_exactly() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    let page = app.get("/?category=X").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(listed_titles(&page.body), ["Alpha", "Charlie"]);
    assert!(page.body.contains("2 matching products"));

    let page = app.get("/?category=x").await;
    assert!(listed_titles(&page.body).is_empty());
    assert!(page.body.contains("No products found."));
}

#[tokio::test]
async fn test_price_range_is_inclusive() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    let page = app.get("/?min_price=10&max_price=20").await;
    assert_eq!(listed_titles(&page.body), ["Bravo"]);

    let page = app.get("/?min_price=5&max_price=15").await;
    assert_eq!(listed_titles(&page.body), ["Alpha", "Bravo"]);
}

#[tokio::test]
async fn test_unparseable_filters_are_ignored() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    let page = app.get("/?min_price=abc&min_stars=lots").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(listed_titles(&page.body), ["Alpha", "Bravo", "Charlie"]);
}

#[tokio::test]
async fn test_repeated_parameter_uses_first_value() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    let page = app.get("/?min_price=10&min_price=2&category=X&category=Y").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(listed_titles(&page.body), ["Charlie"]);

    let page = app.get("/?success=product_added&success=bogus").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Product added successfully!"));
}

#[tokio::test]
async fn test_search_is_case_insensitive_literal_substring() {
    let mut app = TestApp::logged_in_with_products([
        product("Brass Desk Lamp", "Lighting", 30.0),
        product("Floor lamp (tall)", "Lighting", 80.0),
        product("Kettle", "Kitchen", 20.0),
    ])
    .await;

    let page = app.get("/?search=LAMP").await;
    assert_eq!(
        listed_titles(&page.body),
        ["Brass Desk Lamp", "Floor lamp (tall)"]
    );

    let page = app.get("/?search=(tall)").await;
    assert_eq!(listed_titles(&page.body), ["Floor lamp (tall)"]);

    let page = app.get("/?search=.*").await;
    assert!(listed_titles(&page.body).is_empty());
}

#[tokio::test]
async fn test_sort_orders_and_bogus_sort_keeps_natural_order() {
    let mut app = TestApp::logged_in_with_products([
        product("Mid", "X", 15.0),
        product("Cheap", "X", 5.0),
        product("Dear", "X", 25.0),
    ])
    .await;

    let page = app.get("/?sort_by=price_asc").await;
    assert_eq!(listed_titles(&page.body), ["Cheap", "Mid", "Dear"]);

    let page = app.get("/?sort_by=price_desc").await;
    assert_eq!(listed_titles(&page.body), ["Dear", "Mid", "Cheap"]);

    let page = app.get("/?sort_by=bogus").await;
    assert_eq!(listed_titles(&page.body), ["Mid", "Cheap", "Dear"]);
}

#[tokio::test]
async fn test_listing_shows_at_most_ten_products() {
    let products = (1..=25).map(|i| product(&format!("Item {i:02}"), "Bulk", f64::from(i)));
    let mut app = TestApp::logged_in_with_products(products).await;

    let page = app.get("/?category=Bulk").await;
    let titles = listed_titles(&page.body);
    assert_eq!(titles.len(), 10);
    assert_eq!(titles.first().map(String::as_str), Some("Item 01"));
    assert!(page.body.contains("25 matching products"));
}

#[tokio::test]
async fn test_category_dropdown_lists_distinct_categories() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    let page = app.get("/?category=Y").await;
    assert_eq!(page.body.matches("<option value=\"X\"").count(), 1);
    assert!(page.body.contains("<option value=\"Y\" selected>"));
}

// ============================================================================
// Add
// ============================================================================

#[tokio::test]
async fn test_add_product_then_listed() {
    let mut app = TestApp::logged_in().await;

    app.post_form(
        "/add_product",
        &[
            ("asin", "B0NEW"),
            ("title", "Teapot"),
            ("categoryName", "Kitchen"),
            ("stars", "4.2"),
            ("price", "12.50"),
        ],
    )
    .await
    .assert_redirect("/?success=product_added");

    let page = app.get("/?success=product_added").await;
    assert!(page.body.contains("Product added successfully!"));
    assert_eq!(listed_titles(&page.body), ["Teapot"]);
    assert!(page.body.contains("$12.50"));
}

#[tokio::test]
async fn test_add_product_with_non_numeric_price_is_rejected() {
    let mut app = TestApp::logged_in().await;

    let response = app
        .post_form(
            "/add_product",
            &[
                ("asin", "B0NEW"),
                ("title", "Teapot"),
                ("categoryName", "Kitchen"),
                ("stars", "4"),
                ("price", "twelve"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.catalog.all().await.is_empty());
}

// ============================================================================
// Edit
// ============================================================================

#[tokio::test]
async fn test_partial_edit_keeps_other_fields() {
    let mut app = TestApp::logged_in_with_products(abc()).await;
    let id = ProductId::new(2);
    let before = app.catalog.get(id).await.unwrap().unwrap();

    app.post_form("/edit_product/2", &[("price", "99")])
        .await
        .assert_redirect("/?success=product_updated");

    let after = app.catalog.get(id).await.unwrap().unwrap();
    assert!((after.price - 99.0).abs() < f64::EPSILON);
    assert_eq!(after.title, before.title);
    assert_eq!(after.category_name, before.category_name);
    assert!((after.stars - before.stars).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_edit_with_unparseable_number_keeps_prior_value() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    app.post_form(
        "/edit_product/1",
        &[("title", "Alpha Prime"), ("stars", "many"), ("category", "Z")],
    )
    .await
    .assert_redirect("/?success=product_updated");

    let after = app.catalog.get(ProductId::new(1)).await.unwrap().unwrap();
    assert_eq!(after.title, "Alpha Prime");
    assert_eq!(after.category_name, "Z");
    assert!((after.stars - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_edit_form_prefills_current_values() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    let page = app.get("/edit_product/3").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(input_value(&page.body, "title").as_deref(), Some("Charlie"));
    assert_eq!(input_value(&page.body, "category").as_deref(), Some("X"));
    assert_eq!(input_value(&page.body, "price").as_deref(), Some("25"));
}

#[tokio::test]
async fn test_resubmitting_edit_form_keeps_untouched_numbers_exact() {
    let mut lamp = product("Lamp", "Lighting", 19.999);
    lamp.stars = 4.35;
    let mut app = TestApp::logged_in_with_products([lamp]).await;

    let page = app.get("/edit_product/1").await;
    let category = input_value(&page.body, "category").unwrap();
    let stars = input_value(&page.body, "stars").unwrap();
    let price = input_value(&page.body, "price").unwrap();
    assert_eq!(price, "19.999");
    assert_eq!(stars, "4.35");

    app.post_form(
        "/edit_product/1",
        &[
            ("title", "Brass Lamp"),
            ("category", &category),
            ("stars", &stars),
            ("price", &price),
        ],
    )
    .await
    .assert_redirect("/?success=product_updated");

    let after = app.catalog.get(ProductId::new(1)).await.unwrap().unwrap();
    assert_eq!(after.title, "Brass Lamp");
    assert_eq!(after.price.to_bits(), 19.999_f64.to_bits());
    assert_eq!(after.stars.to_bits(), 4.35_f64.to_bits());

    let listing = app.get("/").await;
    assert!(listing.body.contains("$20.00"));
}

#[tokio::test]
async fn test_edit_missing_product_is_not_found() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    assert_eq!(app.get("/edit_product/42").await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.post_form("/edit_product/42", &[("price", "1")])
            .await
            .status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/edit_product/not-an-id").await.status,
        StatusCode::NOT_FOUND
    );
}

// ============================================================================
// Display and delete
// ============================================================================

#[tokio::test]
async fn test_display_product() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    let page = app.get("/display_product/2").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("<h1>Bravo</h1>"));
    assert!(page.body.contains("$15.00"));

    assert_eq!(
        app.get("/display_product/99").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_delete_then_get_returns_none() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    app.post_form("/delete_product/1", &[])
        .await
        .assert_redirect("/?success=product_deleted");

    assert!(app.catalog.get(ProductId::new(1)).await.unwrap().is_none());
    assert_eq!(
        app.get("/display_product/1").await.status,
        StatusCode::NOT_FOUND
    );

    let page = app.get("/?success=product_deleted").await;
    assert!(page.body.contains("Product deleted successfully!"));
    assert_eq!(listed_titles(&page.body), ["Bravo", "Charlie"]);
}

#[tokio::test]
async fn test_delete_missing_product_still_redirects() {
    let mut app = TestApp::logged_in_with_products(abc()).await;

    app.post_form("/delete_product/42", &[])
        .await
        .assert_redirect("/?success=product_deleted");
    assert_eq!(app.catalog.all().await.len(), 3);
}
