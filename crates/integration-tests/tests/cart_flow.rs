//! Cart and checkout tests against a signed-in terminal.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use cafe_pos_integration_tests::{FakeCatalog, TestApp, TestResponse};

/// Quantities shown in the cart panel, top to bottom.
fn quantities(response: &TestResponse) -> Vec<String> {
    response
        .body
        .split(r#"<span class="quantity">"#)
        .skip(1)
        .filter_map(|rest| rest.split_once("</span>"))
        .map(|(quantity, _)| quantity.to_string())
        .collect()
}

fn total(response: &TestResponse) -> Option<&str> {
    let (_, rest) = response.body.split_once(r#"<h3 id="cart-total">"#)?;
    rest.split_once("</h3>").map(|(total, _)| total)
}

#[tokio::test]
async fn test_add_item_returns_cart_panel() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;

    let response = terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));
    assert!(response.body.starts_with(r#"<section id="cart-panel""#));
    assert!(response.body.contains("Latte"));
    assert_eq!(quantities(&response), ["1"]);
    assert_eq!(total(&response), Some("฿50.00"));
}

#[tokio::test]
async fn test_adding_same_product_merges_lines() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;

    terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "croissant")])
        .await;
    let response = terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;

    assert_eq!(quantities(&response), ["2", "1"]);
    assert_eq!(total(&response), Some("฿145.00"));
}

#[tokio::test]
async fn test_adjust_quantity() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;

    let response = terminal
        .htmx_post("/cart/adjust", &[("product_id", "latte"), ("delta", "1")])
        .await;
    assert_eq!(quantities(&response), ["2"]);
    assert_eq!(total(&response), Some("฿100.00"));

    // Would drop below one: ignored.
    let response = terminal
        .htmx_post("/cart/adjust", &[("product_id", "latte"), ("delta", "-5")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(quantities(&response), ["2"]);
    assert_eq!(total(&response), Some("฿100.00"));
}

#[tokio::test]
async fn test_decrement_stops_at_one() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "mocha")])
        .await;

    let response = terminal
        .htmx_post("/cart/adjust", &[("product_id", "mocha"), ("delta", "-1")])
        .await;

    assert_eq!(quantities(&response), ["1"]);
    assert!(response.body.contains(r#"value="-1" disabled"#));
}

#[tokio::test]
async fn test_adding_unknown_product_is_not_found() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;

    let response = terminal
        .htmx_post("/cart/add", &[("product_id", "flat-white")])
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_and_adjust_of_absent_product_are_no_ops() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;

    let response = terminal
        .htmx_post("/cart/remove", &[("product_id", "flat-white")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));
    assert_eq!(quantities(&response), ["1"]);

    let response = terminal
        .htmx_post(
            "/cart/adjust",
            &[("product_id", "flat-white"), ("delta", "3")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(quantities(&response), ["1"]);
    assert_eq!(total(&response), Some("฿50.00"));
}

#[tokio::test]
async fn test_plain_form_post_redirects_to_screen() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;

    let response = terminal.post("/cart/add", &[("product_id", "mocha")]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    let screen = terminal.get("/").await;
    assert_eq!(quantities(&screen), ["1"]);
    assert_eq!(total(&screen), Some("฿60.00"));
}

#[tokio::test]
async fn test_remove_and_clear() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "mocha")])
        .await;

    let response = terminal
        .htmx_post("/cart/remove", &[("product_id", "latte")])
        .await;
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));
    assert!(!response.body.contains("Latte"));
    assert_eq!(total(&response), Some("฿60.00"));

    // Removing a product that is not in the cart is a no-op.
    let response = terminal
        .htmx_post("/cart/remove", &[("product_id", "croissant")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(quantities(&response), ["1"]);

    let response = terminal.htmx_post("/cart/clear", &[]).await;
    assert!(response.body.contains("ยังไม่มีรายการสินค้า"));
    assert_eq!(total(&response), Some("฿0.00"));
}

#[tokio::test]
async fn test_search_filters_grid() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;

    let response = terminal.htmx_get("/products?q=LAT").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.starts_with(r#"<div id="product-grid""#));
    assert!(response.body.contains("Latte"));
    assert!(!response.body.contains("Mocha"));

    // The term survives a full page load.
    let screen = terminal.get("/").await;
    assert!(screen.body.contains(r#"value="LAT""#));
    assert!(!screen.body.contains("Butter Croissant"));

    let response = terminal.htmx_get("/products?q=matcha").await;
    assert!(response.body.contains("ไม่พบสินค้าที่ค้นหา"));

    let response = terminal.htmx_get("/products?q=").await;
    assert!(response.body.contains("Latte"));
    assert!(response.body.contains("Mocha"));
    assert!(response.body.contains("Butter Croissant"));
}

#[tokio::test]
async fn test_search_does_not_touch_cart() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;

    terminal.htmx_get("/products?q=mocha").await;
    let screen = terminal.get("/").await;

    assert_eq!(quantities(&screen), ["1"]);
    assert_eq!(total(&screen), Some("฿50.00"));
}

#[tokio::test]
async fn test_checkout_empty_cart_is_rejected() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;

    let response = terminal.htmx_post("/checkout", &[]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_reports_total_and_keeps_cart() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;

    let response = terminal.htmx_post("/checkout", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("ชำระเงินเรียบร้อย! ยอดเงิน: 100 บาท"));

    let screen = terminal.get("/").await;
    assert_eq!(quantities(&screen), ["2"]);

    let page = terminal.post("/checkout", &[]).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("ชำระเงินเรียบร้อย! ยอดเงิน: 100 บาท"));
    assert!(page.body.contains("<html"));
}

#[tokio::test]
async fn test_carts_are_per_terminal() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut front = app.signed_in_terminal().await;
    let mut back = app.signed_in_terminal().await;

    front
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;

    let screen = back.get("/").await;
    assert!(screen.body.contains("ยังไม่มีรายการสินค้า"));
}

#[tokio::test]
async fn test_logout_discards_cart() {
    let app = TestApp::new(FakeCatalog::menu());
    let mut terminal = app.signed_in_terminal().await;
    terminal
        .htmx_post("/cart/add", &[("product_id", "latte")])
        .await;

    terminal.post("/auth/logout", &[]).await;
    terminal.sign_in().await;
    let screen = terminal.get("/").await;

    assert_eq!(screen.status, StatusCode::OK);
    assert!(screen.body.contains("ยังไม่มีรายการสินค้า"));
    assert_eq!(app.auth.signed_out().len(), 1);
}
