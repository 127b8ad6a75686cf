//! Server-rendered pages driven over HTTP, backed by the mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;

use bazaar_core::Cart;
use bazaar_integration_tests::{MockBackend, product_json};
use bazaar_storefront::state::AppState;
use bazaar_storefront::storage::{MemoryStorage, Storage};

struct Storefront {
    base: String,
    state: AppState,
    http: reqwest::Client,
    _backend: MockBackend,
}

async fn storefront() -> Storefront {
    let backend = MockBackend::start(
        vec![
            product_json("p1", "Desk Lamp", 24.5, "Home & Garden"),
            product_json("p2", "Novel", 12.0, "Books"),
        ],
        json!([{ "_id": "c1", "name": "Books" }, { "_id": "c2", "name": "Home & Garden" }]),
    )
    .await;
    let storage: Storage = Arc::new(MemoryStorage::new());
    let state = AppState::with_storage(backend.storefront_config(), &storage);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = bazaar_storefront::app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Storefront {
        base: format!("http://{addr}"),
        state,
        http: reqwest::Client::new(),
        _backend: backend,
    }
}

impl Storefront {
    async fn get(&self, path: &str) -> (StatusCode, String) {
        let response = self
            .http
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        (response.status(), response.text().await.unwrap())
    }

    async fn post(&self, path: &str, form: &[(&str, &str)]) -> (StatusCode, String) {
        let response = self
            .http
            .post(format!("{}{path}", self.base))
            .form(form)
            .send()
            .await
            .unwrap();
        (response.status(), response.text().await.unwrap())
    }
}

#[tokio::test]
async fn test_listing_renders_products_and_categories() {
    let shop = storefront().await;
    let (status, body) = shop.get("/products").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Desk Lamp"));
    assert!(body.contains("Novel"));
    assert!(body.contains("Home &amp; Garden"));
}

#[tokio::test]
async fn test_listing_sorts_by_price() {
    let shop = storefront().await;
    let (_, body) = shop.get("/products?sort=lowtohigh").await;
    let novel = body.find("Novel").unwrap();
    let lamp = body.find("Desk Lamp").unwrap();
    assert!(novel < lamp);
}

#[tokio::test]
async fn test_add_to_cart_redirects_and_flashes() {
    let shop = storefront().await;
    let (status, body) = shop
        .post(
            "/cart/add",
            &[("product_id", "p1"), ("quantity", "2"), ("return_to", "/cart")],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Desk Lamp"));
    assert!(body.contains("Added Desk Lamp to cart!"));
    assert_eq!(shop.state.shop().cart().read(Cart::count), 2);

    // Notices are shown once
    let (_, body) = shop.get("/cart").await;
    assert!(!body.contains("Added Desk Lamp to cart!"));
}

#[tokio::test]
async fn test_htmx_add_returns_count_fragment() {
    let shop = storefront().await;
    let response = shop
        .http
        .post(format!("{}/cart/add", shop.base))
        .header("HX-Request", "true")
        .form(&[("product_id", "p2")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("HX-Trigger").unwrap(),
        "cart-updated"
    );
    let body = response.text().await.unwrap();
    assert!(body.contains("id=\"cart-count\""));
    assert!(!body.contains("<html"));
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let shop = storefront().await;
    let (status, _) = shop.get("/products/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_is_blocked_without_address() {
    let shop = storefront().await;
    shop.post("/cart/add", &[("product_id", "p2")]).await;

    let (status, body) = shop.get("/checkout").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Please select a delivery address"));

    let (status, _) = shop.post("/checkout", &[]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(shop.state.shop().cart().read(Cart::count), 1);
}

#[tokio::test]
async fn test_address_form_then_checkout() {
    let shop = storefront().await;
    shop.post("/cart/add", &[("product_id", "p1")]).await;

    // Missing phone is rejected with the input kept
    let (status, body) = shop
        .post(
            "/addresses",
            &[
                ("full_name", "Ada Lovelace"),
                ("street", "1 Analytical Way"),
                ("city", "London"),
                ("state", "LDN"),
                ("zip_code", "N1"),
                ("country", "UK"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Phone is required"));
    assert!(body.contains("Ada Lovelace"));

    let (status, body) = shop
        .post(
            "/addresses",
            &[
                ("full_name", "Ada Lovelace"),
                ("street", "1 Analytical Way"),
                ("city", "London"),
                ("state", "LDN"),
                ("zip_code", "N1"),
                ("country", "UK"),
                ("phone", "555-0100"),
                ("return_to", "/checkout"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Address added successfully"));
    assert!(body.contains("Ada Lovelace"));

    let (status, body) = shop.post("/checkout", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Thank you for your order!"));
    assert!(body.contains("Order placed successfully!"));
    assert!(shop.state.shop().cart().read(Cart::is_empty));
}
