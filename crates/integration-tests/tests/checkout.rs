//! End-to-end order placement against the mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;

use bazaar_core::{
    AddressInput, Cart, CheckoutState, OrderStatus, PaymentStatus, Price, ProductId,
};
use bazaar_integration_tests::{MockBackend, product_json};
use bazaar_storefront::services::{PlaceOrderError, StatusSync};
use bazaar_storefront::state::AppState;
use bazaar_storefront::storage::{MemoryStorage, Storage};

async fn setup() -> (MockBackend, AppState) {
    let backend = MockBackend::start(
        vec![
            product_json("p1", "Notebook", 10.0, "Books"),
            product_json("p2", "Headphones", 60.0, "Electronics"),
        ],
        json!([]),
    )
    .await;
    let storage: Storage = Arc::new(MemoryStorage::new());
    let state = AppState::with_storage(backend.storefront_config(), &storage);
    (backend, state)
}

async fn fill_cart(state: &AppState, id: &str, quantity: u32) {
    let product = state.client().product(&ProductId::new(id)).await.unwrap();
    state.shop().add_to_cart(product, quantity);
}

fn add_address(state: &AppState) {
    state.shop().add_address(AddressInput {
        full_name: "Ada Lovelace".to_string(),
        street: "1 Analytical Way".to_string(),
        city: "London".to_string(),
        state: "LDN".to_string(),
        zip_code: "N1".to_string(),
        country: "UK".to_string(),
        phone: "555-0100".to_string(),
        is_default: false,
    });
}

#[tokio::test]
async fn test_order_is_posted_and_settled() {
    let (backend, state) = setup().await;
    fill_cart(&state, "p1", 2).await;
    add_address(&state);

    let placed = state.checkout().place_order().await.unwrap();

    // 20 + 5.99 shipping + 3.60 tax
    assert_eq!(placed.order.total_amount, Price::from_cents(2959));
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert!(state.shop().cart().read(Cart::is_empty));
    assert!(matches!(
        state.shop().checkout_state().state(),
        CheckoutState::Placed(_)
    ));
    {
        let data = backend.data();
        assert_eq!(data.orders.len(), 1);
        assert_eq!(data.orders[0]["items"][0]["product"], "p1");
        assert_eq!(data.orders[0]["items"][0]["quantity"], 2);
    }

    assert_eq!(placed.status_update.await.unwrap(), StatusSync::Synced);

    let local = state
        .shop()
        .orders()
        .read(|h| h.get(&placed.order.id).cloned())
        .unwrap();
    assert_eq!(local.status, OrderStatus::Processing);
    assert_eq!(local.payment_status, PaymentStatus::Paid);

    let data = backend.data();
    assert_eq!(data.status_updates.len(), 1);
    assert_eq!(data.status_updates[0].0, placed.order.id.as_str());
    assert_eq!(data.status_updates[0].1["paymentStatus"], "Paid");
    assert_eq!(data.orders[0]["status"], "Processing");
}

#[tokio::test]
async fn test_free_shipping_above_threshold() {
    let (_backend, state) = setup().await;
    fill_cart(&state, "p2", 1).await;
    add_address(&state);

    let placed = state.checkout().place_order().await.unwrap();
    // 60 + 0 shipping + 10.80 tax
    assert_eq!(placed.order.total_amount, Price::from_cents(7080));
}

#[tokio::test]
async fn test_failed_status_update_still_patches_local_copy() {
    let (backend, state) = setup().await;
    backend.reject_status_updates(true);
    fill_cart(&state, "p1", 1).await;
    add_address(&state);

    let placed = state.checkout().place_order().await.unwrap();
    assert_eq!(placed.status_update.await.unwrap(), StatusSync::LocalOnly);

    let local = state
        .shop()
        .orders()
        .read(|h| h.get(&placed.order.id).cloned())
        .unwrap();
    assert_eq!(local.status, OrderStatus::Processing);
    assert_eq!(local.payment_status, PaymentStatus::Paid);
    // The backend still has the original statuses
    assert_eq!(backend.data().orders[0]["paymentStatus"], "Pending");
}

#[tokio::test]
async fn test_rejected_order_keeps_cart() {
    let (backend, state) = setup().await;
    backend.reject_orders(true);
    fill_cart(&state, "p1", 3).await;
    add_address(&state);

    let err = state.checkout().place_order().await.unwrap_err();
    assert!(matches!(err, PlaceOrderError::Api(_)));
    assert_eq!(err.user_message(), "Payment gateway unavailable");

    assert_eq!(state.shop().cart().read(Cart::count), 3);
    assert!(state.shop().orders().read(|h| h.is_empty()));
    assert_eq!(
        *state.shop().checkout_state().state(),
        CheckoutState::Failed("Payment gateway unavailable".to_string())
    );

    // A retry once the backend recovers goes through
    backend.reject_orders(false);
    state.checkout().place_order().await.unwrap();
    assert!(state.shop().cart().read(Cart::is_empty));
}

#[tokio::test]
async fn test_order_not_found_shows_backend_message() {
    let (backend, state) = setup().await;
    backend.reject_orders_with(404, Some(json!({ "message": "User not found" })));
    fill_cart(&state, "p1", 1).await;
    add_address(&state);

    let err = state.checkout().place_order().await.unwrap_err();
    assert_eq!(err.user_message(), "User not found");
    assert_eq!(
        *state.shop().checkout_state().state(),
        CheckoutState::Failed("User not found".to_string())
    );
    assert_eq!(state.shop().cart().read(Cart::count), 1);
}

#[tokio::test]
async fn test_order_not_found_without_body_shows_status() {
    let (backend, state) = setup().await;
    backend.reject_orders_with(404, None);
    fill_cart(&state, "p1", 1).await;
    add_address(&state);

    let err = state.checkout().place_order().await.unwrap_err();
    assert_eq!(err.user_message(), "HTTP error! status: 404");
}
