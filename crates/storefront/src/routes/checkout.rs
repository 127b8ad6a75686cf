//! Checkout route handlers.
//!
//! The page lets the shopper pick a delivery address and place the order.
//! Submission is refused while the cart is empty or no address is selected.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use bazaar_core::{CheckoutState, Order, OrderId};

use super::PageChrome;
use super::addresses::AddressView;
use super::cart::CartView;
use super::profile::OrderView;
use crate::error::{AppError, Result};
use crate::filters;
use crate::services::PlaceOrderError;
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub chrome: PageChrome,
    pub cart: CartView,
    pub addresses: Vec<AddressView>,
    /// Why submission is disabled, if it is.
    pub blocked: Option<String>,
    pub error: Option<String>,
}

impl CheckoutShowTemplate {
    fn gather(state: &AppState, error: Option<String>) -> Self {
        let shop = state.shop();
        let cart = shop.cart().snapshot();
        let blocked = shop.addresses().read(|book| {
            shop.checkout()
                .can_submit(&cart, book.selected())
                .err()
                .map(|e| e.to_string())
        });

        Self {
            cart: CartView::gather(state),
            addresses: AddressView::gather(state),
            blocked,
            error,
            chrome: PageChrome::gather(state),
        }
    }
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/placed.html")]
pub struct CheckoutPlacedTemplate {
    pub chrome: PageChrome,
    pub order: OrderView,
    pub address: Option<AddressView>,
}

/// Display the checkout page.
///
/// A finished attempt is reset so the next visit starts clean; a failure
/// message is shown once.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let error = {
        let mut checkout = state.shop().checkout();
        let error = match checkout.state() {
            CheckoutState::Failed(message) => Some(message.clone()),
            _ => None,
        };
        if !matches!(checkout.state(), CheckoutState::Submitting) {
            checkout.reset();
        }
        error
    };

    CheckoutShowTemplate::gather(&state, error)
}

/// Place the order.
#[instrument(skip(state))]
pub async fn place_order(State(state): State<AppState>) -> Response {
    match state.checkout().place_order().await {
        Ok(placed) => {
            // The status update runs on its own; nothing waits for it here
            drop(placed.status_update);
            Redirect::to(&format!(
                "/checkout/placed/{}",
                urlencoding::encode(placed.order.id.as_str())
            ))
            .into_response()
        }
        Err(e) => {
            let status = match &e {
                PlaceOrderError::Guard(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PlaceOrderError::Api(_) => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                CheckoutShowTemplate::gather(&state, Some(e.user_message())),
            )
                .into_response()
        }
    }
}

/// Display the order confirmation.
#[instrument(skip(state))]
pub async fn placed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = OrderId::new(id);
    let order: Order = state
        .shop()
        .orders()
        .read(|history| history.get(&id).cloned())
        .ok_or_else(|| AppError::NotFound(format!("Order {id}")))?;

    let address = order.shipping_address.as_ref().and_then(|address_id| {
        state
            .shop()
            .addresses()
            .read(|book| book.get(address_id).map(|a| AddressView::new(a, None)))
    });

    Ok(CheckoutPlacedTemplate {
        chrome: PageChrome::gather(&state),
        order: OrderView::from(&order),
        address,
    })
}
