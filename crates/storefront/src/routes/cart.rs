//! Cart route handlers.
//!
//! Mutations redirect back to the page that posted them. `POST /cart/add`
//! from HTMX returns the count badge fragment instead, with a `cart-updated`
//! trigger so other elements can refresh.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{Cart, OrderSummary, ProductId};

use super::products::placeholder_image;
use super::{PageChrome, redirect_back};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: String,
}

/// Price breakdown display data for templates.
#[derive(Clone)]
pub struct SummaryView {
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub free_shipping: bool,
    pub tax: String,
    pub tax_label: String,
    pub total: String,
}

impl SummaryView {
    #[must_use]
    pub fn new(summary: &OrderSummary, tax_label: String) -> Self {
        Self {
            item_count: summary.item_count,
            subtotal: summary.subtotal.to_string(),
            shipping: if summary.free_shipping() {
                "FREE".to_string()
            } else {
                summary.shipping.to_string()
            },
            free_shipping: summary.free_shipping(),
            tax: summary.tax.to_string(),
            tax_label,
            total: summary.total.to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub summary: SummaryView,
}

impl CartView {
    /// Snapshot the shopper's cart.
    #[must_use]
    pub fn gather(state: &AppState) -> Self {
        let rules = state.checkout().rules();
        let tax_label = format!("Tax ({}%)", OrderSummary::tax_percent(rules));
        state.shop().cart().read(|cart| Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            summary: SummaryView::new(&OrderSummary::compute(cart, rules), tax_label),
        })
    }
}

impl From<&bazaar_core::CartItem> for CartItemView {
    fn from(item: &bazaar_core::CartItem) -> Self {
        let product = &item.product;
        Self {
            id: product.id.to_string(),
            href: format!("/products/{}", urlencoding::encode(product.id.as_str())),
            name: product.name.clone(),
            category: product.category.clone(),
            quantity: item.quantity,
            price: product.price.to_string(),
            line_price: item.line_total().to_string(),
            image: product
                .image
                .clone()
                .unwrap_or_else(|| placeholder_image(&product.name)),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    pub return_to: Option<String>,
}

/// Update cart form data.
///
/// Signed so that "0" and below remove the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: PageChrome,
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    CartShowTemplate {
        cart: CartView::gather(&state),
        chrome: PageChrome::gather(&state),
    }
}

/// Add item to cart.
///
/// The product is looked up on the backend so the cart holds a fresh
/// snapshot.
#[instrument(skip(state, headers))]
pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .client()
        .product(&ProductId::new(form.product_id))
        .await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())][..]));
    state
        .shop()
        .add_to_cart(product, form.quantity.unwrap_or(1));

    if headers.contains_key("HX-Request") {
        let count = state.shop().cart().read(Cart::count);
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate { count },
        )
            .into_response());
    }

    Ok(redirect_back(form.return_to.as_deref(), "/cart").into_response())
}

/// Update cart item quantity.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateCartForm>,
) -> impl IntoResponse {
    state
        .shop()
        .set_cart_quantity(&ProductId::new(form.product_id), form.quantity);
    redirect_back(None, "/cart")
}

/// Remove item from cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> impl IntoResponse {
    state
        .shop()
        .remove_from_cart(&ProductId::new(form.product_id));
    redirect_back(None, "/cart")
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> impl IntoResponse {
    state.shop().clear_cart();
    redirect_back(None, "/cart")
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    CartCountTemplate {
        count: state.shop().cart().read(Cart::count),
    }
}
