//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::ProductId;

use super::products::ProductCardView;
use super::{PageChrome, redirect_back};
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Wishlist item form data.
///
/// `toggle` makes `POST /wishlist/add` remove an already-saved product, which
/// is what the heart button on product cards wants.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: String,
    #[serde(default)]
    pub toggle: bool,
    pub return_to: Option<String>,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub chrome: PageChrome,
    pub items: Vec<ProductCardView>,
}

/// Display wishlist page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let products = state.shop().wishlist().read(|w| w.items().to_vec());
    WishlistShowTemplate {
        items: ProductCardView::list(&products, &state),
        chrome: PageChrome::gather(&state),
    }
}

/// Add (or toggle) a product.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<WishlistForm>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(form.product_id);
    let shop = state.shop();

    if form.toggle && shop.wishlist().read(|w| w.contains(&id)) {
        shop.remove_from_wishlist(&id);
    } else {
        let product = state.client().product(&id).await?;
        shop.add_to_wishlist(product);
    }

    Ok(redirect_back(form.return_to.as_deref(), "/wishlist"))
}

/// Remove a product.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<WishlistForm>,
) -> impl IntoResponse {
    state
        .shop()
        .remove_from_wishlist(&ProductId::new(form.product_id));
    redirect_back(form.return_to.as_deref(), "/wishlist")
}

/// Empty the wishlist.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> impl IntoResponse {
    state.shop().clear_wishlist();
    redirect_back(None, "/wishlist")
}

/// Move a product into the cart.
#[instrument(skip(state))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    Form(form): Form<WishlistForm>,
) -> impl IntoResponse {
    let id = ProductId::new(form.product_id);
    if state.shop().move_to_cart(&id).is_none() {
        tracing::debug!(product_id = %id, "Product not in wishlist");
    }
    redirect_back(form.return_to.as_deref(), "/wishlist")
}
