//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness (backend reachable)
//!
//! # Products
//! GET  /products               - Product listing (search, category, arrivals, rating, sort)
//! GET  /products/:id           - Product detail + related products
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (HTMX: returns count badge)
//! POST /cart/update            - Update quantity
//! POST /cart/remove            - Remove item
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Wishlist
//! GET  /wishlist               - Wishlist page
//! POST /wishlist/add           - Add (toggle from product cards)
//! POST /wishlist/remove        - Remove item
//! POST /wishlist/clear         - Empty the wishlist
//! POST /wishlist/move-to-cart  - Move item to cart
//!
//! # Addresses
//! GET  /addresses              - Address book
//! POST /addresses              - Create address
//! GET  /addresses/new          - New address form
//! GET  /addresses/:id/edit     - Edit address form
//! POST /addresses/:id          - Update address
//! POST /addresses/:id/delete   - Delete address
//! POST /addresses/:id/select   - Use for checkout
//! POST /addresses/:id/default  - Make default
//!
//! # Checkout
//! GET  /checkout               - Checkout page
//! POST /checkout               - Place order
//! GET  /checkout/placed/:id    - Order confirmation
//!
//! # Profile
//! GET  /profile                - Demo user + order history
//! ```

pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;
pub mod profile;
pub mod wishlist;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use bazaar_core::{Cart, Notice, Wishlist};

use crate::state::AppState;

// =============================================================================
// Shared view data
// =============================================================================

/// Notice display data for templates.
#[derive(Clone)]
pub struct NoticeView {
    pub message: String,
    pub level: &'static str,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            message: notice.message,
            level: notice.level.as_str(),
        }
    }
}

/// Header badges and queued notices rendered by the base layout.
#[derive(Clone)]
pub struct PageChrome {
    pub cart_count: u32,
    pub wishlist_count: usize,
    pub notices: Vec<NoticeView>,
}

impl PageChrome {
    /// Gather header data and drain the notice queue.
    #[must_use]
    pub fn gather(state: &AppState) -> Self {
        let shop = state.shop();
        Self {
            cart_count: shop.cart().read(Cart::count),
            wishlist_count: shop.wishlist().read(Wishlist::count),
            notices: shop
                .take_notices()
                .into_iter()
                .map(NoticeView::from)
                .collect(),
        }
    }
}

/// Redirect to a same-site path supplied by a form, or to `fallback`.
///
/// Absolute and protocol-relative URLs are ignored.
#[must_use]
pub fn redirect_back(return_to: Option<&str>, fallback: &str) -> Redirect {
    let target = return_to
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or(fallback);
    Redirect::to(target)
}

// =============================================================================
// Routers
// =============================================================================

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/clear", post(wishlist::clear))
        .route("/move-to-cart", post(wishlist::move_to_cart))
}

/// Create the address book routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route("/new", get(addresses::new_address))
        .route("/{id}", post(addresses::update))
        .route("/{id}/edit", get(addresses::edit))
        .route("/{id}/delete", post(addresses::delete))
        .route("/{id}/select", post(addresses::select))
        .route("/{id}/default", post(addresses::set_default))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place_order))
        .route("/placed/{id}", get(checkout::placed))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        // Shopper state
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/addresses", address_routes())
        // Checkout
        .nest("/checkout", checkout_routes())
        // Profile
        .route("/profile", get(profile::show))
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    fn location(redirect: Redirect) -> String {
        redirect
            .into_response()
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_redirect_back_accepts_local_paths() {
        assert_eq!(location(redirect_back(Some("/products?sort=lowtohigh"), "/")), "/products?sort=lowtohigh");
    }

    #[test]
    fn test_redirect_back_rejects_offsite_targets() {
        assert_eq!(location(redirect_back(Some("https://evil.example"), "/cart")), "/cart");
        assert_eq!(location(redirect_back(Some("//evil.example"), "/cart")), "/cart");
        assert_eq!(location(redirect_back(None, "/wishlist")), "/wishlist");
    }
}
