//! Order placement.
//!
//! Reads the cart and the selected address, posts the order, then simulates
//! the payment clearing after a delay. The backend stays authoritative; the
//! local mirror is patched even when the status update can't be delivered.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, instrument, warn};

use bazaar_core::checkout::build_order;
use bazaar_core::{
    Cart, CheckoutError, Notice, Order, OrderId, OrderStatusUpdate, OrderSummary, PricingRules,
    UserId,
};

use crate::api::{ApiError, BackendClient};
use crate::stores::Shop;

/// Why an order wasn't placed.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The checkout guards refused the submission.
    #[error(transparent)]
    Guard(#[from] CheckoutError),

    /// The backend rejected the order or couldn't be reached.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl PlaceOrderError {
    /// Message suitable for showing inline on the checkout page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Guard(e) => e.to_string(),
            Self::Api(e) => e.user_message(),
        }
    }
}

/// How the simulated status update ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSync {
    /// The backend accepted the update.
    Synced,
    /// The backend refused or was unreachable; only the local mirror changed.
    LocalOnly,
}

/// A successfully posted order.
#[derive(Debug)]
pub struct PlacedOrder {
    pub order: Order,
    /// Resolves once the delayed status update has run.
    pub status_update: JoinHandle<StatusSync>,
}

/// Places orders for the demo shopper.
#[derive(Clone)]
pub struct CheckoutService {
    shop: Arc<Shop>,
    client: BackendClient,
    user: UserId,
    status_delay: Duration,
    rules: PricingRules,
}

impl CheckoutService {
    #[must_use]
    pub fn new(shop: Arc<Shop>, client: BackendClient, user: UserId, status_delay: Duration) -> Self {
        Self {
            shop,
            client,
            user,
            status_delay,
            rules: PricingRules::default(),
        }
    }

    #[must_use]
    pub const fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Price the current cart.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        self.shop
            .cart()
            .read(|cart| OrderSummary::compute(cart, &self.rules))
    }

    /// Submit the cart to the selected address.
    ///
    /// On success the cart is cleared, the order is mirrored locally and a
    /// task is spawned that settles the order after the configured delay. On
    /// failure the cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::Guard` if the cart is empty, no address is
    /// selected or another submission is in flight, and
    /// `PlaceOrderError::Api` if the backend rejects the order.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn place_order(&self) -> Result<PlacedOrder, PlaceOrderError> {
        let payload = {
            let cart = self.shop.cart().snapshot();
            let address = self.shop.addresses().read(|book| book.selected().cloned());
            let mut checkout = self.shop.checkout();
            checkout.begin(&cart, address.as_ref())?;
            let Some(address) = address else {
                checkout.reset();
                return Err(CheckoutError::NoAddress.into());
            };
            build_order(&self.user, &cart, &address, &self.rules)
        };

        let order = match self.client.create_order(&payload).await {
            Ok(order) => order,
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, "Order placement failed");
                self.shop.checkout().failed(message);
                return Err(e.into());
            }
        };

        info!(order_id = %order.id, total = %payload.total_amount, "Order placed");
        self.shop.cart().update(Cart::clear);
        self.shop.record_order(order.clone());
        self.shop.checkout().placed(order.id.clone());
        self.shop.flash(Notice::success("Order placed successfully!"));

        let status_update = self.spawn_status_update(order.id.clone());
        Ok(PlacedOrder {
            order,
            status_update,
        })
    }

    /// Settle the order after the delay, on the backend if possible.
    fn spawn_status_update(&self, id: OrderId) -> JoinHandle<StatusSync> {
        let shop = Arc::clone(&self.shop);
        let client = self.client.clone();
        let delay = self.status_delay;
        let span = tracing::info_span!("order_status_update", order_id = %id);

        tokio::spawn(
            async move {
                tokio::time::sleep(delay).await;
                let update = OrderStatusUpdate::settled();
                let outcome = match client.update_order(&id, &update).await {
                    Ok(()) => StatusSync::Synced,
                    Err(e) => {
                        warn!(error = %e, "Status update failed, patching local copy only");
                        StatusSync::LocalOnly
                    }
                };
                if !shop.apply_order_update(&id, &update) {
                    warn!("Order missing from local history");
                }
                outcome
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{AddressInput, CheckoutState, Price, Product, ProductId};

    use super::*;
    use crate::config::ApiConfig;
    use crate::storage::{MemoryStorage, Storage};

    fn service() -> (Arc<Shop>, CheckoutService) {
        let storage: Storage = Arc::new(MemoryStorage::new());
        let shop = Arc::new(Shop::open(&storage));
        // Nothing listens on the discard port
        let client = BackendClient::new(
            &ApiConfig::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap(),
        );
        let service = CheckoutService::new(
            Arc::clone(&shop),
            client,
            UserId::new("demo"),
            Duration::from_millis(10),
        );
        (shop, service)
    }

    fn product() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Lamp".to_string(),
            description: String::new(),
            price: Price::from_cents(1000),
            image: None,
            category: "Home & Garden".to_string(),
            rating: 4.0,
            review_count: None,
            stock: 5,
        }
    }

    #[tokio::test]
    async fn test_empty_cart_is_refused() {
        let (shop, service) = service();
        shop.add_address(AddressInput {
            full_name: "Ada".to_string(),
            ..AddressInput::default()
        });

        let err = service.place_order().await.unwrap_err();
        assert!(matches!(err, PlaceOrderError::Guard(CheckoutError::EmptyCart)));
        assert_eq!(*shop.checkout_state().state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_missing_address_is_refused() {
        let (shop, service) = service();
        shop.add_to_cart(product(), 1);

        let err = service.place_order().await.unwrap_err();
        assert_eq!(err.user_message(), "Please select a delivery address");
    }

    #[tokio::test]
    async fn test_unreachable_backend_keeps_cart() {
        let (shop, service) = service();
        shop.add_to_cart(product(), 2);
        shop.add_address(AddressInput {
            full_name: "Ada".to_string(),
            ..AddressInput::default()
        });

        let err = service.place_order().await.unwrap_err();
        assert!(matches!(err, PlaceOrderError::Api(ApiError::Http(_))));
        assert_eq!(shop.cart().read(Cart::count), 2);
        assert!(matches!(
            shop.checkout_state().state(),
            CheckoutState::Failed(_)
        ));
    }

    #[test]
    fn test_summary_uses_cart() {
        let (shop, service) = service();
        shop.add_to_cart(product(), 2);
        let summary = service.summary();
        assert_eq!(summary.total, Price::from_cents(2959));
    }
}
