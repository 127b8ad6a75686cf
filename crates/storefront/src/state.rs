//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::BackendClient;
use crate::config::StorefrontConfig;
use crate::services::CheckoutService;
use crate::storage::{FileStorage, Storage};
use crate::stores::Shop;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, the shopper's stores and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    client: BackendClient,
    shop: Arc<Shop>,
    checkout: CheckoutService,
}

impl AppState {
    /// Create application state persisting to the configured data directory.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storage: Storage = Arc::new(FileStorage::new(&config.data_dir));
        Self::with_storage(config, &storage)
    }

    /// Create application state over an explicit storage backend.
    #[must_use]
    pub fn with_storage(config: StorefrontConfig, storage: &Storage) -> Self {
        let client = BackendClient::new(&config.api);
        let shop = Arc::new(Shop::open(storage));
        let checkout = CheckoutService::new(
            Arc::clone(&shop),
            client.clone(),
            config.demo_user_id.clone(),
            config.order_status_delay,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                shop,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn client(&self) -> &BackendClient {
        &self.inner.client
    }

    /// Get a reference to the shopper's stores.
    #[must_use]
    pub fn shop(&self) -> &Shop {
        &self.inner.shop
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
