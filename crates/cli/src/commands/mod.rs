//! CLI command implementations.
//!
//! Every command works against the same stores the storefront server uses,
//! so a cart filled here shows up in the browser and vice versa.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod wishlist;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use bazaar_core::{AddressError, Notice, NoticeLevel, UserId};
use bazaar_storefront::api::{ApiError, BackendClient};
use bazaar_storefront::config::{ApiConfig, ConfigError};
use bazaar_storefront::services::{CheckoutService, PlaceOrderError};
use bazaar_storefront::storage::{FileStorage, Storage};
use bazaar_storefront::stores::Shop;

/// Catalog responses are only reused within one invocation.
const CLI_CACHE_TTL: Duration = Duration::from_secs(30);

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("{}", .0.user_message())]
    Checkout(#[from] PlaceOrderError),

    #[error("{0}")]
    NotFound(String),
}

/// Everything a command needs.
pub struct Context {
    pub client: BackendClient,
    pub shop: Arc<Shop>,
    pub checkout: CheckoutService,
}

impl Context {
    /// Open the stores under `data_dir` and connect to the backend.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Config` if the API URL is invalid.
    pub fn new(
        api_url: &str,
        data_dir: &Path,
        user_id: &str,
        status_delay: Duration,
    ) -> Result<Self, CommandError> {
        let client = BackendClient::new(&ApiConfig::new(api_url, CLI_CACHE_TTL)?);
        let storage: Storage = Arc::new(FileStorage::new(data_dir));
        let shop = Arc::new(Shop::open(&storage));
        let checkout = CheckoutService::new(
            Arc::clone(&shop),
            client.clone(),
            UserId::new(user_id),
            status_delay,
        );

        Ok(Self {
            client,
            shop,
            checkout,
        })
    }
}

/// Log the notice a mutation produced.
pub fn report(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success | NoticeLevel::Info => tracing::info!("{}", notice.message),
        NoticeLevel::Warning | NoticeLevel::Danger => tracing::warn!("{}", notice.message),
    }
}
