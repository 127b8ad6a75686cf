//! Backend client implementation.
//!
//! Uses `reqwest` for HTTP and caches catalog reads with `moka`.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use bazaar_core::catalog::{NewProduct, coerce_categories, coerce_products, fallback_categories};
use bazaar_core::{
    Category, NewOrder, Order, OrderId, OrderStatusUpdate, Product, ProductId, ProductQuery,
};

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, status_message};
use crate::config::ApiConfig;

/// Client for the REST backend.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and return the raw JSON body.
    ///
    /// Every non-success status, 404 included, comes back as
    /// `ApiError::Status` carrying the backend's message. Callers that know
    /// what was missing map it to `ApiError::NotFound` themselves.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<Value, ApiError> {
        let mut request = self
            .inner
            .client
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: status_message(status.as_u16(), &response_text),
            });
        }

        if response_text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn get(&self, url: Url) -> Result<Value, ApiError> {
        self.send(Method::GET, url, None::<&Value>).await
    }

    fn parse<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List products matching the server-side query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. Individual malformed products are
    /// dropped rather than failing the list.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let cache_key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.endpoint("products")?;
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let products = coerce_products(self.get(url).await?);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown IDs, or an error if the request
    /// fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&format!("products/{}", urlencoding::encode(id.as_str())))?;
        let value = match self.get(url).await {
            Err(ApiError::Status { status, .. }) if StatusCode::NOT_FOUND == status => {
                return Err(ApiError::NotFound(format!("Product {id}")));
            }
            Ok(Value::Null) => return Err(ApiError::NotFound(format!("Product {id}"))),
            other => other?,
        };
        let product: Product = Self::parse(value)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response isn't a product.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let url = self.endpoint("products")?;
        let created: Product = Self::parse(self.send(Method::POST, url, Some(product)).await?)?;
        // Any cached listing may now be stale
        self.inner.cache.invalidate_all();
        Ok(created)
    }

    /// List categories.
    ///
    /// Never fails: an unreachable backend or an unrecognised response shape
    /// yields the fallback category list. Only real answers are cached.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Vec<Category> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return categories;
        }

        let value = match self.endpoint("categories") {
            Ok(url) => self.get(url).await,
            Err(e) => Err(e),
        };
        match value.map(coerce_categories) {
            Ok(Some(categories)) => {
                self.inner
                    .cache
                    .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
                    .await;
                categories
            }
            Ok(None) => {
                tracing::warn!("Unrecognised categories response, using defaults");
                fallback_categories()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch categories, using defaults");
                fallback_categories()
            }
        }
    }

    /// Check that the backend answers, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the categories endpoint can't be reached or
    /// answers with a non-success status.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), ApiError> {
        let url = self.endpoint("categories")?;
        self.get(url).await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order or can't be reached.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total_amount))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let url = self.endpoint("orders")?;
        Self::parse(self.send(Method::POST, url, Some(order)).await?)
    }

    /// List orders. Entries that don't parse are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("orders")?;
        let orders = match self.get(url).await? {
            Value::Array(entries) => entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value(entry).ok())
                .collect(),
            _ => Vec::new(),
        };
        Ok(orders)
    }

    /// Update an order's statuses.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or can't be reached.
    #[instrument(skip(self, update), fields(order_id = %id))]
    pub async fn update_order(
        &self,
        id: &OrderId,
        update: &OrderStatusUpdate,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("orders/{}", urlencoding::encode(id.as_str())))?;
        self.send(Method::PUT, url, Some(update)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&ApiConfig::new(base, Duration::from_secs(60)).unwrap())
    }

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let client = client("http://localhost:4000/api");
        assert_eq!(
            client.endpoint("orders").unwrap().as_str(),
            "http://localhost:4000/api/orders"
        );
    }

    #[tokio::test]
    async fn test_categories_fall_back_when_unreachable() {
        // Port 9 (discard) is never an HTTP server in the test environment
        let client = client("http://127.0.0.1:9/api");
        let categories = client.categories().await;
        assert_eq!(categories, fallback_categories());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let client = client("http://127.0.0.1:9/api");
        let result = client.orders().await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }
}
