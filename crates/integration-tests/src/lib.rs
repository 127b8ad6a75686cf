//! Integration test support for Bazaar.
//!
//! [`MockBackend`] serves the REST endpoints the storefront talks to from
//! memory, on an ephemeral port. Tests point a real `BackendClient` (or the
//! whole storefront router) at it and flip failure switches to exercise the
//! error paths.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use bazaar_storefront::config::{ApiConfig, DEFAULT_DEMO_USER_ID, StorefrontConfig};

/// In-memory backend state.
#[derive(Default)]
pub struct BackendData {
    pub products: Vec<Value>,
    pub categories: Value,
    pub orders: Vec<Value>,
    /// `(order id, body)` for every `PUT /orders/:id` received.
    pub status_updates: Vec<(String, Value)>,
}

/// Canned answer for `POST /orders`: status code and optional JSON body.
type Rejection = (StatusCode, Option<Value>);

#[derive(Default)]
struct Shared {
    data: Mutex<BackendData>,
    order_rejection: Mutex<Option<Rejection>>,
    reject_status_updates: AtomicBool,
}

/// A mock REST backend bound to `127.0.0.1:0`.
pub struct MockBackend {
    addr: SocketAddr,
    shared: Arc<Shared>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend holding the given products and category response.
    pub async fn start(products: Vec<Value>, categories: Value) -> Self {
        let shared = Arc::new(Shared::default());
        {
            let mut data = shared.data.lock().unwrap();
            data.products = products;
            data.categories = categories;
        }

        let app = Router::new()
            .route("/api/products", get(list_products).post(create_product))
            .route("/api/products/{id}", get(get_product))
            .route("/api/categories", get(list_categories))
            .route("/api/orders", get(list_orders).post(create_order))
            .route("/api/orders/{id}", axum::routing::put(update_order))
            .with_state(Arc::clone(&shared));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            shared,
            server,
        }
    }

    /// Base URL including the `/api` prefix.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this backend.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.url(), Duration::from_secs(60)).unwrap()
    }

    /// Storefront configuration with a fresh data directory and a short
    /// status delay.
    #[must_use]
    pub fn storefront_config(&self) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            api: self.api_config(),
            data_dir: temp_data_dir(),
            demo_user_id: bazaar_core::UserId::new(DEFAULT_DEMO_USER_ID),
            order_status_delay: Duration::from_millis(20),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Answer `POST /orders` with a 500.
    pub fn reject_orders(&self, reject: bool) {
        let rejection = reject.then(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(json!({ "message": "Payment gateway unavailable" })),
            )
        });
        *self.shared.order_rejection.lock().unwrap() = rejection;
    }

    /// Answer `POST /orders` with `status` and `body`; no body when `None`.
    pub fn reject_orders_with(&self, status: u16, body: Option<Value>) {
        let status = StatusCode::from_u16(status).unwrap();
        *self.shared.order_rejection.lock().unwrap() = Some((status, body));
    }

    /// Answer `PUT /orders/:id` with a 500.
    pub fn reject_status_updates(&self, reject: bool) {
        self.shared
            .reject_status_updates
            .store(reject, Ordering::SeqCst);
    }

    /// Inspect what the backend has recorded.
    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        self.shared.data.lock().unwrap()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A unique, not yet created directory under the system temp dir.
#[must_use]
pub fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("bazaar-it-{}", uuid::Uuid::new_v4().simple()))
}

/// A product record in the backend's wire format.
#[must_use]
pub fn product_json(id: &str, name: &str, price: f64, category: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "description": format!("{name} description"),
        "price": price,
        "category": category,
        "ratings": 4.5,
        "stock": 10
    })
}

// =============================================================================
// Handlers
// =============================================================================

type SharedState = State<Arc<Shared>>;

async fn list_products(
    State(shared): SharedState,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Json<Value> {
    let data = shared.data.lock().unwrap();
    let products = data
        .products
        .iter()
        .filter(|p| {
            params
                .get("category")
                .is_none_or(|c| p.get("category").and_then(Value::as_str) == Some(c.as_str()))
        })
        .filter(|p| {
            params.get("search").is_none_or(|s| {
                p.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&s.to_lowercase()))
            })
        })
        .cloned()
        .collect();
    Json(Value::Array(products))
}

async fn get_product(State(shared): SharedState, Path(id): Path<String>) -> Response {
    let data = shared.data.lock().unwrap();
    data.products
        .iter()
        .find(|p| p.get("_id").and_then(Value::as_str) == Some(id.as_str()))
        .map_or_else(
            || (StatusCode::NOT_FOUND, Json(json!({ "message": "Product not found" }))).into_response(),
            |p| Json(p.clone()).into_response(),
        )
}

async fn create_product(State(shared): SharedState, Json(mut body): Json<Value>) -> Response {
    body["_id"] = json!(uuid::Uuid::new_v4().simple().to_string());
    shared.data.lock().unwrap().products.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn list_categories(State(shared): SharedState) -> Json<Value> {
    Json(shared.data.lock().unwrap().categories.clone())
}

async fn list_orders(State(shared): SharedState) -> Json<Value> {
    Json(Value::Array(shared.data.lock().unwrap().orders.clone()))
}

async fn create_order(State(shared): SharedState, Json(mut body): Json<Value>) -> Response {
    let rejection = shared.order_rejection.lock().unwrap().clone();
    match rejection {
        Some((status, Some(body))) => return (status, Json(body)).into_response(),
        Some((status, None)) => return status.into_response(),
        None => {}
    }
    body["_id"] = json!(uuid::Uuid::new_v4().simple().to_string());
    body["createdAt"] = json!("2025-03-04T10:00:00Z");
    shared.data.lock().unwrap().orders.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_order(
    State(shared): SharedState,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if shared.reject_status_updates.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Update failed" })),
        )
            .into_response();
    }

    let mut data = shared.data.lock().unwrap();
    data.status_updates.push((id.clone(), body.clone()));
    let Some(order) = data
        .orders
        .iter_mut()
        .find(|o| o.get("_id").and_then(Value::as_str) == Some(id.as_str()))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    order["status"] = body["status"].clone();
    order["paymentStatus"] = body["paymentStatus"].clone();
    Json(order.clone()).into_response()
}
