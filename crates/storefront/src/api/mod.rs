//! REST backend client.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`; the backend is the source of truth for the
//!   catalog and for orders
//! - In-memory caching via `moka` for product and category responses
//! - Malformed catalog responses are coerced to safe defaults instead of
//!   failing the page
//!
//! # Endpoints
//!
//! ```text
//! GET  /products          GET /products/:id      POST /products
//! GET  /categories
//! POST /orders            GET /orders            PUT  /orders/:id
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::api::BackendClient;
//!
//! let client = BackendClient::new(&config.api);
//! let products = client.products(&ProductQuery::default()).await?;
//! let order = client.create_order(&payload).await?;
//! ```

mod cache;
mod client;

pub use client::BackendClient;

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the backend's own `message` field when it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body wasn't the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An endpoint URL couldn't be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message suitable for showing inline to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Http(_) => "Could not reach the store. Please try again.".to_string(),
            Self::Parse(_) | Self::Url(_) => "Unexpected response from the store".to_string(),
        }
    }
}

/// Pull a human message out of an error body.
///
/// Uses the body's `message` (or `error`) field when present, otherwise the
/// generic `HTTP error! status: N`.
pub(crate) fn status_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(serde_json::Value::as_str)
                .filter(|m| !m.is_empty())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| format!("HTTP error! status: {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_prefers_backend_message() {
        assert_eq!(
            status_message(400, r#"{"message":"Invalid shipping address"}"#),
            "Invalid shipping address"
        );
        assert_eq!(status_message(500, r#"{"error":"boom"}"#), "boom");
    }

    #[test]
    fn test_status_message_falls_back_to_status() {
        assert_eq!(status_message(502, "<html>bad gateway</html>"), "HTTP error! status: 502");
        assert_eq!(status_message(500, r#"{"message":""}"#), "HTTP error! status: 500");
    }

    #[test]
    fn test_status_error_displays_message() {
        let err = ApiError::Status {
            status: 422,
            message: "Cart is empty".to_string(),
        };
        assert_eq!(err.to_string(), "Cart is empty");
        assert_eq!(err.user_message(), "Cart is empty");
    }

    #[test]
    fn test_not_found_display() {
        let err = ApiError::NotFound("Product abc".to_string());
        assert_eq!(err.to_string(), "Not found: Product abc");
        assert_eq!(err.user_message(), "Product abc not found");
    }
}
