//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_API_URL` - Base URL of the REST backend (e.g., `https://api.example.com/api`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BAZAAR_DATA_DIR` - Directory for persisted shopper state (default: `.bazaar`)
//! - `BAZAAR_DEMO_USER_ID` - User ID attached to placed orders
//! - `BAZAAR_ORDER_STATUS_DELAY_SECS` - Delay before the simulated payment update (default: 5)
//! - `BAZAAR_CATALOG_CACHE_TTL_SECS` - Product/category cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use bazaar_core::UserId;

/// The demo shopper every order is placed for.
pub const DEFAULT_DEMO_USER_ID: &str = "68a2d027f17a6dbb2ee3e0ab";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// REST backend configuration
    pub api: ApiConfig,
    /// Where the persisted cart, wishlist, addresses and orders live
    pub data_dir: PathBuf,
    /// User attached to placed orders
    pub demo_user_id: UserId,
    /// Delay before the simulated payment/shipment update
    pub order_status_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: Url,
    /// TTL for cached product and category responses
    pub cache_ttl: Duration,
}

impl ApiConfig {
    /// Build an API configuration from a base URL string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL doesn't parse or can't
    /// carry a path.
    pub fn new(base_url: &str, cache_ttl: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("BAZAAR_API_URL", base_url)?,
            cache_ttl,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;

        Ok(Self {
            host,
            port,
            api: ApiConfig::from_env()?,
            data_dir: PathBuf::from(get_env_or_default("BAZAAR_DATA_DIR", ".bazaar")),
            demo_user_id: UserId::new(get_env_or_default(
                "BAZAAR_DEMO_USER_ID",
                DEFAULT_DEMO_USER_ID,
            )),
            order_status_delay: Duration::from_secs(parse_env(
                "BAZAAR_ORDER_STATUS_DELAY_SECS",
                "5",
            )?),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ApiConfig {
    /// Load the backend settings on their own (the CLI needs nothing else).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `BAZAAR_API_URL` is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("BAZAAR_API_URL")?;
        let ttl = parse_env("BAZAAR_CATALOG_CACHE_TTL_SECS", "300")?;
        Self::new(&base_url, Duration::from_secs(ttl))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default literal.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a base URL so that `join("products")` appends rather than replaces.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("K", "https://backend.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://backend.example.com/api/");
        assert_eq!(
            url.join("products").unwrap().as_str(),
            "https://backend.example.com/api/products"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        let result = parse_base_url("K", "not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));

        let result = parse_base_url("K", "mailto:shop@example.com");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_env_default() {
        let value: u64 = parse_env("BAZAAR_TEST_UNSET_VARIABLE", "42").unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            api: ApiConfig::new("http://localhost:4000/api", Duration::from_secs(1)).unwrap(),
            data_dir: PathBuf::from(".bazaar"),
            demo_user_id: UserId::new(DEFAULT_DEMO_USER_ID),
            order_status_delay: Duration::from_secs(5),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
