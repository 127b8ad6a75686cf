//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Order placement and the simulated payment update

pub mod checkout;

pub use checkout::{CheckoutService, PlaceOrderError, PlacedOrder, StatusSync};
