//! Bazaar Core - domain types and client-side storefront state.
//!
//! This crate provides the types shared by every Bazaar component:
//! - `storefront` - Server-rendered storefront over the REST backend
//! - `cli` - Headless command-line client
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! storage, no HTTP clients. Persistence and networking live in the storefront
//! crate, which wraps these types.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and statuses
//! - [`catalog`] - Products, categories and listing filters
//! - [`cart`] / [`wishlist`] / [`address`] - Shopper-owned state
//! - [`order`] - Orders and the local order mirror
//! - [`checkout`] - Pricing and the checkout state machine
//! - [`notice`] - Messages produced by mutations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notice;
pub mod order;
pub mod types;
pub mod wishlist;

pub use address::{Address, AddressBook, AddressError, AddressInput, AddressUpdate};
pub use cart::{Cart, CartItem};
pub use catalog::{Category, Product, ProductFilter, ProductQuery, SortOrder, StarRating};
pub use checkout::{Checkout, CheckoutError, CheckoutState, OrderSummary, PricingRules};
pub use notice::{Notice, NoticeLevel};
pub use order::{NewOrder, Order, OrderHistory, OrderItem, OrderStatusUpdate};
pub use types::*;
pub use wishlist::Wishlist;
