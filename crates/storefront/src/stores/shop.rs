//! The demo shopper's state.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::instrument;

use bazaar_core::{
    Address, AddressBook, AddressError, AddressId, AddressInput, AddressUpdate, Cart, Checkout,
    Notice, Order, OrderHistory, OrderId, OrderStatusUpdate, Product, ProductId, Wishlist,
};

use super::Store;
use crate::storage::Storage;

/// Cart, wishlist, address book and order mirror for one shopper, plus the
/// queue of notices waiting to be shown.
///
/// Every mutator returns the notice it produced and also queues it, so the web
/// layer can show it on the next page render.
pub struct Shop {
    cart: Store<Cart>,
    wishlist: Store<Wishlist>,
    addresses: Store<AddressBook>,
    orders: Store<OrderHistory>,
    checkout: Mutex<Checkout>,
    notices: Mutex<Vec<Notice>>,
}

impl Shop {
    /// Load every store from `storage`.
    #[must_use]
    pub fn open(storage: &Storage) -> Self {
        Self {
            cart: Store::open(Arc::clone(storage)),
            wishlist: Store::open(Arc::clone(storage)),
            addresses: Store::open(Arc::clone(storage)),
            orders: Store::open(Arc::clone(storage)),
            checkout: Mutex::new(Checkout::default()),
            notices: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Store<Cart> {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &Store<Wishlist> {
        &self.wishlist
    }

    #[must_use]
    pub const fn addresses(&self) -> &Store<AddressBook> {
        &self.addresses
    }

    #[must_use]
    pub const fn orders(&self) -> &Store<OrderHistory> {
        &self.orders
    }

    /// The checkout state machine. Never held across an await.
    pub(crate) fn checkout(&self) -> std::sync::MutexGuard<'_, Checkout> {
        self.checkout.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the checkout state machine.
    #[must_use]
    pub fn checkout_state(&self) -> Checkout {
        self.checkout().clone()
    }

    // =========================================================================
    // Notices
    // =========================================================================

    /// Queue a notice for the next render.
    pub fn flash(&self, notice: Notice) -> Notice {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
        notice
    }

    /// Drain the queued notices.
    #[must_use]
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(&self, product: Product, quantity: u32) -> Notice {
        self.flash(self.cart.update(|cart| cart.add(product, quantity)))
    }

    #[instrument(skip(self))]
    pub fn remove_from_cart(&self, id: &ProductId) -> Notice {
        self.flash(self.cart.update(|cart| cart.remove(id)))
    }

    #[instrument(skip(self))]
    pub fn set_cart_quantity(&self, id: &ProductId, quantity: i64) -> Notice {
        self.flash(self.cart.update(|cart| cart.set_quantity(id, quantity)))
    }

    #[instrument(skip(self))]
    pub fn clear_cart(&self) -> Notice {
        self.flash(self.cart.update(Cart::clear))
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_wishlist(&self, product: Product) -> Notice {
        self.flash(self.wishlist.update(|wishlist| wishlist.add(product)))
    }

    #[instrument(skip(self))]
    pub fn remove_from_wishlist(&self, id: &ProductId) -> Notice {
        self.flash(self.wishlist.update(|wishlist| wishlist.remove(id)))
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn toggle_wishlist(&self, product: Product) -> Notice {
        self.flash(self.wishlist.update(|wishlist| wishlist.toggle(product)))
    }

    #[instrument(skip(self))]
    pub fn clear_wishlist(&self) -> Notice {
        self.flash(self.wishlist.update(Wishlist::clear))
    }

    /// Add a wishlisted product to the cart and drop it from the wishlist.
    ///
    /// Returns `None` if the product isn't wishlisted.
    #[instrument(skip(self))]
    pub fn move_to_cart(&self, id: &ProductId) -> Option<Notice> {
        let product = self.wishlist.update(|wishlist| wishlist.take(id))?;
        let name = product.name.clone();
        self.cart.update(|cart| cart.add(product, 1));
        Some(self.flash(Notice::success(format!("Moved {name} to cart!"))))
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    #[instrument(skip(self, input))]
    pub fn add_address(&self, input: AddressInput) -> Address {
        let address = self.addresses.update(|book| book.add(input));
        self.flash(Notice::success("Address added successfully"));
        address
    }

    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for unknown IDs.
    #[instrument(skip(self, update))]
    pub fn update_address(
        &self,
        id: &AddressId,
        update: AddressUpdate,
    ) -> Result<Address, AddressError> {
        let address = self.addresses.update(|book| book.update(id, update))?;
        self.flash(Notice::success("Address updated successfully"));
        Ok(address)
    }

    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub fn delete_address(&self, id: &AddressId) -> Result<Address, AddressError> {
        let address = self.addresses.update(|book| book.delete(id))?;
        self.flash(Notice::info("Address deleted"));
        Ok(address)
    }

    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub fn select_address(&self, id: &AddressId) -> Result<(), AddressError> {
        self.addresses.update(|book| book.select(id))
    }

    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub fn set_default_address(&self, id: &AddressId) -> Result<Address, AddressError> {
        let address = self.addresses.update(|book| book.set_default(id))?;
        self.flash(Notice::success("Default address updated"));
        Ok(address)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Mirror a placed order locally, newest first.
    pub fn record_order(&self, order: Order) {
        self.orders.update(|history| history.record(order));
    }

    /// Patch the local mirror of an order. Returns false if it isn't mirrored.
    pub fn apply_order_update(&self, id: &OrderId, update: &OrderStatusUpdate) -> bool {
        self.orders.update(|history| history.apply(id, update))
    }
}
