//! Persisted shopper state.
//!
//! Each [`Store`] owns one value from `bazaar-core`, loads it from storage on
//! open, writes it back after every mutation and broadcasts the new snapshot
//! to subscribers. The lock is only held for the synchronous
//! mutate-and-persist step; nothing awaits while holding it.
//!
//! [`Shop`] bundles the stores for the single demo shopper.

mod shop;

pub use shop::Shop;

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use bazaar_core::{Address, AddressBook, AddressId, Cart, OrderHistory, Wishlist};

use crate::storage::{self, KeyValueStore, Storage, keys};

/// A value that knows where it lives in storage.
pub trait Persist: Sized {
    /// Load from storage, falling back to an empty value.
    fn load(storage: &dyn KeyValueStore) -> Self;

    /// Write to storage. Failures are logged, never returned.
    fn save(&self, storage: &dyn KeyValueStore);
}

impl Persist for Cart {
    fn load(storage: &dyn KeyValueStore) -> Self {
        storage::load(storage, keys::CART)
    }

    fn save(&self, storage: &dyn KeyValueStore) {
        storage::save(storage, keys::CART, self);
    }
}

impl Persist for Wishlist {
    fn load(storage: &dyn KeyValueStore) -> Self {
        storage::load(storage, keys::WISHLIST)
    }

    fn save(&self, storage: &dyn KeyValueStore) {
        storage::save(storage, keys::WISHLIST, self);
    }
}

impl Persist for OrderHistory {
    fn load(storage: &dyn KeyValueStore) -> Self {
        storage::load(storage, keys::ORDERS)
    }

    fn save(&self, storage: &dyn KeyValueStore) {
        storage::save(storage, keys::ORDERS, self);
    }
}

// The address list and the checkout selection are separate documents.
impl Persist for AddressBook {
    fn load(storage: &dyn KeyValueStore) -> Self {
        let addresses: Vec<Address> = storage::load(storage, keys::ADDRESSES);
        let selected: Option<AddressId> = storage::load(storage, keys::SELECTED_ADDRESS);
        Self::new(addresses, selected)
    }

    fn save(&self, storage: &dyn KeyValueStore) {
        storage::save(storage, keys::ADDRESSES, self.addresses());
        match self.selected_id() {
            Some(id) => storage::save(storage, keys::SELECTED_ADDRESS, id),
            None => {
                if let Err(e) = storage.remove(keys::SELECTED_ADDRESS) {
                    tracing::error!(error = %e, "Failed to clear selected address");
                }
            }
        }
    }
}

/// A persisted, observable value.
pub struct Store<T> {
    value: Mutex<T>,
    storage: Storage,
    changes: watch::Sender<T>,
}

impl<T> Store<T>
where
    T: Persist + Clone + Send + Sync,
{
    /// Load the value from storage.
    pub fn open(storage: Storage) -> Self {
        let value = T::load(storage.as_ref());
        let (changes, _) = watch::channel(value.clone());
        Self {
            value: Mutex::new(value),
            storage,
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current value.
    pub fn snapshot(&self) -> T {
        self.lock().clone()
    }

    /// Read without cloning.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    /// Mutate, persist and notify subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut value = self.lock();
        let result = f(&mut value);
        value.save(self.storage.as_ref());
        self.changes.send_replace(value.clone());
        result
    }

    /// Watch for new snapshots.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bazaar_core::{AddressInput, Product, ProductId, Price};

    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_cents(1000),
            image: None,
            category: "Books".to_string(),
            rating: 4.0,
            review_count: None,
            stock: 3,
        }
    }

    #[test]
    fn test_update_persists() {
        let storage: Storage = Arc::new(MemoryStorage::new());
        let store: Store<Cart> = Store::open(Arc::clone(&storage));
        store.update(|cart| cart.add(product("p1"), 2));

        let reopened: Store<Cart> = Store::open(storage);
        assert_eq!(reopened.read(Cart::count), 2);
    }

    #[test]
    fn test_subscribers_see_changes() {
        let storage: Storage = Arc::new(MemoryStorage::new());
        let store: Store<Wishlist> = Store::open(storage);
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.update(|wishlist| wishlist.add(product("p1")));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().count(), 1);
    }

    #[test]
    fn test_address_book_keeps_selection_separately() {
        let storage: Storage = Arc::new(MemoryStorage::new());
        let store: Store<AddressBook> = Store::open(Arc::clone(&storage));
        let first = store.update(|book| {
            book.add(AddressInput {
                full_name: "Ada".to_string(),
                is_default: true,
                ..AddressInput::default()
            })
        });
        let second = store.update(|book| {
            book.add(AddressInput {
                full_name: "Grace".to_string(),
                ..AddressInput::default()
            })
        });
        store.update(|book| book.select(&second.id)).unwrap();

        assert!(storage.read(keys::SELECTED_ADDRESS).unwrap().is_some());
        let reopened: Store<AddressBook> = Store::open(storage);
        reopened.read(|book| {
            assert_eq!(book.selected().map(|a| &a.id), Some(&second.id));
            assert_eq!(book.default_address().map(|a| &a.id), Some(&first.id));
        });
    }

    #[test]
    fn test_corrupt_cart_opens_empty() {
        let storage: Storage = Arc::new(MemoryStorage::new());
        storage.write(keys::CART, "{\"broken\":").unwrap();
        let store: Store<Cart> = Store::open(storage);
        assert!(store.read(Cart::is_empty));
    }
}
