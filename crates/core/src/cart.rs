//! Shopping cart state.
//!
//! One line per product. Every mutation is total (unknown IDs are ignored) and
//! returns the [`Notice`] the shopper should see.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::notice::Notice;
use crate::types::{Price, ProductId};

/// A cart line: the product snapshot plus a quantity of at least one.
///
/// Serialized flat (`{ "_id": .., "name": .., "quantity": 2 }`) to keep the
/// persisted shape close to the product itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// The shopper's cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new(items: Vec<CartItem>) -> Self {
        let mut cart = Self::default();
        for item in items {
            cart.merge(item.product, item.quantity.max(1));
        }
        cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Add `quantity` of a product, merging into an existing line.
    pub fn add(&mut self, product: Product, quantity: u32) -> Notice {
        let quantity = quantity.max(1);
        let name = product.name.clone();
        if self.merge(product, quantity) {
            Notice::success(format!("Added {quantity} more {name} to cart!"))
        } else {
            Notice::success(format!("Added {name} to cart!"))
        }
    }

    /// Remove a product's line.
    pub fn remove(&mut self, id: &ProductId) -> Notice {
        let name = self.name_of(id);
        self.items.retain(|item| item.product.id != *id);
        Notice::info(format!("Removed {name} from cart"))
    }

    /// Set a line's quantity; zero or less removes the line.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> Notice {
        let Ok(quantity) = u32::try_from(quantity) else {
            return self.remove(id);
        };
        if quantity == 0 {
            return self.remove(id);
        }

        let name = self.name_of(id);
        if let Some(item) = self.items.iter_mut().find(|item| item.product.id == *id) {
            item.quantity = quantity;
        }
        Notice::info(format!("Updated {name} quantity to {quantity}"))
    }

    pub fn clear(&mut self) -> Notice {
        self.items.clear();
        Notice::info("Cart cleared")
    }

    /// Returns true when an existing line absorbed the quantity.
    fn merge(&mut self, product: Product, quantity: u32) -> bool {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            item.quantity = item.quantity.saturating_add(quantity);
            true
        } else {
            self.items.push(CartItem { product, quantity });
            false
        }
    }

    fn name_of(&self, id: &ProductId) -> String {
        self.get(id)
            .map_or_else(|| "item".to_string(), |item| item.product.name.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::notice::NoticeLevel;

    pub(crate) fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            description: String::new(),
            price: Price::from_cents(cents),
            image: None,
            category: "Books".to_string(),
            rating: 4.0,
            review_count: None,
            stock: 10,
        }
    }

    #[test]
    fn test_adding_same_product_twice_increases_quantity() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 1);
        let notice = cart.add(product("a", 1000), 2);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.count(), 3);
        assert_eq!(notice.message, "Added 2 more Item a to cart!");
    }

    #[test]
    fn test_zero_quantity_add_counts_as_one() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 0);
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 2);
        cart.add(product("b", 500), 1);

        let notice = cart.set_quantity(&ProductId::new("a"), 0);
        assert!(!cart.contains(&ProductId::new("a")));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(notice.level, NoticeLevel::Info);

        cart.set_quantity(&ProductId::new("b"), -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_updates_line() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 1);
        let notice = cart.set_quantity(&ProductId::new("a"), 4);
        assert_eq!(cart.get(&ProductId::new("a")).unwrap().quantity, 4);
        assert_eq!(notice.message, "Updated Item a quantity to 4");
    }

    #[test]
    fn test_totals_and_count() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 2);
        cart.add(product("b", 250), 3);
        assert_eq!(cart.total(), Price::from_cents(2750));
        assert_eq!(cart.count(), 5);
    }

    #[test]
    fn test_remove_unknown_is_harmless() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 1);
        let notice = cart.remove(&ProductId::new("zzz"));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(notice.message, "Removed item from cart");
    }

    #[test]
    fn test_clear_empties_cart() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_persisted_shape_is_flat() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 2);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json[0]["_id"], "a");
        assert_eq!(json[0]["quantity"], 2);

        let restored: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_new_merges_duplicate_lines() {
        let cart = Cart::new(vec![
            CartItem { product: product("a", 100), quantity: 1 },
            CartItem { product: product("a", 100), quantity: 2 },
        ]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.count(), 3);
    }
}
