//! Wishlist state: product snapshots, unique per product.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::notice::Notice;
use crate::types::ProductId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    items: Vec<Product>,
}

impl Wishlist {
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|p| p.id == *id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a product; already-present products are left alone with a warning.
    pub fn add(&mut self, product: Product) -> Notice {
        if self.contains(&product.id) {
            return Notice::warning(format!("{} is already in wishlist", product.name));
        }
        let notice = Notice::success(format!("Added {} to wishlist!", product.name));
        self.items.push(product);
        notice
    }

    pub fn remove(&mut self, id: &ProductId) -> Notice {
        let name = self
            .items
            .iter()
            .find(|p| p.id == *id)
            .map_or_else(|| "item".to_string(), |p| p.name.clone());
        self.items.retain(|p| p.id != *id);
        Notice::info(format!("Removed {name} from wishlist"))
    }

    /// Heart button: add when absent, remove when present.
    pub fn toggle(&mut self, product: Product) -> Notice {
        if self.contains(&product.id) {
            self.remove(&product.id)
        } else {
            self.add(product)
        }
    }

    /// Remove and return a product, e.g. to move it into the cart.
    pub fn take(&mut self, id: &ProductId) -> Option<Product> {
        let idx = self.items.iter().position(|p| p.id == *id)?;
        Some(self.items.remove(idx))
    }

    pub fn clear(&mut self) -> Notice {
        self.items.clear();
        Notice::info("Wishlist cleared")
    }
}
