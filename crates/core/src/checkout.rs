//! Checkout pricing and the submission state machine.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ Placed
//!                      │
//!                      └──error──▶ Failed ──submit──▶ Submitting
//! ```
//!
//! Submission requires a non-empty cart and a selected address.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::address::Address;
use crate::cart::Cart;
use crate::order::{NewOrder, OrderItem};
use crate::types::{OrderId, OrderStatus, PaymentStatus, Price, UserId};

/// Reasons a checkout can't be submitted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Please select a delivery address")]
    NoAddress,
    #[error("An order is already being placed")]
    InProgress,
}

/// Shipping and tax rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Price,
    pub shipping_fee: Price,
    pub tax_rate: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Price::from_cents(5000),
            shipping_fee: Price::from_cents(599),
            tax_rate: Decimal::new(18, 2),
        }
    }
}

/// Priced breakdown of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    pub item_count: u32,
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderSummary {
    #[must_use]
    pub fn compute(cart: &Cart, rules: &PricingRules) -> Self {
        let subtotal = cart.total();
        let shipping = if subtotal > rules.free_shipping_threshold {
            Price::ZERO
        } else {
            rules.shipping_fee
        };
        let tax = subtotal.scale(rules.tax_rate).round_to_cents();
        Self {
            item_count: cart.count(),
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }

    /// Tax rate as a whole percentage for labels ("Tax (18%)").
    #[must_use]
    pub fn tax_percent(rules: &PricingRules) -> Decimal {
        (rules.tax_rate * Decimal::ONE_HUNDRED).normalize()
    }
}

/// Where a checkout attempt stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    #[default]
    Idle,
    Submitting,
    Placed(OrderId),
    Failed(String),
}

/// Tracks a single checkout attempt.
#[derive(Debug, Clone, Default)]
pub struct Checkout {
    state: CheckoutState,
}

impl Checkout {
    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Check the guards without changing state.
    ///
    /// # Errors
    ///
    /// Returns the first guard that fails.
    pub fn can_submit(&self, cart: &Cart, address: Option<&Address>) -> Result<(), CheckoutError> {
        if self.state == CheckoutState::Submitting {
            return Err(CheckoutError::InProgress);
        }
        if address.is_none() {
            return Err(CheckoutError::NoAddress);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(())
    }

    /// Move to `Submitting` if the guards pass.
    ///
    /// # Errors
    ///
    /// Returns the failing guard; state is unchanged.
    pub fn begin(&mut self, cart: &Cart, address: Option<&Address>) -> Result<(), CheckoutError> {
        self.can_submit(cart, address)?;
        self.state = CheckoutState::Submitting;
        Ok(())
    }

    pub fn placed(&mut self, id: OrderId) {
        self.state = CheckoutState::Placed(id);
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        self.state = CheckoutState::Failed(message.into());
    }

    pub fn reset(&mut self) {
        self.state = CheckoutState::Idle;
    }
}

/// Build the `POST /orders` payload from the cart and delivery address.
#[must_use]
pub fn build_order(user: &UserId, cart: &Cart, address: &Address, rules: &PricingRules) -> NewOrder {
    let summary = OrderSummary::compute(cart, rules);
    NewOrder {
        user: user.clone(),
        items: cart
            .items()
            .iter()
            .map(|item| OrderItem {
                product: item.product.id.clone(),
                quantity: item.quantity,
                price: item.product.price,
            })
            .collect(),
        shipping_address: address.id.clone(),
        total_amount: summary.total,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::address::{AddressBook, AddressInput};
    use crate::cart::tests::product;

    fn address() -> Address {
        AddressBook::default().add(AddressInput {
            full_name: "Demo".to_string(),
            street: "1 Main St".to_string(),
            city: "Pune".to_string(),
            ..AddressInput::default()
        })
    }

    #[test]
    fn test_total_with_shipping_and_tax() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 2);

        let summary = OrderSummary::compute(&cart, &PricingRules::default());
        assert_eq!(summary.subtotal, Price::from_cents(2000));
        assert_eq!(summary.shipping, Price::from_cents(599));
        assert_eq!(summary.tax, Price::from_cents(360));
        assert_eq!(summary.total, Price::from_cents(2959));
        assert_eq!(summary.total.to_string(), "$29.59");
    }

    #[test]
    fn test_free_shipping_strictly_above_threshold() {
        let rules = PricingRules::default();

        let mut at_threshold = Cart::default();
        at_threshold.add(product("a", 5000), 1);
        assert!(!OrderSummary::compute(&at_threshold, &rules).free_shipping());

        let mut above = Cart::default();
        above.add(product("a", 5001), 1);
        assert!(OrderSummary::compute(&above, &rules).free_shipping());
    }

    #[test]
    fn test_blocked_without_address_or_items() {
        let checkout = Checkout::default();
        let mut cart = Cart::default();
        let addr = address();

        assert_eq!(checkout.can_submit(&cart, Some(&addr)), Err(CheckoutError::EmptyCart));

        cart.add(product("a", 1000), 1);
        assert_eq!(checkout.can_submit(&cart, None), Err(CheckoutError::NoAddress));
        assert!(checkout.can_submit(&cart, Some(&addr)).is_ok());
    }

    #[test]
    fn test_state_transitions() {
        let mut checkout = Checkout::default();
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 1);
        let addr = address();

        checkout.begin(&cart, Some(&addr)).unwrap();
        assert_eq!(checkout.state(), &CheckoutState::Submitting);
        assert_eq!(checkout.begin(&cart, Some(&addr)), Err(CheckoutError::InProgress));

        checkout.failed("HTTP error! status: 500");
        assert!(matches!(checkout.state(), CheckoutState::Failed(_)));

        checkout.begin(&cart, Some(&addr)).unwrap();
        checkout.placed(OrderId::new("o1"));
        assert_eq!(checkout.state(), &CheckoutState::Placed(OrderId::new("o1")));
    }

    #[test]
    fn test_build_order_payload() {
        let mut cart = Cart::default();
        cart.add(product("a", 1000), 2);
        let addr = address();

        let order = build_order(&UserId::new("demo"), &cart, &addr, &PricingRules::default());
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items.first().unwrap().quantity, 2);
        assert_eq!(order.shipping_address, addr.id);
        assert_eq!(order.total_amount, Price::from_cents(2959));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_tax_percent_label() {
        assert_eq!(
            OrderSummary::tax_percent(&PricingRules::default()).to_string(),
            "18"
        );
    }
}
