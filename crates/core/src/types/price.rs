//! Type-safe price representation using decimal arithmetic.
//!
//! The backend speaks JSON numbers (`"price": 19.99`), so prices deserialize
//! from either numbers or strings and always serialize back as numbers.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in the store currency (US dollars).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the price is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round to whole cents, half away from zero.
    #[must_use]
    pub fn round_to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Multiply by a fractional rate (e.g. a tax rate).
    #[must_use]
    pub fn scale(self, rate: Decimal) -> Self {
        Self(self.0 * rate)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.round_to_cents().0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(599).to_string(), "$5.99");
        assert_eq!(Price::new(Decimal::from(20)).to_string(), "$20.00");
    }

    #[test]
    fn test_deserialize_from_number_and_string() {
        let from_float: Price = serde_json::from_str("19.99").unwrap();
        let from_int: Price = serde_json::from_str("10").unwrap();
        let from_str: Price = serde_json::from_str("\"4.50\"").unwrap();
        assert_eq!(from_float, Price::from_cents(1999));
        assert_eq!(from_int, Price::from_cents(1000));
        assert_eq!(from_str, Price::from_cents(450));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_value(Price::from_cents(1999)).unwrap();
        assert!(json.is_number());
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        let price = Price::new(Decimal::new(1005, 3)); // 1.005
        assert_eq!(price.round_to_cents(), Price::from_cents(101));
    }

    #[test]
    fn test_line_arithmetic() {
        let line = Price::from_cents(1000) * 2;
        let total: Price = [line, Price::from_cents(599)].into_iter().sum();
        assert_eq!(total, Price::from_cents(2599));
    }
}
