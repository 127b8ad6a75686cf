//! Status enums for orders.
//!
//! The backend stores these as capitalized strings (`"Pending"`, `"Shipped"`).
//! Values this client does not know about are kept verbatim in `Unknown`, so
//! they survive a save of the local order mirror unchanged.

use serde::{Deserialize, Serialize};

/// Defines a wire-string status enum with a lossless `Unknown(String)`
/// catch-all.
macro_rules! wire_status {
    (
        $(#[$meta:meta])*
        $name:ident { default: $default:ident, $($variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            #[default]
            $default,
            $($variant,)+
            /// A value this client doesn't recognise, as the backend sent it.
            Unknown(String),
        }

        impl $name {
            /// The wire name.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    Self::$default => stringify!($default),
                    $(Self::$variant => stringify!($variant),)+
                    Self::Unknown(raw) => raw,
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    stringify!($default) => Self::$default,
                    $(stringify!($variant) => Self::$variant,)+
                    _ => Self::Unknown(raw),
                }
            }
        }

        impl From<$name> for String {
            fn from(status: $name) -> Self {
                match status {
                    $name::Unknown(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_status! {
    /// Order fulfillment status.
    OrderStatus { default: Pending, Processing, Shipped, Delivered, Cancelled }
}

wire_status! {
    /// Order payment status.
    PaymentStatus { default: Pending, Paid, Failed }
}

impl OrderStatus {
    /// Badge style used by the views.
    #[must_use]
    pub const fn badge(&self) -> &'static str {
        match self {
            Self::Delivered => "success",
            Self::Shipped => "info",
            Self::Processing => "warning",
            Self::Cancelled => "danger",
            Self::Pending | Self::Unknown(_) => "secondary",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"Processing\""
        );
        let paid: PaymentStatus = serde_json::from_str("\"Paid\"").unwrap();
        assert_eq!(paid, PaymentStatus::Paid);
    }

    #[test]
    fn test_unknown_status_tolerated() {
        let status: OrderStatus = serde_json::from_str("\"Refunded\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown("Refunded".to_string()));
        assert_eq!(status.badge(), "secondary");
        assert_eq!(status.to_string(), "Refunded");
    }

    #[test]
    fn test_unknown_status_written_back_verbatim() {
        let status: PaymentStatus = serde_json::from_str("\"PartiallyRefunded\"").unwrap();
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            "\"PartiallyRefunded\""
        );
    }

    #[test]
    fn test_display_matches_wire_names() {
        assert_eq!(OrderStatus::Shipped.to_string(), "Shipped");
        assert_eq!(PaymentStatus::Pending.to_string(), "Pending");
    }
}
