//! Orders: the backend's record plus the local mirror.
//!
//! The backend is authoritative once an order exists. The client keeps a
//! mirror so the confirmation and history pages work offline, and patches that
//! mirror when a status update can't reach the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{AddressId, OrderId, OrderStatus, PaymentStatus, Price, ProductId, UserId};

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(deserialize_with = "reference")]
    pub product: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub price: Price,
}

/// An order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    #[serde(default, deserialize_with = "optional_reference")]
    pub user: Option<UserId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "optional_reference")]
    pub shipping_address: Option<AddressId>,
    #[serde(default)]
    pub total_amount: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |acc, item| acc.saturating_add(item.quantity))
    }

    pub fn apply(&mut self, update: &OrderStatusUpdate) {
        self.status = update.status.clone();
        self.payment_status = update.payment_status.clone();
    }
}

/// Payload for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: AddressId,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// Payload for `PUT /orders/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl OrderStatusUpdate {
    /// The transition simulated once the payment "clears".
    #[must_use]
    pub const fn settled() -> Self {
        Self {
            status: OrderStatus::Processing,
            payment_status: PaymentStatus::Paid,
        }
    }
}

/// Local mirror of placed orders, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderHistory {
    orders: Vec<Order>,
}

impl OrderHistory {
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == *id)
    }

    /// Insert an order at the front, replacing any older copy with the same ID.
    pub fn record(&mut self, order: Order) {
        self.orders.retain(|o| o.id != order.id);
        self.orders.insert(0, order);
    }

    /// Patch an order's statuses. Returns false if the order isn't mirrored.
    pub fn apply(&mut self, id: &OrderId, update: &OrderStatusUpdate) -> bool {
        let Some(order) = self.orders.iter_mut().find(|o| o.id == *id) else {
            return false;
        };
        order.apply(update);
        true
    }

    /// Orders sorted by creation time, newest first; undated orders last.
    #[must_use]
    pub fn newest_first(&self) -> Vec<Order> {
        let mut orders = self.orders.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

/// Accept either a bare ID or a populated document carrying `_id` / `id`.
fn reference<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    optional_reference(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("missing reference id"))
}

fn optional_reference<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(id)) => Some(T::from(id)),
        Some(Value::Object(map)) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)
            .map(|id| T::from(id.to_string())),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn order(id: &str, created: Option<&str>) -> Order {
        Order {
            id: OrderId::new(id),
            user: None,
            items: vec![OrderItem {
                product: ProductId::new("p"),
                quantity: 2,
                price: Price::from_cents(1000),
            }],
            shipping_address: None,
            total_amount: Price::from_cents(2959),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: created.map(|c| c.parse().unwrap()),
        }
    }

    #[test]
    fn test_parses_populated_references() {
        let parsed: Order = serde_json::from_value(json!({
            "_id": "o1",
            "user": { "_id": "u1", "name": "Demo" },
            "items": [{ "product": { "_id": "p1", "name": "Lamp" }, "quantity": 2, "price": 10 }],
            "shippingAddress": "addr-1",
            "totalAmount": 29.59,
            "status": "Pending",
            "paymentStatus": "Pending",
            "createdAt": "2025-08-18T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(parsed.user, Some(UserId::new("u1")));
        assert_eq!(parsed.items.first().unwrap().product, ProductId::new("p1"));
        assert_eq!(parsed.shipping_address, Some(AddressId::new("addr-1")));
        assert_eq!(parsed.total_amount, Price::from_cents(2959));
        assert_eq!(parsed.item_count(), 2);
    }

    #[test]
    fn test_sparse_order_uses_defaults() {
        let parsed: Order = serde_json::from_value(json!({ "_id": "o1" })).unwrap();
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.status, OrderStatus::Pending);
        assert!(parsed.created_at.is_none());
    }

    #[test]
    fn test_new_order_wire_shape() {
        let payload = NewOrder {
            user: UserId::new("u"),
            items: vec![],
            shipping_address: AddressId::new("a"),
            total_amount: Price::from_cents(599),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["shippingAddress"], "a");
        assert_eq!(json["paymentStatus"], "Pending");
        assert!(json["totalAmount"].is_number());
    }

    #[test]
    fn test_record_puts_newest_first_and_dedupes() {
        let mut history = OrderHistory::default();
        history.record(order("a", None));
        history.record(order("b", None));
        history.record(order("a", None));

        let ids: Vec<_> = history.orders().iter().map(|o| o.id.to_string()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_apply_patches_statuses() {
        let mut history = OrderHistory::default();
        history.record(order("a", None));

        assert!(history.apply(&OrderId::new("a"), &OrderStatusUpdate::settled()));
        let patched = history.get(&OrderId::new("a")).unwrap();
        assert_eq!(patched.status, OrderStatus::Processing);
        assert_eq!(patched.payment_status, PaymentStatus::Paid);

        assert!(!history.apply(&OrderId::new("zzz"), &OrderStatusUpdate::settled()));
    }

    #[test]
    fn test_history_keeps_unrecognised_statuses() {
        let history: OrderHistory = serde_json::from_value(json!([{
            "_id": "o1",
            "status": "AwaitingPickup",
            "paymentStatus": "Refunded"
        }]))
        .unwrap();

        let saved = serde_json::to_value(&history).unwrap();
        assert_eq!(saved[0]["status"], "AwaitingPickup");
        assert_eq!(saved[0]["paymentStatus"], "Refunded");
    }

    #[test]
    fn test_newest_first_sorting() {
        let mut history = OrderHistory::default();
        history.record(order("old", Some("2025-01-01T00:00:00Z")));
        history.record(order("undated", None));
        history.record(order("new", Some("2025-06-01T00:00:00Z")));

        let ids: Vec<_> = history
            .newest_first()
            .into_iter()
            .map(|o| o.id.to_string())
            .collect();
        assert_eq!(ids, ["new", "old", "undated"]);
    }
}
