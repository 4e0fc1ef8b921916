use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Identifier of an order in the host store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Order status in the host store's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    OnHold,
    Processing,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

/// Meta keys the gateway stores on an order.
///
/// `intent_id` and `charge_id`, once written, identify the remote
/// resources tied to the order and are never rewritten.
pub mod meta {
    pub const INTENT_ID: &str = "intent_id";
    pub const CHARGE_ID: &str = "charge_id";
    pub const INTENTION_STATUS: &str = "intention_status";
    pub const INTENT_CURRENCY: &str = "intent_currency";
    pub const PAYMENT_METHOD_ID: &str = "payment_method_id";
    pub const TRACKING_COMPLETE: &str = "tracking_complete";
}

/// A purchasable line on an order. Amounts are in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Product behind the line; `None` for fee lines.
    pub product_id: Option<u64>,
    pub name: String,
    pub quantity: u32,
    /// Line subtotal before discounts.
    pub subtotal_minor: i64,
    /// Line total after discounts.
    pub total_minor: i64,
    pub tax_minor: i64,
}

/// Shipping totals and destination for an order. Amounts are in minor
/// units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub total_minor: i64,
    pub tax_minor: i64,
    pub postcode: Option<String>,
}

/// An order as the gateway sees it: an explicit value object, read and
/// written through the `OrderStore` seam rather than mutated in place by
/// the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    /// Lowercase ISO 4217 code.
    pub currency: String,
    pub total_minor: i64,
    /// Whether completion of payment leaves work to do (shipping etc.).
    /// Decides `Processing` vs `Completed` when payment completes.
    pub needs_processing: bool,
    /// Gateway id the order was paid with.
    pub payment_method: String,
    pub meta: HashMap<String, String>,
    pub line_items: Vec<LineItem>,
    pub shipping: ShippingInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(currency: &str, total_minor: i64) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            status: OrderStatus::Pending,
            currency: currency.to_string(),
            total_minor,
            needs_processing: true,
            payment_method: String::new(),
            meta: HashMap::new(),
            line_items: Vec::new(),
            shipping: ShippingInfo::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update order status
    pub fn update_status(&mut self, new_status: OrderStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    pub fn get_meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn set_meta(&mut self, key: &str, value: &str) {
        self.meta.insert(key.to_string(), value.to_string());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_uses_host_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OnHold).unwrap(),
            "\"on-hold\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn test_meta_round_trip() {
        let mut order = Order::new("usd", 1500);
        assert_eq!(order.get_meta(meta::INTENT_ID), None);

        order.set_meta(meta::INTENT_ID, "pi_123");
        assert_eq!(order.get_meta(meta::INTENT_ID), Some("pi_123"));
    }
}
