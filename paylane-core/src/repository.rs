use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::order::{LineItem, OrderId, OrderStatus, ShippingInfo};

/// Failure talking to the host order store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("order store failure: {0}")]
    Backend(String),
}

/// Host-side order storage.
///
/// The gateway never owns orders; it reads and writes through this seam.
/// Notes are append-only and ordered by creation.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_meta(&self, order: OrderId, key: &str) -> Result<Option<String>, StoreError>;

    async fn update_meta(&self, order: OrderId, key: &str, value: &str)
        -> Result<(), StoreError>;

    async fn status(&self, order: OrderId) -> Result<OrderStatus, StoreError>;

    async fn set_status(&self, order: OrderId, status: OrderStatus) -> Result<(), StoreError>;

    /// Mark the order paid. The store decides between `Processing` and
    /// `Completed`: orders with nothing left to fulfil complete directly.
    async fn payment_complete(&self, order: OrderId) -> Result<(), StoreError>;

    async fn append_note(&self, order: OrderId, text: &str) -> Result<(), StoreError>;

    /// Order total in minor units.
    async fn total_minor(&self, order: OrderId) -> Result<i64, StoreError>;

    /// Lowercase ISO 4217 code of the order.
    async fn currency(&self, order: OrderId) -> Result<String, StoreError>;

    /// Gateway id the order was paid with.
    async fn payment_method(&self, order: OrderId) -> Result<String, StoreError>;

    async fn line_items(&self, order: OrderId) -> Result<Vec<LineItem>, StoreError>;

    async fn shipping_info(&self, order: OrderId) -> Result<ShippingInfo, StoreError>;
}

/// Maps host users to remote customer ids.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn customer_id_for_user(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    /// Create a remote customer for the user and record the mapping.
    async fn create_customer_for_user(&self, user_id: &str) -> Result<String, StoreError>;
}

/// Persists saved payment methods for a user.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn save_payment_method(
        &self,
        user_id: &str,
        payment_method_id: &str,
    ) -> Result<(), StoreError>;
}

/// Deferred-job scheduling seam (host cron, action scheduler, ...).
#[async_trait]
pub trait JobScheduler: Send + Sync {
    async fn schedule(
        &self,
        hook: &str,
        run_at: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<(), StoreError>;
}
