use std::collections::HashMap;

use async_trait::async_trait;
use paylane_core::order::{LineItem, Order, OrderId, OrderStatus, ShippingInfo};
use paylane_core::repository::{CustomerStore, OrderStore, StoreError, TokenStore};
use tokio::sync::{Mutex, RwLock};

struct OrderRecord {
    order: Order,
    notes: Vec<String>,
}

/// In-memory order store: the reference implementation of the host side
/// of the `OrderStore` seam, backing the test suites and local
/// composition.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, OrderRecord>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order, returning its id.
    pub async fn insert(&self, order: Order) -> OrderId {
        let id = order.id;
        self.orders.write().await.insert(
            id,
            OrderRecord {
                order,
                notes: Vec::new(),
            },
        );
        id
    }

    /// Snapshot an order.
    pub async fn get(&self, order: OrderId) -> Option<Order> {
        self.orders
            .read()
            .await
            .get(&order)
            .map(|record| record.order.clone())
    }

    /// Notes appended so far, oldest first.
    pub async fn notes(&self, order: OrderId) -> Vec<String> {
        self.orders
            .read()
            .await
            .get(&order)
            .map(|record| record.notes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn get_meta(&self, order: OrderId, key: &str) -> Result<Option<String>, StoreError> {
        let orders = self.orders.read().await;
        let record = orders.get(&order).ok_or(StoreError::OrderNotFound(order))?;
        Ok(record.order.get_meta(key).map(str::to_string))
    }

    async fn update_meta(
        &self,
        order: OrderId,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let record = orders
            .get_mut(&order)
            .ok_or(StoreError::OrderNotFound(order))?;
        record.order.set_meta(key, value);
        Ok(())
    }

    async fn status(&self, order: OrderId) -> Result<OrderStatus, StoreError> {
        let orders = self.orders.read().await;
        let record = orders.get(&order).ok_or(StoreError::OrderNotFound(order))?;
        Ok(record.order.status)
    }

    async fn set_status(&self, order: OrderId, status: OrderStatus) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let record = orders
            .get_mut(&order)
            .ok_or(StoreError::OrderNotFound(order))?;
        record.order.update_status(status);
        Ok(())
    }

    async fn payment_complete(&self, order: OrderId) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let record = orders
            .get_mut(&order)
            .ok_or(StoreError::OrderNotFound(order))?;
        let next = if record.order.needs_processing {
            OrderStatus::Processing
        } else {
            OrderStatus::Completed
        };
        record.order.update_status(next);
        Ok(())
    }

    async fn append_note(&self, order: OrderId, text: &str) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let record = orders
            .get_mut(&order)
            .ok_or(StoreError::OrderNotFound(order))?;
        record.notes.push(text.to_string());
        Ok(())
    }

    async fn total_minor(&self, order: OrderId) -> Result<i64, StoreError> {
        let orders = self.orders.read().await;
        let record = orders.get(&order).ok_or(StoreError::OrderNotFound(order))?;
        Ok(record.order.total_minor)
    }

    async fn currency(&self, order: OrderId) -> Result<String, StoreError> {
        let orders = self.orders.read().await;
        let record = orders.get(&order).ok_or(StoreError::OrderNotFound(order))?;
        Ok(record.order.currency.clone())
    }

    async fn payment_method(&self, order: OrderId) -> Result<String, StoreError> {
        let orders = self.orders.read().await;
        let record = orders.get(&order).ok_or(StoreError::OrderNotFound(order))?;
        Ok(record.order.payment_method.clone())
    }

    async fn line_items(&self, order: OrderId) -> Result<Vec<LineItem>, StoreError> {
        let orders = self.orders.read().await;
        let record = orders.get(&order).ok_or(StoreError::OrderNotFound(order))?;
        Ok(record.order.line_items.clone())
    }

    async fn shipping_info(&self, order: OrderId) -> Result<ShippingInfo, StoreError> {
        let orders = self.orders.read().await;
        let record = orders.get(&order).ok_or(StoreError::OrderNotFound(order))?;
        Ok(record.order.shipping.clone())
    }
}

/// In-memory user-to-customer mapping.
#[derive(Default)]
pub struct MemoryCustomerStore {
    customers: Mutex<HashMap<String, String>>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a mapping.
    pub async fn insert_mapping(&self, user_id: &str, customer_id: &str) {
        self.customers
            .lock()
            .await
            .insert(user_id.to_string(), customer_id.to_string());
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn customer_id_for_user(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.customers.lock().await.get(user_id).cloned())
    }

    async fn create_customer_for_user(&self, user_id: &str) -> Result<String, StoreError> {
        let mut customers = self.customers.lock().await;
        let customer_id = format!("cus_{}", customers.len() + 1);
        customers.insert(user_id.to_string(), customer_id.clone());
        Ok(customer_id)
    }
}

/// In-memory saved payment methods.
#[derive(Default)]
pub struct MemoryTokenStore {
    saved: Mutex<Vec<(String, String)>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(user_id, payment_method_id)` pairs saved so far.
    pub async fn saved(&self) -> Vec<(String, String)> {
        self.saved.lock().await.clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save_payment_method(
        &self,
        user_id: &str,
        payment_method_id: &str,
    ) -> Result<(), StoreError> {
        self.saved
            .lock()
            .await
            .push((user_id.to_string(), payment_method_id.to_string()));
        Ok(())
    }
}
