use std::collections::HashMap;
use std::sync::Arc;

use paylane_core::order::OrderId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-order mutual exclusion for lifecycle operations.
///
/// Two concurrent captures on the same order must not race past the
/// precondition checks and double-capture remotely; operations on
/// distinct orders stay concurrent. Entries are never evicted; the map
/// grows with the set of orders operated on, one tiny mutex each.
#[derive(Default)]
pub struct OrderLocks {
    locks: Mutex<HashMap<OrderId, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `order`, waiting behind any in-flight
    /// operation on the same order. The guard is held for the whole
    /// operation, including the remote round trip.
    pub async fn acquire(&self, order: OrderId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(order)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
