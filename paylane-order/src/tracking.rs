use std::sync::Arc;

use chrono::Utc;
use paylane_core::order::{meta, OrderId};
use paylane_core::repository::{JobScheduler, OrderStore};
use serde_json::json;
use tracing::info;

use crate::error::PaymentError;
use crate::settings::GatewaySettings;

/// Hook fired the first time an order is reported to the fraud service.
pub const TRACK_NEW_ORDER_HOOK: &str = "track_new_order";
/// Hook fired for subsequent updates of an already-reported order.
pub const TRACK_UPDATE_ORDER_HOOK: &str = "track_update_order";

/// Queues fraud-signal tracking jobs for orders paid through this
/// gateway.
pub struct TrackingService {
    orders: Arc<dyn OrderStore>,
    scheduler: Arc<dyn JobScheduler>,
    settings: GatewaySettings,
}

impl TrackingService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        scheduler: Arc<dyn JobScheduler>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            orders,
            scheduler,
            settings,
        }
    }

    /// Schedule a tracking job for `order`, when applicable.
    ///
    /// Orders paid through another gateway, accounts without the sift
    /// fraud service, and orders with no recorded payment method are all
    /// skipped silently.
    pub async fn schedule_order_tracking(&self, order: OrderId) -> Result<(), PaymentError> {
        if self.orders.payment_method(order).await? != self.settings.gateway_id {
            return Ok(());
        }

        if !self.settings.sift_enabled() {
            return Ok(());
        }

        let payment_method_id = match self
            .orders
            .get_meta(order, meta::PAYMENT_METHOD_ID)
            .await?
        {
            Some(id) => id,
            None => {
                info!(%order, "order tracking skipped, no payment method id");
                return Ok(());
            }
        };

        let already_tracked = self
            .orders
            .get_meta(order, meta::TRACKING_COMPLETE)
            .await?
            .as_deref()
            == Some("yes");
        let hook = if already_tracked {
            TRACK_UPDATE_ORDER_HOOK
        } else {
            TRACK_NEW_ORDER_HOOK
        };

        self.scheduler
            .schedule(
                hook,
                Utc::now(),
                json!({
                    "order_id": order,
                    "payment_method_id": payment_method_id,
                }),
            )
            .await?;
        self.orders
            .update_meta(order, meta::TRACKING_COMPLETE, "yes")
            .await?;
        info!(%order, hook, "order tracking scheduled");
        Ok(())
    }
}
