use std::sync::Arc;

use paylane_core::gateway::PaymentsApi;
use paylane_core::intent::{IntentStatus, Refund};
use paylane_core::order::{meta, OrderId};
use paylane_core::repository::OrderStore;
use tracing::{error, info};

use crate::error::PaymentError;
use crate::lock::OrderLocks;
use crate::notes::{note_currency, OrderEvent};

/// Drives the refund of a captured payment end to end.
///
/// Refunds never move the order status; capture and cancellation are the
/// only operations that do.
pub struct RefundService {
    api: Arc<dyn PaymentsApi>,
    orders: Arc<dyn OrderStore>,
    locks: Arc<OrderLocks>,
}

impl RefundService {
    pub fn new(
        api: Arc<dyn PaymentsApi>,
        orders: Arc<dyn OrderStore>,
        locks: Arc<OrderLocks>,
    ) -> Self {
        Self { api, orders, locks }
    }

    /// Refund `amount_minor` of the order's captured charge.
    ///
    /// A payment still waiting for capture has no charge to refund; that
    /// is rejected up front without a remote call.
    pub async fn refund(
        &self,
        order: OrderId,
        amount_minor: i64,
        reason: Option<&str>,
    ) -> Result<Refund, PaymentError> {
        let _guard = self.locks.acquire(order).await;

        let stored_status = self
            .orders
            .get_meta(order, meta::INTENTION_STATUS)
            .await?
            .as_deref()
            .and_then(IntentStatus::parse);
        if stored_status == Some(IntentStatus::RequiresCapture) {
            return Err(PaymentError::UncapturedPayment);
        }

        let charge_id = self
            .orders
            .get_meta(order, meta::CHARGE_ID)
            .await?
            .ok_or(PaymentError::MissingPayment)?;

        match self.api.refund_charge(&charge_id, amount_minor, reason).await {
            Ok(refund) => {
                // The refund's own amount and currency are the remote
                // truth; quote those in the note.
                self.orders
                    .append_note(
                        order,
                        &OrderEvent::RefundProcessed {
                            amount_minor: refund.amount_minor,
                            currency: &refund.currency,
                            reason,
                        }
                        .to_string(),
                    )
                    .await?;
                info!(%order, charge = %charge_id, refund = %refund.id, "refund processed");
                Ok(refund)
            }
            Err(err) => {
                let currency = note_currency(self.orders.as_ref(), order).await?;
                self.orders
                    .append_note(
                        order,
                        &OrderEvent::RefundFailed {
                            amount_minor,
                            currency: &currency,
                            message: &err.message,
                        }
                        .to_string(),
                    )
                    .await?;
                error!(%order, charge = %charge_id, error = %err, "refund failed");
                Err(PaymentError::Remote(err))
            }
        }
    }
}
