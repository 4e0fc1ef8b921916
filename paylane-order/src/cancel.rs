use std::sync::Arc;

use paylane_core::gateway::{ApiError, PaymentsApi};
use paylane_core::intent::IntentStatus;
use paylane_core::order::{meta, OrderId, OrderStatus};
use paylane_core::repository::OrderStore;
use tracing::{debug, info, warn};

use crate::error::PaymentError;
use crate::lock::OrderLocks;
use crate::notes::OrderEvent;

/// Drives the cancellation of a payment authorization.
pub struct CancellationService {
    api: Arc<dyn PaymentsApi>,
    orders: Arc<dyn OrderStore>,
    locks: Arc<OrderLocks>,
}

impl CancellationService {
    pub fn new(
        api: Arc<dyn PaymentsApi>,
        orders: Arc<dyn OrderStore>,
        locks: Arc<OrderLocks>,
    ) -> Self {
        Self { api, orders, locks }
    }

    /// Cancel the authorization behind `order`.
    ///
    /// The order is reconciled to `Cancelled` whenever the remote side is
    /// known to have cancelled the intent, even when the triggering call
    /// failed; otherwise the order is left untouched and the original
    /// failure is returned after the audit note.
    pub async fn cancel_authorization(&self, order: OrderId) -> Result<(), PaymentError> {
        let _guard = self.locks.acquire(order).await;

        let intent_id = self
            .orders
            .get_meta(order, meta::INTENT_ID)
            .await?
            .ok_or(PaymentError::MissingPayment)?;

        match self.api.cancel_intention(&intent_id).await {
            Ok(_) => {
                self.mark_cancelled(order, &intent_id).await?;
                info!(%order, intent = %intent_id, "authorization cancelled");
                Ok(())
            }
            Err(primary) => {
                warn!(%order, intent = %intent_id, error = %primary, "cancel request failed, re-fetching intent");

                // The intent may already be gone remotely; a re-fetch
                // failure is discarded, never reported over the primary.
                match self.api.get_intent(&intent_id).await {
                    Ok(intent) if intent.status == IntentStatus::Canceled => {
                        self.mark_cancelled(order, &intent_id).await?;
                        info!(%order, intent = %intent_id, "authorization already cancelled remotely");
                        Ok(())
                    }
                    Ok(intent) => {
                        debug!(%order, status = %intent.status, "intent not cancelled remotely");
                        self.note_failure(order, &primary).await?;
                        Err(PaymentError::Remote(primary))
                    }
                    Err(secondary) => {
                        debug!(%order, error = %secondary, "intent re-fetch failed, keeping primary error");
                        self.note_failure(order, &primary).await?;
                        Err(PaymentError::Remote(primary))
                    }
                }
            }
        }
    }

    async fn mark_cancelled(&self, order: OrderId, intent_id: &str) -> Result<(), PaymentError> {
        self.orders
            .update_meta(order, meta::INTENTION_STATUS, IntentStatus::Canceled.as_str())
            .await?;
        self.orders
            .set_status(order, OrderStatus::Cancelled)
            .await?;
        self.orders
            .append_note(
                order,
                &OrderEvent::AuthorizationCancelled { intent_id }.to_string(),
            )
            .await?;
        Ok(())
    }

    async fn note_failure(&self, order: OrderId, primary: &ApiError) -> Result<(), PaymentError> {
        self.orders
            .append_note(
                order,
                &OrderEvent::CancellationFailed {
                    message: &primary.message,
                }
                .to_string(),
            )
            .await?;
        Ok(())
    }
}
