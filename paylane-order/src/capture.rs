use std::sync::Arc;

use paylane_core::gateway::{ApiError, Level3Data, PaymentsApi};
use paylane_core::intent::IntentStatus;
use paylane_core::order::{meta, OrderId, OrderStatus};
use paylane_core::repository::{OrderStore, StoreError};
use tracing::{debug, info, warn};

use crate::error::PaymentError;
use crate::level3;
use crate::lock::OrderLocks;
use crate::notes::{note_currency, OrderEvent};
use crate::settings::GatewaySettings;
use crate::status::{map_intent_status, StatusMapping};

/// Outcome of a capture attempt, consumed by admin surfaces.
///
/// Failures are reported through `PaymentError`; the error's display text
/// is the remote failure message verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub status: IntentStatus,
    pub intent_id: String,
}

/// Drives the capture of an authorized payment end to end: remote call,
/// state mapping, order-store writes and the audit note.
pub struct CaptureService {
    api: Arc<dyn PaymentsApi>,
    orders: Arc<dyn OrderStore>,
    locks: Arc<OrderLocks>,
    settings: GatewaySettings,
}

impl CaptureService {
    pub fn new(
        api: Arc<dyn PaymentsApi>,
        orders: Arc<dyn OrderStore>,
        locks: Arc<OrderLocks>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            api,
            orders,
            locks,
            settings,
        }
    }

    /// Capture the authorized intent behind `order`.
    ///
    /// By the time this returns, the order's status, `intention_status`
    /// meta and note trail agree with the returned outcome: the caller
    /// never observes a half-applied capture.
    pub async fn capture(&self, order: OrderId) -> Result<CaptureOutcome, PaymentError> {
        let _guard = self.locks.acquire(order).await;

        let intent_id = self
            .orders
            .get_meta(order, meta::INTENT_ID)
            .await?
            .ok_or(PaymentError::MissingPayment)?;

        // Re-invoked on an already-captured order: nothing to do remotely,
        // and no duplicate note.
        let stored_status = self
            .orders
            .get_meta(order, meta::INTENTION_STATUS)
            .await?
            .as_deref()
            .and_then(IntentStatus::parse);
        if stored_status == Some(IntentStatus::Succeeded) {
            info!(%order, intent = %intent_id, "capture skipped, intent already captured");
            return Ok(CaptureOutcome {
                status: IntentStatus::Succeeded,
                intent_id,
            });
        }

        let amount = self.orders.total_minor(order).await?;
        let level3 = self.level3_data(order).await?;

        match self
            .api
            .capture_intention(&intent_id, amount, level3)
            .await
        {
            Ok(intent) => {
                self.apply_capture_response(order, &intent_id, amount, intent.status, &intent.currency)
                    .await
            }
            Err(primary) => {
                self.reconcile_failed_capture(order, &intent_id, amount, primary)
                    .await
            }
        }
    }

    /// The capture call answered; persist what it said.
    async fn apply_capture_response(
        &self,
        order: OrderId,
        intent_id: &str,
        amount: i64,
        status: IntentStatus,
        intent_currency: &str,
    ) -> Result<CaptureOutcome, PaymentError> {
        self.orders
            .update_meta(order, meta::INTENTION_STATUS, status.as_str())
            .await?;

        // Notes quote the intent's own currency; the stored intent
        // currency, then the order currency, stand in when absent.
        let currency = if intent_currency.is_empty() {
            note_currency(self.orders.as_ref(), order).await?
        } else {
            intent_currency.to_string()
        };

        match map_intent_status(Some(status)) {
            StatusMapping::PaymentComplete => {
                self.orders.payment_complete(order).await?;
                self.orders
                    .append_note(
                        order,
                        &OrderEvent::CaptureSucceeded {
                            amount_minor: amount,
                            currency: &currency,
                            intent_id,
                        }
                        .to_string(),
                    )
                    .await?;
                info!(%order, intent = %intent_id, "payment captured");
            }
            StatusMapping::Expired => {
                // The service itself reported the intent canceled; local
                // state follows remote truth.
                self.orders
                    .set_status(order, OrderStatus::Cancelled)
                    .await?;
                self.orders
                    .append_note(
                        order,
                        &OrderEvent::AuthorizationExpired { intent_id }.to_string(),
                    )
                    .await?;
                warn!(%order, intent = %intent_id, "capture found the authorization expired");
            }
            StatusMapping::StillAuthorized | StatusMapping::Unrecognized => {
                self.orders
                    .append_note(
                        order,
                        &OrderEvent::CaptureIneffective {
                            amount_minor: amount,
                            currency: &currency,
                        }
                        .to_string(),
                    )
                    .await?;
                warn!(%order, intent = %intent_id, status = %status, "capture had no effect");
            }
        }

        Ok(CaptureOutcome {
            status,
            intent_id: intent_id.to_string(),
        })
    }

    /// The capture call failed; the intent may still have moved
    /// server-side. Re-fetch it to reconcile, without ever letting the
    /// secondary failure mask the primary one.
    async fn reconcile_failed_capture(
        &self,
        order: OrderId,
        intent_id: &str,
        amount: i64,
        primary: ApiError,
    ) -> Result<CaptureOutcome, PaymentError> {
        warn!(%order, intent = %intent_id, error = %primary, "capture request failed, re-fetching intent");

        let refetched = match self.api.get_intent(intent_id).await {
            Ok(intent) => Some(intent.status),
            Err(secondary) => {
                debug!(%order, error = %secondary, "intent re-fetch failed, keeping primary error");
                None
            }
        };

        if let Some(status) = refetched {
            self.orders
                .update_meta(order, meta::INTENTION_STATUS, status.as_str())
                .await?;
        }

        if map_intent_status(refetched).is_terminal_failure() {
            // Remote truth: the authorization is gone. Local state must
            // not contradict it, even though the triggering call failed.
            self.orders
                .set_status(order, OrderStatus::Cancelled)
                .await?;
            self.orders
                .append_note(
                    order,
                    &OrderEvent::AuthorizationExpired { intent_id }.to_string(),
                )
                .await?;
            return Err(PaymentError::IntentExpired(primary.message));
        }

        let currency = note_currency(self.orders.as_ref(), order).await?;
        self.orders
            .append_note(
                order,
                &OrderEvent::CaptureFailed {
                    amount_minor: amount,
                    currency: &currency,
                    message: &primary.message,
                }
                .to_string(),
            )
            .await?;
        Err(PaymentError::Remote(primary))
    }

    async fn level3_data(&self, order: OrderId) -> Result<Option<Level3Data>, StoreError> {
        let items = self.orders.line_items(order).await?;
        let shipping = self.orders.shipping_info(order).await?;
        Ok(level3::build(&self.settings, order, &items, &shipping))
    }
}
