use std::fmt;

use paylane_core::money::format_amount;
use paylane_core::order::{meta, OrderId};
use paylane_core::repository::{OrderStore, StoreError};

/// Lifecycle transitions that leave an audit note on the order.
///
/// One template per event, resolved here instead of interpolated at the
/// call sites. Notes are the durable record of what was attempted and
/// what failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEvent<'a> {
    CaptureSucceeded {
        amount_minor: i64,
        currency: &'a str,
        intent_id: &'a str,
    },
    CaptureIneffective {
        amount_minor: i64,
        currency: &'a str,
    },
    CaptureFailed {
        amount_minor: i64,
        currency: &'a str,
        message: &'a str,
    },
    AuthorizationExpired {
        intent_id: &'a str,
    },
    AuthorizationCancelled {
        intent_id: &'a str,
    },
    CancellationFailed {
        message: &'a str,
    },
    RefundProcessed {
        amount_minor: i64,
        currency: &'a str,
        reason: Option<&'a str>,
    },
    RefundFailed {
        amount_minor: i64,
        currency: &'a str,
        message: &'a str,
    },
}

impl fmt::Display for OrderEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderEvent::CaptureSucceeded {
                amount_minor,
                currency,
                intent_id,
            } => write!(
                f,
                "A payment of {} was successfully captured ({}).",
                format_amount(*amount_minor, currency),
                intent_id
            ),
            OrderEvent::CaptureIneffective {
                amount_minor,
                currency,
            } => write!(
                f,
                "A capture of {} failed to complete.",
                format_amount(*amount_minor, currency)
            ),
            OrderEvent::CaptureFailed {
                amount_minor,
                currency,
                message,
            } => write!(
                f,
                "A capture of {} failed to complete with the following message: {}",
                format_amount(*amount_minor, currency),
                message
            ),
            OrderEvent::AuthorizationExpired { intent_id } => write!(
                f,
                "The payment authorization has expired and the order was cancelled ({}).",
                intent_id
            ),
            OrderEvent::AuthorizationCancelled { intent_id } => write!(
                f,
                "The payment authorization was successfully cancelled ({}).",
                intent_id
            ),
            OrderEvent::CancellationFailed { message } => write!(
                f,
                "Cancelling the authorization failed with the following message: {}",
                message
            ),
            OrderEvent::RefundProcessed {
                amount_minor,
                currency,
                reason,
            } => {
                write!(
                    f,
                    "A refund of {} was successfully processed.",
                    format_amount(*amount_minor, currency)
                )?;
                if let Some(reason) = reason {
                    write!(f, " Reason: {}", reason)?;
                }
                Ok(())
            }
            OrderEvent::RefundFailed {
                amount_minor,
                currency,
                message,
            } => write!(
                f,
                "A refund of {} failed to complete: {}",
                format_amount(*amount_minor, currency),
                message
            ),
        }
    }
}

/// Currency used for note amounts when no fresh remote snapshot provides
/// one: the currency recorded when the intent was created, then the
/// order's own currency.
pub(crate) async fn note_currency(
    orders: &dyn OrderStore,
    order: OrderId,
) -> Result<String, StoreError> {
    if let Some(currency) = orders.get_meta(order, meta::INTENT_CURRENCY).await? {
        if !currency.is_empty() {
            return Ok(currency);
        }
    }
    orders.currency(order).await
}
