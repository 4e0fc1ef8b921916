use paylane_core::intent::IntentStatus;
use paylane_core::order::OrderStatus;

/// What a remote intent status means for the local order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMapping {
    /// Terminal success: funds are captured and the order is paid. The
    /// order store decides between `Processing` and `Completed`.
    PaymentComplete,

    /// The capture had no effect; the authorization is still open and the
    /// order stays on hold.
    StillAuthorized,

    /// The authorization expired or was cancelled remotely; the order is
    /// cancelled.
    Expired,

    /// Anything else: leave the order alone and report the operation as
    /// failed with the raw status.
    Unrecognized,
}

impl StatusMapping {
    /// Local order status this mapping drives, if any.
    pub fn order_status(&self) -> Option<OrderStatus> {
        match self {
            StatusMapping::PaymentComplete => Some(OrderStatus::Processing),
            StatusMapping::StillAuthorized => Some(OrderStatus::OnHold),
            StatusMapping::Expired => Some(OrderStatus::Cancelled),
            StatusMapping::Unrecognized => None,
        }
    }

    pub fn is_terminal_success(&self) -> bool {
        matches!(self, StatusMapping::PaymentComplete)
    }

    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, StatusMapping::Expired)
    }
}

/// Map a remote intent status to its local meaning.
///
/// Pure and deterministic; an absent intent maps to `Unrecognized`.
pub fn map_intent_status(status: Option<IntentStatus>) -> StatusMapping {
    match status {
        Some(IntentStatus::Succeeded) => StatusMapping::PaymentComplete,
        Some(IntentStatus::RequiresCapture) => StatusMapping::StillAuthorized,
        Some(IntentStatus::Canceled) => StatusMapping::Expired,
        _ => StatusMapping::Unrecognized,
    }
}
