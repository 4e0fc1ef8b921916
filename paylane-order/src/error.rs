use paylane_core::gateway::ApiError;
use paylane_core::repository::StoreError;

/// Failure of a lifecycle operation, reported to the caller only after
/// the audit note has been appended to the order.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Refund requested for a payment that was never captured. No remote
    /// call is made; the authorization must be cancelled instead.
    #[error("the payment has not been captured yet and cannot be refunded; cancel the authorization instead")]
    UncapturedPayment,

    /// The remote payments service rejected or failed the call. Displays
    /// the service's message verbatim.
    #[error("{0}")]
    Remote(#[from] ApiError),

    /// The authorization was found canceled remotely while handling a
    /// failed call. Displays the original failure message, not the
    /// discovery.
    #[error("{0}")]
    IntentExpired(String),

    /// The order has no remote payment on record to operate on.
    #[error("order has no payment on record")]
    MissingPayment,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PaymentError {
    /// Stable machine-readable code for REST-style callers.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::UncapturedPayment => "uncaptured-payment",
            PaymentError::Remote(_) => "remote-api-error",
            PaymentError::IntentExpired(_) => "intent-expired",
            PaymentError::MissingPayment => "missing-payment",
            PaymentError::Store(_) => "order-store-error",
        }
    }
}
