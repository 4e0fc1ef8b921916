use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a remote payment intent, as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

impl IntentStatus {
    /// Wire-format name. Also what gets persisted to order meta.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Succeeded => "succeeded",
        }
    }

    /// Parse a wire-format name back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "requires_payment_method" => Some(IntentStatus::RequiresPaymentMethod),
            "requires_confirmation" => Some(IntentStatus::RequiresConfirmation),
            "requires_action" => Some(IntentStatus::RequiresAction),
            "processing" => Some(IntentStatus::Processing),
            "requires_capture" => Some(IntentStatus::RequiresCapture),
            "canceled" => Some(IntentStatus::Canceled),
            "succeeded" => Some(IntentStatus::Succeeded),
            _ => None,
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot of a remote payment intent.
///
/// The intent is created and owned by the payments service; this side only
/// reads it and requests transitions (capture, cancel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount_minor: i64,
    /// Lowercase ISO 4217 code. Empty when the service omitted it.
    pub currency: String,
    pub customer: Option<String>,
    pub payment_method: Option<String>,
    pub created: DateTime<Utc>,
    pub status: IntentStatus,
    pub charge_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Status of a remote refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Succeeded,
    Failed,
    Canceled,
}

/// Result of a refund request. Created by the remote side, never mutated
/// here; every refund request creates a new remote resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub charge_id: String,
    pub status: RefundStatus,
    pub failure_reason: Option<String>,
}

/// Snapshot of a setup intent, used when saving a payment method outside
/// a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupIntent {
    pub id: String,
    pub status: IntentStatus,
    pub payment_method: Option<String>,
}
