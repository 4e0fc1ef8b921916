use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::intent::{PaymentIntent, Refund, SetupIntent};

/// Typed failure from the remote payments service.
///
/// `message` is the human-readable failure text, surfaced verbatim to
/// callers and order notes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    /// Machine code reported by the service, e.g. "server_error".
    pub code: String,
    pub http_status: u16,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: impl Into<String>, http_status: u16) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            http_status,
        }
    }
}

/// Level-3 card data attached to a capture request to reduce processing
/// risk and cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level3Data {
    pub merchant_reference: String,
    /// Shipping total plus shipping tax, minor units.
    pub shipping_amount: i64,
    pub line_items: Vec<Level3LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_from_zip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level3LineItem {
    /// Product id, or "fee" for fee lines.
    pub product_code: String,
    pub product_description: String,
    /// Per-unit cost before discounts, minor units.
    pub unit_cost: i64,
    pub quantity: u32,
    pub tax_amount: i64,
    pub discount_amount: i64,
}

/// Client for the remote payments service.
///
/// Every call is a full round trip; failures carry the service's own
/// message, code and HTTP-like status.
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    /// Capture a previously authorized intent.
    async fn capture_intention(
        &self,
        intent_id: &str,
        amount_minor: i64,
        level3: Option<Level3Data>,
    ) -> Result<PaymentIntent, ApiError>;

    /// Cancel an authorized intent.
    async fn cancel_intention(&self, intent_id: &str) -> Result<PaymentIntent, ApiError>;

    /// Fetch the current remote state of an intent.
    async fn get_intent(&self, intent_id: &str) -> Result<PaymentIntent, ApiError>;

    /// Refund a captured charge. Each request creates a new remote refund.
    async fn refund_charge(
        &self,
        charge_id: &str,
        amount_minor: i64,
        reason: Option<&str>,
    ) -> Result<Refund, ApiError>;

    /// Create a setup intent for saving a payment method, and confirm it.
    async fn create_and_confirm_setup_intent(
        &self,
        payment_method: &str,
        customer: &str,
    ) -> Result<SetupIntent, ApiError>;

    /// Fetch a setup intent.
    async fn get_setup_intent(&self, setup_intent_id: &str) -> Result<SetupIntent, ApiError>;
}
