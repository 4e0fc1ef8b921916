use std::sync::Arc;

use paylane_core::gateway::{ApiError, PaymentsApi};
use paylane_core::intent::{IntentStatus, SetupIntent};
use paylane_core::repository::{CustomerStore, StoreError, TokenStore};
use tracing::info;

/// Failure while saving a payment method.
#[derive(Debug, thiserror::Error)]
pub enum PaymentMethodError {
    #[error("the user has no gateway customer on record")]
    NoCustomer,

    #[error("the setup intent did not succeed (status: {0})")]
    SetupIncomplete(IntentStatus),

    #[error("the setup intent has no payment method attached")]
    NoPaymentMethod,

    #[error("{0}")]
    Remote(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Saves customer payment methods for later reuse, through setup
/// intents confirmed off-session.
pub struct PaymentMethodService {
    api: Arc<dyn PaymentsApi>,
    customers: Arc<dyn CustomerStore>,
    tokens: Arc<dyn TokenStore>,
}

impl PaymentMethodService {
    pub fn new(
        api: Arc<dyn PaymentsApi>,
        customers: Arc<dyn CustomerStore>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            api,
            customers,
            tokens,
        }
    }

    /// Create and confirm a setup intent for `user_id`, creating the
    /// remote customer first when none exists yet.
    pub async fn create_and_confirm_setup_intent(
        &self,
        user_id: &str,
        payment_method: &str,
    ) -> Result<SetupIntent, PaymentMethodError> {
        let customer = match self.customers.customer_id_for_user(user_id).await? {
            Some(id) => id,
            None => self.customers.create_customer_for_user(user_id).await?,
        };

        Ok(self
            .api
            .create_and_confirm_setup_intent(payment_method, &customer)
            .await?)
    }

    /// Persist the payment method behind a succeeded setup intent.
    ///
    /// Users without a customer are rejected before any remote call; a
    /// setup intent in any state but `succeeded` is never saved.
    pub async fn save_from_setup_intent(
        &self,
        user_id: &str,
        setup_intent_id: &str,
    ) -> Result<String, PaymentMethodError> {
        if self
            .customers
            .customer_id_for_user(user_id)
            .await?
            .is_none()
        {
            return Err(PaymentMethodError::NoCustomer);
        }

        let setup_intent = self.api.get_setup_intent(setup_intent_id).await?;
        if setup_intent.status != IntentStatus::Succeeded {
            return Err(PaymentMethodError::SetupIncomplete(setup_intent.status));
        }

        let payment_method = setup_intent
            .payment_method
            .ok_or(PaymentMethodError::NoPaymentMethod)?;
        self.tokens
            .save_payment_method(user_id, &payment_method)
            .await?;
        info!(user = user_id, "payment method saved");
        Ok(payment_method)
    }
}
