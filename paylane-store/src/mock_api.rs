use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use paylane_core::gateway::{ApiError, Level3Data, PaymentsApi};
use paylane_core::intent::{PaymentIntent, Refund, SetupIntent};

/// Scripted payments client for tests and local composition: queued
/// responses per method, recorded calls. An unscripted call fails with a
/// recognizable error instead of inventing remote state.
#[derive(Default)]
pub struct MockPaymentsApi {
    capture: Mutex<VecDeque<Result<PaymentIntent, ApiError>>>,
    cancel: Mutex<VecDeque<Result<PaymentIntent, ApiError>>>,
    get: Mutex<VecDeque<Result<PaymentIntent, ApiError>>>,
    refund: Mutex<VecDeque<Result<Refund, ApiError>>>,
    setup_create: Mutex<VecDeque<Result<SetupIntent, ApiError>>>,
    setup_get: Mutex<VecDeque<Result<SetupIntent, ApiError>>>,
    calls: Mutex<Vec<String>>,
    capture_requests: Mutex<Vec<(String, i64, Option<Level3Data>)>>,
}

impl MockPaymentsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_capture(&self, response: Result<PaymentIntent, ApiError>) {
        self.capture.lock().unwrap().push_back(response);
    }

    pub fn push_cancel(&self, response: Result<PaymentIntent, ApiError>) {
        self.cancel.lock().unwrap().push_back(response);
    }

    pub fn push_get_intent(&self, response: Result<PaymentIntent, ApiError>) {
        self.get.lock().unwrap().push_back(response);
    }

    pub fn push_refund(&self, response: Result<Refund, ApiError>) {
        self.refund.lock().unwrap().push_back(response);
    }

    pub fn push_setup_create(&self, response: Result<SetupIntent, ApiError>) {
        self.setup_create.lock().unwrap().push_back(response);
    }

    pub fn push_setup_get(&self, response: Result<SetupIntent, ApiError>) {
        self.setup_get.lock().unwrap().push_back(response);
    }

    /// Method names invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of every capture request seen so far.
    pub fn capture_requests(&self) -> Vec<(String, i64, Option<Level3Data>)> {
        self.capture_requests.lock().unwrap().clone()
    }

    fn record(&self, method: &str) {
        self.calls.lock().unwrap().push(method.to_string());
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>, method: &str) -> Result<T, ApiError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::new(format!("no scripted response for {}", method), "mock", 500)))
    }
}

#[async_trait]
impl PaymentsApi for MockPaymentsApi {
    async fn capture_intention(
        &self,
        intent_id: &str,
        amount_minor: i64,
        level3: Option<Level3Data>,
    ) -> Result<PaymentIntent, ApiError> {
        self.record("capture_intention");
        self.capture_requests.lock().unwrap().push((
            intent_id.to_string(),
            amount_minor,
            level3,
        ));
        Self::next(&self.capture, "capture_intention")
    }

    async fn cancel_intention(&self, _intent_id: &str) -> Result<PaymentIntent, ApiError> {
        self.record("cancel_intention");
        Self::next(&self.cancel, "cancel_intention")
    }

    async fn get_intent(&self, _intent_id: &str) -> Result<PaymentIntent, ApiError> {
        self.record("get_intent");
        Self::next(&self.get, "get_intent")
    }

    async fn refund_charge(
        &self,
        _charge_id: &str,
        _amount_minor: i64,
        _reason: Option<&str>,
    ) -> Result<Refund, ApiError> {
        self.record("refund_charge");
        Self::next(&self.refund, "refund_charge")
    }

    async fn create_and_confirm_setup_intent(
        &self,
        _payment_method: &str,
        _customer: &str,
    ) -> Result<SetupIntent, ApiError> {
        self.record("create_and_confirm_setup_intent");
        Self::next(&self.setup_create, "create_and_confirm_setup_intent")
    }

    async fn get_setup_intent(&self, _setup_intent_id: &str) -> Result<SetupIntent, ApiError> {
        self.record("get_setup_intent");
        Self::next(&self.setup_get, "get_setup_intent")
    }
}
