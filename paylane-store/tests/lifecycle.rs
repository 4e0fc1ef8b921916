use std::sync::Arc;

use paylane_core::gateway::ApiError;
use paylane_core::intent::{IntentStatus, PaymentIntent, Refund, RefundStatus};
use paylane_core::order::{meta, LineItem, Order, OrderStatus, ShippingInfo};
use paylane_core::repository::OrderStore;
use paylane_order::{
    CancellationService, CaptureService, GatewaySettings, OrderLocks, PaymentError, RefundService,
};
use paylane_store::{MemoryOrderStore, MockPaymentsApi};

const INTENT_ID: &str = "pi_xxxxxxxxxxxxx";
const CHARGE_ID: &str = "ch_yyyyyyyyyyyyy";

fn authorized_order() -> Order {
    let mut order = Order::new("usd", 1500);
    order.status = OrderStatus::OnHold;
    order.payment_method = "paylane".to_string();
    order.set_meta(meta::INTENT_ID, INTENT_ID);
    order.set_meta(meta::CHARGE_ID, CHARGE_ID);
    order.set_meta(meta::INTENTION_STATUS, "requires_capture");
    order
}

fn intent(status: IntentStatus, currency: &str) -> PaymentIntent {
    PaymentIntent {
        id: INTENT_ID.to_string(),
        amount_minor: 1500,
        currency: currency.to_string(),
        customer: Some("cus_12345".to_string()),
        payment_method: Some("pm_12345".to_string()),
        created: chrono::Utc::now(),
        status,
        charge_id: Some(CHARGE_ID.to_string()),
        client_secret: None,
    }
}

fn refund_response(amount_minor: i64, currency: &str) -> Refund {
    Refund {
        id: "re_123456789".to_string(),
        amount_minor,
        currency: currency.to_string(),
        charge_id: CHARGE_ID.to_string(),
        status: RefundStatus::Succeeded,
        failure_reason: None,
    }
}

fn server_error() -> ApiError {
    ApiError::new("test exception", "server_error", 500)
}

struct Harness {
    api: Arc<MockPaymentsApi>,
    orders: Arc<MemoryOrderStore>,
    capture: Arc<CaptureService>,
    refund: RefundService,
    cancel: CancellationService,
}

fn harness() -> Harness {
    harness_with(GatewaySettings {
        store_postcode: Some("94110".to_string()),
        ..GatewaySettings::default()
    })
}

fn harness_with(settings: GatewaySettings) -> Harness {
    let api = Arc::new(MockPaymentsApi::new());
    let orders = Arc::new(MemoryOrderStore::new());
    let locks = Arc::new(OrderLocks::new());
    Harness {
        capture: Arc::new(CaptureService::new(
            api.clone(),
            orders.clone(),
            locks.clone(),
            settings,
        )),
        refund: RefundService::new(api.clone(), orders.clone(), locks.clone()),
        cancel: CancellationService::new(api.clone(), orders.clone(), locks),
        api,
        orders,
    }
}

fn count(calls: &[String], method: &str) -> usize {
    calls.iter().filter(|c| c.as_str() == method).count()
}

#[tokio::test]
async fn test_capture_success_marks_order_processing() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_capture(Ok(intent(IntentStatus::Succeeded, "usd")));

    let outcome = h.capture.capture(order).await.unwrap();

    assert_eq!(outcome.status, IntentStatus::Succeeded);
    assert_eq!(outcome.intent_id, INTENT_ID);
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::Processing);
    assert_eq!(
        h.orders.get_meta(order, meta::INTENTION_STATUS).await.unwrap(),
        Some("succeeded".to_string())
    );

    let notes = h.orders.notes(order).await;
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("successfully captured"));
    assert!(notes[0].contains("$15.00"));
}

#[tokio::test]
async fn test_capture_success_formats_note_in_intent_currency() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_capture(Ok(intent(IntentStatus::Succeeded, "eur")));

    h.capture.capture(order).await.unwrap();

    let notes = h.orders.notes(order).await;
    assert!(notes[0].contains("€15.00"));
}

#[tokio::test]
async fn test_capture_success_falls_back_to_stored_currency_when_intent_has_none() {
    let h = harness();
    let mut order = authorized_order();
    order.set_meta(meta::INTENT_CURRENCY, "eur");
    let order = h.orders.insert(order).await;
    h.api.push_capture(Ok(intent(IntentStatus::Succeeded, "")));

    h.capture.capture(order).await.unwrap();

    assert!(h.orders.notes(order).await[0].contains("€15.00"));
}

#[tokio::test]
async fn test_capture_completes_order_with_nothing_to_fulfil() {
    let h = harness();
    let mut order = authorized_order();
    order.needs_processing = false;
    let order = h.orders.insert(order).await;
    h.api.push_capture(Ok(intent(IntentStatus::Succeeded, "usd")));

    h.capture.capture(order).await.unwrap();

    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::Completed);
}

#[tokio::test]
async fn test_ineffective_capture_keeps_order_on_hold() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api
        .push_capture(Ok(intent(IntentStatus::RequiresCapture, "eur")));

    let outcome = h.capture.capture(order).await.unwrap();

    assert_eq!(outcome.status, IntentStatus::RequiresCapture);
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::OnHold);
    assert_eq!(
        h.orders.get_meta(order, meta::INTENTION_STATUS).await.unwrap(),
        Some("requires_capture".to_string())
    );

    let notes = h.orders.notes(order).await;
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("failed"));
    assert!(notes[0].contains("€15.00"));
}

#[tokio::test]
async fn test_capture_api_failure_reports_original_error() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_capture(Err(server_error()));
    h.api
        .push_get_intent(Ok(intent(IntentStatus::RequiresCapture, "usd")));

    let err = h.capture.capture(order).await.unwrap_err();

    assert_eq!(err.to_string(), "test exception");
    assert!(matches!(err, PaymentError::Remote(_)));
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::OnHold);
    assert_eq!(
        h.orders.get_meta(order, meta::INTENTION_STATUS).await.unwrap(),
        Some("requires_capture".to_string())
    );

    let notes = h.orders.notes(order).await;
    assert!(notes[0].contains("failed"));
    assert!(notes[0].contains("test exception"));
    assert!(notes[0].contains("$15.00"));
}

#[tokio::test]
async fn test_capture_failure_note_uses_stored_intent_currency() {
    let h = harness();
    let mut order = authorized_order();
    order.set_meta(meta::INTENT_CURRENCY, "eur");
    let order = h.orders.insert(order).await;
    h.api.push_capture(Err(server_error()));
    // The re-fetched intent reports yet another currency; the note still
    // quotes the currency recorded on the order.
    h.api
        .push_get_intent(Ok(intent(IntentStatus::RequiresCapture, "jpy")));

    h.capture.capture(order).await.unwrap_err();

    let notes = h.orders.notes(order).await;
    assert!(notes[0].contains("€15.00"));
    assert!(!notes[0].contains("¥"));
}

#[tokio::test]
async fn test_capture_expired_authorization_cancels_order() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_capture(Err(server_error()));
    h.api.push_get_intent(Ok(intent(IntentStatus::Canceled, "usd")));

    let err = h.capture.capture(order).await.unwrap_err();

    assert!(matches!(err, PaymentError::IntentExpired(_)));
    assert_eq!(err.code(), "intent-expired");
    assert_eq!(err.to_string(), "test exception");
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::Cancelled);
    assert_eq!(
        h.orders.get_meta(order, meta::INTENTION_STATUS).await.unwrap(),
        Some("canceled".to_string())
    );
    assert!(h.orders.notes(order).await[0].contains("expired"));
}

#[tokio::test]
async fn test_capture_refetch_failure_never_masks_primary_error() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_capture(Err(server_error()));
    h.api
        .push_get_intent(Err(ApiError::new("ignore this", "test", 123)));

    let err = h.capture.capture(order).await.unwrap_err();

    assert_eq!(err.to_string(), "test exception");
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::OnHold);

    let notes = h.orders.notes(order).await;
    assert!(notes[0].contains("test exception"));
    assert!(!notes[0].contains("ignore this"));
}

#[tokio::test]
async fn test_capture_without_intent_is_rejected() {
    let h = harness();
    let mut order = authorized_order();
    order.meta.remove(meta::INTENT_ID);
    let order = h.orders.insert(order).await;

    let err = h.capture.capture(order).await.unwrap_err();

    assert!(matches!(err, PaymentError::MissingPayment));
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_recapture_of_captured_order_is_a_noop() {
    let h = harness();
    let mut order = authorized_order();
    order.status = OrderStatus::Processing;
    order.set_meta(meta::INTENTION_STATUS, "succeeded");
    let order = h.orders.insert(order).await;

    let outcome = h.capture.capture(order).await.unwrap();

    assert_eq!(outcome.status, IntentStatus::Succeeded);
    assert!(h.api.calls().is_empty());
    assert!(h.orders.notes(order).await.is_empty());
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::Processing);
}

#[tokio::test]
async fn test_concurrent_captures_reach_the_remote_once() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_capture(Ok(intent(IntentStatus::Succeeded, "usd")));

    let first = {
        let capture = h.capture.clone();
        tokio::spawn(async move { capture.capture(order).await })
    };
    let second = {
        let capture = h.capture.clone();
        tokio::spawn(async move { capture.capture(order).await })
    };
    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(first.status, IntentStatus::Succeeded);
    assert_eq!(second.status, IntentStatus::Succeeded);
    assert_eq!(count(&h.api.calls(), "capture_intention"), 1);
    assert_eq!(h.orders.notes(order).await.len(), 1);
}

#[tokio::test]
async fn test_capture_sends_level3_data_for_us_accounts() {
    let h = harness();
    let mut order = authorized_order();
    order.line_items = vec![LineItem {
        product_id: Some(30),
        name: "Beanie with Logo".to_string(),
        quantity: 1,
        subtotal_minor: 1800,
        total_minor: 1800,
        tax_minor: 270,
    }];
    order.shipping = ShippingInfo {
        total_minor: 3000,
        tax_minor: 800,
        postcode: Some("98012".to_string()),
    };
    let order = h.orders.insert(order).await;
    h.api.push_capture(Ok(intent(IntentStatus::Succeeded, "usd")));

    h.capture.capture(order).await.unwrap();

    let requests = h.api.capture_requests();
    assert_eq!(requests.len(), 1);
    let (intent_id, amount, level3) = &requests[0];
    assert_eq!(intent_id, INTENT_ID);
    assert_eq!(*amount, 1500);
    let level3 = level3.as_ref().unwrap();
    assert_eq!(level3.merchant_reference, order.to_string());
    assert_eq!(level3.shipping_amount, 3800);
    assert_eq!(level3.shipping_address_zip.as_deref(), Some("98012"));
    assert_eq!(level3.shipping_from_zip.as_deref(), Some("94110"));
}

#[tokio::test]
async fn test_capture_sends_no_level3_data_for_non_us_accounts() {
    let h = harness_with(GatewaySettings {
        account_country: "CA".to_string(),
        ..GatewaySettings::default()
    });
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_capture(Ok(intent(IntentStatus::Succeeded, "usd")));

    h.capture.capture(order).await.unwrap();

    assert!(h.api.capture_requests()[0].2.is_none());
}

#[tokio::test]
async fn test_refund_of_uncaptured_payment_is_rejected_without_remote_call() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;

    let err = h.refund.refund(order, 1999, None).await.unwrap_err();

    assert!(matches!(err, PaymentError::UncapturedPayment));
    assert_eq!(err.code(), "uncaptured-payment");
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_refund_success_appends_processed_note() {
    let h = harness();
    let mut order = authorized_order();
    order.status = OrderStatus::Processing;
    order.set_meta(meta::INTENTION_STATUS, "succeeded");
    let order = h.orders.insert(order).await;
    h.api.push_refund(Ok(refund_response(1999, "eur")));

    let refund = h.refund.refund(order, 1999, None).await.unwrap();

    assert_eq!(refund.id, "re_123456789");
    // Refunds never move the order status.
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::Processing);

    let notes = h.orders.notes(order).await;
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("successfully processed"));
    assert!(notes[0].contains("€19.99"));
}

#[tokio::test]
async fn test_refund_with_reason_records_the_reason() {
    let h = harness();
    let mut order = authorized_order();
    order.status = OrderStatus::Processing;
    order.set_meta(meta::INTENTION_STATUS, "succeeded");
    let order = h.orders.insert(order).await;
    h.api.push_refund(Ok(refund_response(1999, "eur")));

    h.refund.refund(order, 1999, Some("some reason")).await.unwrap();

    let notes = h.orders.notes(order).await;
    assert!(notes[0].contains("successfully processed"));
    assert!(notes[0].contains("some reason"));
    assert!(notes[0].contains("€19.99"));
}

#[tokio::test]
async fn test_refund_api_failure_notes_and_surfaces_the_error() {
    let h = harness();
    let mut order = authorized_order();
    order.status = OrderStatus::Processing;
    order.set_meta(meta::INTENTION_STATUS, "succeeded");
    order.set_meta(meta::INTENT_CURRENCY, "eur");
    let order = h.orders.insert(order).await;
    h.api
        .push_refund(Err(ApiError::new("Test message", "server_error", 500)));

    let err = h.refund.refund(order, 1999, None).await.unwrap_err();

    assert!(matches!(err, PaymentError::Remote(_)));
    assert_eq!(err.to_string(), "Test message");
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::Processing);

    let notes = h.orders.notes(order).await;
    assert!(notes[0].contains("failed to complete"));
    assert!(notes[0].contains("Test message"));
    assert!(notes[0].contains("€19.99"));
}

#[tokio::test]
async fn test_cancel_authorization_success() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_cancel(Ok(intent(IntentStatus::Canceled, "usd")));

    h.cancel.cancel_authorization(order).await.unwrap();

    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::Cancelled);
    assert_eq!(
        h.orders.get_meta(order, meta::INTENTION_STATUS).await.unwrap(),
        Some("canceled".to_string())
    );
    assert!(h.orders.notes(order).await[0].contains("cancelled"));
}

#[tokio::test]
async fn test_cancel_failure_reconciles_when_already_cancelled_remotely() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_cancel(Err(ApiError::new("test exception", "test", 123)));
    h.api.push_get_intent(Ok(intent(IntentStatus::Canceled, "usd")));

    h.cancel.cancel_authorization(order).await.unwrap();

    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::Cancelled);
    assert!(h.orders.notes(order).await[0].contains("cancelled"));
}

#[tokio::test]
async fn test_cancel_failure_with_failed_refetch_leaves_order_untouched() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_cancel(Err(ApiError::new("test exception", "test", 123)));
    h.api
        .push_get_intent(Err(ApiError::new("ignore this", "test", 123)));

    let err = h.cancel.cancel_authorization(order).await.unwrap_err();

    assert_eq!(err.to_string(), "test exception");
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::OnHold);

    let notes = h.orders.notes(order).await;
    assert!(notes[0].contains("failed"));
    assert!(notes[0].contains("test exception"));
    assert!(!notes[0].contains("ignore this"));
}

#[tokio::test]
async fn test_cancel_failure_with_live_intent_leaves_order_untouched() {
    let h = harness();
    let order = h.orders.insert(authorized_order()).await;
    h.api.push_cancel(Err(ApiError::new("test exception", "test", 123)));
    h.api
        .push_get_intent(Ok(intent(IntentStatus::RequiresCapture, "usd")));

    let err = h.cancel.cancel_authorization(order).await.unwrap_err();

    assert!(matches!(err, PaymentError::Remote(_)));
    assert_eq!(h.orders.status(order).await.unwrap(), OrderStatus::OnHold);
    assert!(h.orders.notes(order).await[0].contains("failed"));
}
