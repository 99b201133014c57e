use crate::domain::payment::{Notification, PaymentCreation, PaymentRequest, PaymentStatus};
use crate::domain::ports::{NotificationSink, PaymentGateway};
use crate::error::GatewayError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Script {
    creations: VecDeque<Result<PaymentCreation, GatewayError>>,
    statuses: VecDeque<Result<PaymentStatus, GatewayError>>,
    create_requests: Vec<PaymentRequest>,
    status_requests: Vec<String>,
}

/// A gateway that replays queued outcomes instead of talking to a relay.
///
/// Once the status queue runs dry every lookup answers `Pending`. Calls are
/// recorded, and the number of calls outstanding at once is tracked so callers
/// can check that requests never overlap.
#[derive(Default, Clone)]
pub struct ScriptedGateway {
    script: Arc<Mutex<Script>>,
    latency: Duration,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedGateway {
    /// Creates a gateway with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_creation(&self, outcome: Result<PaymentCreation, GatewayError>) {
        self.lock().creations.push_back(outcome);
    }

    pub fn push_statuses<I>(&self, outcomes: I)
    where
        I: IntoIterator<Item = Result<PaymentStatus, GatewayError>>,
    {
        self.lock().statuses.extend(outcomes);
    }

    pub fn create_requests(&self) -> Vec<PaymentRequest> {
        self.lock().create_requests.clone()
    }

    pub fn status_requests(&self) -> Vec<String> {
        self.lock().status_requests.clone()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of calls ever outstanding at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // Script is plain data; a panic elsewhere cannot leave it inconsistent.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentCreation, GatewayError> {
        let _guard = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        self.lock().create_requests.push(request.clone());
        self.delay().await;

        self.lock()
            .creations
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::http(500, "No scripted creation outcome")))
    }

    async fn fetch_payment_status(
        &self,
        gateway_payment_id: &str,
    ) -> Result<PaymentStatus, GatewayError> {
        let _guard = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        self.lock()
            .status_requests
            .push(gateway_payment_id.to_string());
        self.delay().await;

        self.lock()
            .statuses
            .pop_front()
            .unwrap_or(Ok(PaymentStatus::Pending))
    }
}

/// Keeps every notification it receives, in order.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::NotificationKind;

    #[tokio::test]
    async fn test_scripted_gateway_replays_in_order() {
        let gateway = ScriptedGateway::new();
        gateway.push_statuses([
            Ok(PaymentStatus::Pending),
            Err(GatewayError::transport("connection reset")),
            Ok(PaymentStatus::Captured),
        ]);

        assert_eq!(
            gateway.fetch_payment_status("pay_1").await,
            Ok(PaymentStatus::Pending)
        );
        assert!(gateway.fetch_payment_status("pay_1").await.is_err());
        assert_eq!(
            gateway.fetch_payment_status("pay_1").await,
            Ok(PaymentStatus::Captured)
        );
        // Exhausted script keeps answering pending.
        assert_eq!(
            gateway.fetch_payment_status("pay_1").await,
            Ok(PaymentStatus::Pending)
        );
        assert_eq!(gateway.status_requests().len(), 4);
        assert_eq!(gateway.in_flight(), 0);
        assert_eq!(gateway.peak_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_unscripted_creation_fails() {
        let gateway = ScriptedGateway::new();
        let request = crate::domain::payment::PaymentRequest::new(
            crate::domain::money::MinorUnits::new(100),
            "INR",
            "tok",
            &Default::default(),
            crate::domain::payment::OrderNotes {
                order_items: 1,
                order_total: rust_decimal::Decimal::ONE,
            },
        );

        let err = gateway.create_payment(&request).await.unwrap_err();
        assert_eq!(err.http_status, Some(500));
        assert_eq!(gateway.create_requests(), vec![request]);
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify(&Notification::new(NotificationKind::Success, "ok"));
        notifier.notify(&Notification::new(NotificationKind::Error, "bad"));

        let received = notifier.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1].kind, NotificationKind::Error);
    }
}
