use super::payment::{Notification, PaymentCreation, PaymentRequest, PaymentStatus};
use crate::error::GatewayError;
use async_trait::async_trait;
use std::sync::Arc;

/// Client side of the payment relay.
///
/// Implementations issue exactly one request per call and never retry;
/// retry policy belongs to the checkout session.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentCreation, GatewayError>;

    async fn fetch_payment_status(
        &self,
        gateway_payment_id: &str,
    ) -> Result<PaymentStatus, GatewayError>;
}

/// Receives user-facing notifications. Called while the session lock is held,
/// so implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

pub type GatewayHandle = Arc<dyn PaymentGateway>;
pub type NotifierHandle = Arc<dyn NotificationSink>;
