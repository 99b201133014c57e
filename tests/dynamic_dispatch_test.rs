use std::sync::Arc;
use storefront_checkout::domain::money::MinorUnits;
use storefront_checkout::domain::payment::{
    CustomerMeta, Notification, NotificationKind, OrderNotes, PaymentCreation, PaymentRequest,
    PaymentStatus,
};
use storefront_checkout::domain::ports::{
    GatewayHandle, NotificationSink, NotifierHandle, PaymentGateway,
};
use storefront_checkout::infrastructure::in_memory::{RecordingNotifier, ScriptedGateway};

fn request() -> PaymentRequest {
    PaymentRequest::new(
        MinorUnits::new(500),
        "INR",
        "C76HN5TCtdJM0T",
        &CustomerMeta::default(),
        OrderNotes {
            order_items: 1,
            order_total: rust_decimal::Decimal::new(5, 0),
        },
    )
}

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let scripted = ScriptedGateway::new();
    scripted.push_creation(Ok(PaymentCreation::Completed {
        gateway_payment_id: "pay_1".to_string(),
    }));
    scripted.push_statuses([Ok(PaymentStatus::Captured)]);
    let gateway: GatewayHandle = Arc::new(scripted);

    let recorder = Arc::new(RecordingNotifier::new());
    let notifier: NotifierHandle = recorder.clone();

    // Verify Send + Sync by spawning tasks
    let gw_handle = tokio::spawn(async move {
        let creation = gateway.create_payment(&request()).await.unwrap();
        let status = gateway
            .fetch_payment_status(creation.gateway_payment_id())
            .await
            .unwrap();
        (creation, status)
    });
    let notify_handle = tokio::spawn(async move {
        notifier.notify(&Notification::new(NotificationKind::Warning, "slow relay"));
    });

    let (creation, status) = gw_handle.await.unwrap();
    assert_eq!(creation.gateway_payment_id(), "pay_1");
    assert_eq!(status, PaymentStatus::Captured);
    notify_handle.await.unwrap();
    assert_eq!(recorder.received()[0].message, "slow relay");
}
