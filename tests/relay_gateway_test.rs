use storefront_checkout::domain::money::MinorUnits;
use storefront_checkout::domain::payment::{
    CustomerMeta, OrderNotes, PaymentCreation, PaymentRequest, PaymentStatus,
};
use storefront_checkout::domain::ports::PaymentGateway;
use storefront_checkout::infrastructure::relay::{RelayConfig, RelayGateway};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> RelayGateway {
    RelayGateway::new(RelayConfig::new(server.uri())).expect("relay client")
}

fn request() -> PaymentRequest {
    PaymentRequest::new(
        MinorUnits::new(1000),
        "INR",
        "C76HN5TCtdJM0T",
        &CustomerMeta {
            customer_id: "cust_1".to_string(),
            contact: "9000000000".to_string(),
            email: "buyer@example.com".to_string(),
        },
        OrderNotes {
            order_items: 1,
            order_total: rust_decimal::Decimal::TEN,
        },
    )
}

#[tokio::test]
async fn test_create_payment_completed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-payment"))
        .and(body_partial_json(serde_json::json!({
            "amount": 1000,
            "currency": "INR",
            "customer_id": "cust_1",
            "token": "C76HN5TCtdJM0T",
            "notes": {"order_items": 1}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "razorpay_payment_id": "pay_1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let creation = gateway(&server).create_payment(&request()).await.unwrap();

    assert_eq!(
        creation,
        PaymentCreation::Completed {
            gateway_payment_id: "pay_1".to_string()
        }
    );
}

#[tokio::test]
async fn test_create_payment_redirect_required() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "razorpay_payment_id": "pay_2",
            "next": [
                {"action": "otp_submit", "url": "https://api.example/otp"},
                {"action": "redirect", "url": "https://auth.example/x"}
            ]
        })))
        .mount(&server)
        .await;

    let creation = gateway(&server).create_payment(&request()).await.unwrap();

    assert_eq!(
        creation,
        PaymentCreation::RedirectRequired {
            gateway_payment_id: "pay_2".to_string(),
            authentication_url: "https://auth.example/x".to_string(),
        }
    );
}

#[tokio::test]
async fn test_create_payment_error_uses_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-payment"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Payment processing failed",
            "message": "upstream timeout"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server).create_payment(&request()).await.unwrap_err();

    assert_eq!(err.http_status, Some(500));
    assert_eq!(err.message, "upstream timeout");
}

#[tokio::test]
async fn test_create_payment_error_without_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-payment"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = gateway(&server).create_payment(&request()).await.unwrap_err();

    assert_eq!(err.http_status, Some(502));
    assert_eq!(err.message, "Payment API failed: 502");
}

#[tokio::test]
async fn test_create_payment_missing_id_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-payment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let err = gateway(&server).create_payment(&request()).await.unwrap_err();

    assert!(err.message.contains("malformed"));
}

#[tokio::test]
async fn test_fetch_payment_status_mapping() {
    let server = MockServer::start().await;
    for (id, status) in [
        ("pay_a", "authorized"),
        ("pay_c", "captured"),
        ("pay_f", "failed"),
        ("pay_p", "pending"),
        ("pay_x", "created"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/api/payment-status/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": status,
                "amount": 1000
            })))
            .mount(&server)
            .await;
    }

    let gateway = gateway(&server);
    assert_eq!(
        gateway.fetch_payment_status("pay_a").await,
        Ok(PaymentStatus::Authorized)
    );
    assert_eq!(
        gateway.fetch_payment_status("pay_c").await,
        Ok(PaymentStatus::Captured)
    );
    assert_eq!(
        gateway.fetch_payment_status("pay_f").await,
        Ok(PaymentStatus::Failed)
    );
    assert_eq!(
        gateway.fetch_payment_status("pay_p").await,
        Ok(PaymentStatus::Pending)
    );
    assert_eq!(
        gateway.fetch_payment_status("pay_x").await,
        Ok(PaymentStatus::Pending)
    );
}

#[tokio::test]
async fn test_fetch_payment_status_not_found() {
    let server = MockServer::start().await;

    let err = gateway(&server)
        .fetch_payment_status("pay_missing")
        .await
        .unwrap_err();

    assert_eq!(err.http_status, Some(404));
}

#[tokio::test]
async fn test_unreachable_relay_is_transport_error() {
    let gateway = RelayGateway::new(RelayConfig::new("http://127.0.0.1:9")).unwrap();

    let err = gateway.fetch_payment_status("pay_1").await.unwrap_err();

    assert_eq!(err.http_status, None);
}
