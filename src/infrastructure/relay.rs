//! HTTP client for the payment relay.
//!
//! The relay forwards creation requests to the gateway and exposes a status
//! lookup. This client issues one request per call and leaves retries to the
//! checkout session.

use crate::domain::payment::{PaymentCreation, PaymentRequest, PaymentStatus};
use crate::domain::ports::PaymentGateway;
use crate::error::GatewayError;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Where the relay lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl RelayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NextAction {
    action: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreationBody {
    #[serde(default)]
    razorpay_payment_id: Option<String>,
    #[serde(default)]
    next: Vec<NextAction>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    status: Option<String>,
}

/// Failure body. The relay sends `error` as a summary string; the gateway
/// behind it sends an object carrying `description`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ErrorBody {
    fn into_message(self, status: u16) -> String {
        let description = self
            .error
            .as_ref()
            .and_then(|error| error.get("description"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        self.message
            .or(description)
            .unwrap_or_else(|| format!("Payment API failed: {status}"))
    }
}

#[derive(Debug, Clone)]
pub struct RelayGateway {
    client: reqwest::Client,
    base_url: String,
}

impl RelayGateway {
    pub fn new(config: RelayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::transport(format!("failed to build HTTP client: {e}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends the request and turns any non-2xx answer into a `GatewayError`.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<reqwest::Response, GatewayError> {
        let resp = request
            .send()
            .await
            .map_err(|e| GatewayError::transport(format!("{operation}: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .unwrap_or_default()
            .into_message(code);
        debug!(operation, status = code, %message, "relay rejected request");
        Err(GatewayError::http(code, message))
    }

    async fn read_json<T: DeserializeOwned>(
        resp: reqwest::Response,
        operation: &str,
    ) -> Result<T, GatewayError> {
        let code = resp.status().as_u16();
        resp.json::<T>().await.map_err(|e| {
            GatewayError::http(code, format!("{operation}: malformed response: {e}"))
        })
    }
}

#[async_trait]
impl PaymentGateway for RelayGateway {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentCreation, GatewayError> {
        let url = format!("{}/api/create-payment", self.base_url);
        let resp = self
            .send(self.client.post(&url).json(request), "create_payment")
            .await?;
        let code = resp.status().as_u16();
        let body: CreationBody = Self::read_json(resp, "create_payment").await?;

        let gateway_payment_id = body.razorpay_payment_id.ok_or_else(|| {
            GatewayError::http(code, "create_payment: malformed response: missing payment id")
        })?;

        let redirect = body
            .next
            .into_iter()
            .find(|a| a.action == "redirect")
            .and_then(|a| a.url);

        Ok(match redirect {
            Some(authentication_url) => PaymentCreation::RedirectRequired {
                gateway_payment_id,
                authentication_url,
            },
            None => PaymentCreation::Completed { gateway_payment_id },
        })
    }

    async fn fetch_payment_status(
        &self,
        gateway_payment_id: &str,
    ) -> Result<PaymentStatus, GatewayError> {
        let url = format!("{}/api/payment-status/{gateway_payment_id}", self.base_url);
        let resp = self
            .send(self.client.get(&url), "fetch_payment_status")
            .await?;
        let body: StatusBody = Self::read_json(resp, "fetch_payment_status").await?;

        Ok(body
            .status
            .as_deref()
            .map(PaymentStatus::from_gateway)
            .unwrap_or(PaymentStatus::Pending))
    }
}
