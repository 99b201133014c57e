use crate::domain::payment::PaymentState;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckoutError>;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("no instrument selected")]
    NoInstrumentSelected,
    #[error("empty cart")]
    EmptyCart,
    #[error("unknown payment instrument: {0}")]
    UnknownInstrument(String),
    #[error("a payment attempt is already {0}")]
    AttemptInProgress(PaymentState),
    #[error("invalid payment transition from {from} to {to}")]
    InvalidTransition { from: PaymentState, to: PaymentState },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Failure reported by the payment relay, or by the transport in front of it.
///
/// `http_status` is `None` when no response was received at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GatewayError {
    pub http_status: Option<u16>,
    pub message: String,
}

impl GatewayError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            http_status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            http_status: None,
            message: message.into(),
        }
    }
}
