use super::money::MinorUnits;
use crate::error::CheckoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentState {
    #[default]
    Idle,
    Submitting,
    AwaitingAuthentication,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl PaymentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }

    /// Whether a network call may be outstanding for an attempt in this state.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Submitting | Self::AwaitingAuthentication | Self::Polling
        )
    }

    pub fn can_transition_to(&self, next: PaymentState) -> bool {
        use PaymentState::*;
        matches!(
            (self, next),
            (Idle, Submitting)
                | (Submitting, Succeeded | AwaitingAuthentication | Failed)
                | (AwaitingAuthentication, Polling)
                | (Polling, Polling | Succeeded | Failed | TimedOut)
        )
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::AwaitingAuthentication => "awaiting authentication",
            Self::Polling => "polling",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TimedOut => "timed out",
        };
        f.write_str(name)
    }
}

/// Status of a payment as reported by the gateway's status lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Authorized,
    Captured,
    Failed,
    Pending,
}

impl PaymentStatus {
    /// Maps a raw gateway status. Anything unrecognised keeps the poller going.
    pub fn from_gateway(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "authorized" => Self::Authorized,
            "captured" => Self::Captured,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Authorized | Self::Captured)
    }
}

/// Outcome of a successful payment-creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentCreation {
    Completed {
        gateway_payment_id: String,
    },
    RedirectRequired {
        gateway_payment_id: String,
        authentication_url: String,
    },
}

impl PaymentCreation {
    pub fn gateway_payment_id(&self) -> &str {
        match self {
            Self::Completed { gateway_payment_id }
            | Self::RedirectRequired {
                gateway_payment_id, ..
            } => gateway_payment_id,
        }
    }
}

/// Customer identity attached to every charge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerMeta {
    pub customer_id: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderNotes {
    pub order_items: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub order_total: Decimal,
}

/// Body of the relay's payment-creation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub amount: MinorUnits,
    pub currency: String,
    pub customer_id: String,
    pub token: String,
    pub contact: String,
    pub email: String,
    pub notes: OrderNotes,
}

impl PaymentRequest {
    pub fn new(
        amount: MinorUnits,
        currency: impl Into<String>,
        instrument_token: impl Into<String>,
        customer: &CustomerMeta,
        notes: OrderNotes,
    ) -> Self {
        Self {
            amount,
            currency: currency.into(),
            customer_id: customer.customer_id.clone(),
            token: instrument_token.into(),
            contact: customer.contact.clone(),
            email: customer.email.clone(),
            notes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    AuthenticationRequired,
}

/// A user-facing message emitted by the checkout as the attempt progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One attempt to charge the selected instrument for the current cart total.
///
/// This is also the value published to subscribers: views only read `state`
/// and `message`, the rest is there for display and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAttempt {
    state: PaymentState,
    amount: Option<MinorUnits>,
    instrument_ref: Option<String>,
    gateway_payment_id: Option<String>,
    authentication_url: Option<String>,
    poll_attempts: u32,
    message: Option<String>,
    history: Vec<PaymentState>,
}

impl Default for PaymentAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentAttempt {
    pub fn new() -> Self {
        Self {
            state: PaymentState::Idle,
            amount: None,
            instrument_ref: None,
            gateway_payment_id: None,
            authentication_url: None,
            poll_attempts: 0,
            message: None,
            history: vec![PaymentState::Idle],
        }
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn amount(&self) -> Option<MinorUnits> {
        self.amount
    }

    pub fn instrument_ref(&self) -> Option<&str> {
        self.instrument_ref.as_deref()
    }

    pub fn gateway_payment_id(&self) -> Option<&str> {
        self.gateway_payment_id.as_deref()
    }

    pub fn authentication_url(&self) -> Option<&str> {
        self.authentication_url.as_deref()
    }

    pub fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Every state this attempt has been in, oldest first.
    pub fn history(&self) -> &[PaymentState] {
        &self.history
    }

    pub fn transition(&mut self, next: PaymentState) -> Result<(), CheckoutError> {
        if !self.state.can_transition_to(next) {
            return Err(CheckoutError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        if next.is_terminal() {
            self.authentication_url = None;
        }
        if next == PaymentState::Polling && self.state == PaymentState::AwaitingAuthentication {
            self.poll_attempts = 0;
        }

        self.state = next;
        if self.history.last() != Some(&next) {
            self.history.push(next);
        }
        Ok(())
    }

    /// Records what is being charged and moves to `Submitting`.
    pub fn begin(
        &mut self,
        amount: MinorUnits,
        instrument_ref: &str,
    ) -> Result<(), CheckoutError> {
        self.transition(PaymentState::Submitting)?;
        self.amount = Some(amount);
        self.instrument_ref = Some(instrument_ref.to_string());
        Ok(())
    }

    /// Stores the gateway id. Once set it can only be confirmed, never replaced.
    pub fn assign_payment_id(&mut self, id: &str) -> Result<(), CheckoutError> {
        match &self.gateway_payment_id {
            Some(existing) if existing != id => Err(CheckoutError::ValidationError(format!(
                "Payment id already assigned: {existing}"
            ))),
            Some(_) => Ok(()),
            None => {
                self.gateway_payment_id = Some(id.to_string());
                Ok(())
            }
        }
    }

    pub fn require_authentication(&mut self, url: &str) -> Result<(), CheckoutError> {
        self.transition(PaymentState::AwaitingAuthentication)?;
        self.authentication_url = Some(url.to_string());
        Ok(())
    }

    /// Counts one resolved poll round.
    pub fn record_poll_round(&mut self) -> u32 {
        self.poll_attempts += 1;
        self.poll_attempts
    }

    pub fn finish(
        &mut self,
        terminal: PaymentState,
        message: impl Into<String>,
    ) -> Result<(), CheckoutError> {
        debug_assert!(terminal.is_terminal());
        self.transition(terminal)?;
        self.message = Some(message.into());
        Ok(())
    }
}
