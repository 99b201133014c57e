use super::driver::{AttemptDriver, PollPolicy};
use crate::domain::cart::Cart;
use crate::domain::catalog::{InstrumentBook, Product};
use crate::domain::money::MinorUnits;
use crate::domain::payment::{
    CustomerMeta, OrderNotes, PaymentAttempt, PaymentRequest, PaymentState,
};
use crate::domain::ports::{GatewayHandle, NotifierHandle};
use crate::error::{CheckoutError, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::info;

/// Per-store settings applied to every charge.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub currency: String,
    pub customer: CustomerMeta,
    pub polling: PollPolicy,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            customer: CustomerMeta::default(),
            polling: PollPolicy::default(),
        }
    }
}

/// State shared between the session and its background driver.
pub(crate) struct SessionCore {
    pub(crate) cart: Cart,
    pub(crate) selected_instrument: Option<String>,
    pub(crate) attempt: PaymentAttempt,
    /// Bumped whenever the current attempt is discarded.
    pub(crate) epoch: u64,
    updates: watch::Sender<PaymentAttempt>,
}

impl SessionCore {
    pub(crate) fn publish(&self) {
        self.updates.send_replace(self.attempt.clone());
    }
}

/// One customer's checkout: the cart, the selected instrument and the single
/// active payment attempt.
///
/// `submit` validates synchronously and hands the network work to a background
/// task owned by the session. Views follow progress through [`subscribe`],
/// which yields `PaymentAttempt` snapshots; they never see gateway errors
/// directly, only the terminal state and its message.
///
/// [`subscribe`]: CheckoutSession::subscribe
pub struct CheckoutSession {
    gateway: GatewayHandle,
    notifier: NotifierHandle,
    instruments: InstrumentBook,
    settings: CheckoutSettings,
    core: Arc<Mutex<SessionCore>>,
    updates: watch::Receiver<PaymentAttempt>,
    task: Option<JoinHandle<()>>,
}

impl CheckoutSession {
    pub fn new(
        gateway: GatewayHandle,
        notifier: NotifierHandle,
        instruments: InstrumentBook,
        settings: CheckoutSettings,
    ) -> Self {
        let (tx, rx) = watch::channel(PaymentAttempt::new());
        let core = SessionCore {
            cart: Cart::new(),
            selected_instrument: None,
            attempt: PaymentAttempt::new(),
            epoch: 0,
            updates: tx,
        };

        Self {
            gateway,
            notifier,
            instruments,
            settings,
            core: Arc::new(Mutex::new(core)),
            updates: rx,
            task: None,
        }
    }

    pub fn instruments(&self) -> &InstrumentBook {
        &self.instruments
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    pub async fn add_item(&self, product: &Product) {
        self.core.lock().await.cart.add_item(product);
    }

    /// Adds `quantity` units of `product` in one step.
    pub async fn add_items(&self, product: &Product, quantity: u32) {
        self.core.lock().await.cart.add_units(product, quantity);
    }

    pub async fn remove_item(&self, id: u32) -> bool {
        self.core.lock().await.cart.remove_item(id)
    }

    pub async fn set_quantity(&self, id: u32, quantity: u32) -> Result<()> {
        self.core.lock().await.cart.set_quantity(id, quantity)
    }

    /// A copy of the cart as it is right now.
    pub async fn cart(&self) -> Cart {
        self.core.lock().await.cart.clone()
    }

    pub async fn select_instrument(&self, id: &str) -> Result<()> {
        if self.instruments.get(id).is_none() {
            return Err(CheckoutError::UnknownInstrument(id.to_string()));
        }
        self.core.lock().await.selected_instrument = Some(id.to_string());
        Ok(())
    }

    pub async fn selected_instrument(&self) -> Option<String> {
        self.core.lock().await.selected_instrument.clone()
    }

    /// Starts charging the selected instrument for the current cart total.
    ///
    /// Validation failures are returned before any network call and leave the
    /// attempt `Idle`. Everything after that is reported through the attempt's
    /// state.
    pub async fn submit(&mut self) -> Result<()> {
        let mut core = self.core.lock().await;

        let state = core.attempt.state();
        if state != PaymentState::Idle {
            return Err(CheckoutError::AttemptInProgress(state));
        }

        let instrument_id = core
            .selected_instrument
            .clone()
            .ok_or(CheckoutError::NoInstrumentSelected)?;
        let instrument = self
            .instruments
            .get(&instrument_id)
            .ok_or_else(|| CheckoutError::UnknownInstrument(instrument_id.clone()))?;
        if core.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total = core.cart.total_amount()?;
        let amount = MinorUnits::from_major(total)?;
        let request = PaymentRequest::new(
            amount,
            self.settings.currency.as_str(),
            instrument.token.as_str(),
            &self.settings.customer,
            OrderNotes {
                order_items: core.cart.total_items(),
                order_total: total,
            },
        );

        core.attempt.begin(amount, &instrument.id)?;
        core.publish();
        info!(
            amount = %amount,
            currency = %self.settings.currency,
            instrument = %instrument.id,
            "submitting payment"
        );

        let driver = AttemptDriver {
            gateway: Arc::clone(&self.gateway),
            notifier: Arc::clone(&self.notifier),
            core: Arc::clone(&self.core),
            epoch: core.epoch,
            policy: self.settings.polling,
            request,
        };
        drop(core);

        self.task = Some(tokio::spawn(driver.run()));
        Ok(())
    }

    /// Discards the current attempt, stopping any pending status check.
    ///
    /// Whatever the background task was waiting on, it will not change the
    /// attempt or emit a notification after this returns.
    pub async fn cancel(&mut self) {
        let mut core = self.core.lock().await;
        core.epoch += 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let discarded = std::mem::replace(&mut core.attempt, PaymentAttempt::new());
        core.publish();
        if discarded.state() != PaymentState::Idle {
            info!(state = %discarded.state(), "payment attempt discarded");
        }
    }

    /// Replaces a settled attempt with a fresh `Idle` one.
    pub async fn new_attempt(&mut self) -> Result<()> {
        let state = self.core.lock().await.attempt.state();
        if state.is_in_flight() {
            return Err(CheckoutError::AttemptInProgress(state));
        }
        self.cancel().await;
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<PaymentAttempt> {
        self.updates.clone()
    }

    pub fn snapshot(&self) -> PaymentAttempt {
        self.updates.borrow().clone()
    }

    /// Waits until the current attempt is no longer in flight.
    pub async fn wait_until_settled(&self) -> PaymentAttempt {
        let mut updates = self.updates.clone();
        match updates
            .wait_for(|attempt| !attempt.state().is_in_flight())
            .await
        {
            Ok(attempt) => attempt.clone(),
            Err(_) => self.snapshot(),
        }
    }
}

impl Drop for CheckoutSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
