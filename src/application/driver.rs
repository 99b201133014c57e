use super::session::SessionCore;
use crate::domain::payment::{
    Notification, NotificationKind, PaymentCreation, PaymentRequest, PaymentState, PaymentStatus,
};
use crate::domain::ports::{GatewayHandle, NotifierHandle};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// How a redirect-required payment is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each status lookup.
    pub interval: Duration,
    /// Rounds allowed before the attempt is declared timed out.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 60,
        }
    }
}

/// Background task that carries one submitted attempt to a terminal state.
///
/// Every mutation re-acquires the session lock and checks `epoch` first; once
/// the session has been cancelled or reset, the driver stops without touching
/// the attempt or notifying anyone.
pub(crate) struct AttemptDriver {
    pub(crate) gateway: GatewayHandle,
    pub(crate) notifier: NotifierHandle,
    pub(crate) core: Arc<Mutex<SessionCore>>,
    pub(crate) epoch: u64,
    pub(crate) policy: PollPolicy,
    pub(crate) request: PaymentRequest,
}

impl AttemptDriver {
    pub(crate) async fn run(self) {
        let creation = self.gateway.create_payment(&self.request).await;

        let Some(mut core) = self.lock_current().await else {
            debug!("creation resolved after the attempt was discarded");
            return;
        };

        match creation {
            Ok(PaymentCreation::Completed { gateway_payment_id }) => {
                self.succeed(&mut core, &gateway_payment_id);
            }
            Ok(PaymentCreation::RedirectRequired {
                gateway_payment_id,
                authentication_url,
            }) => {
                if let Err(err) =
                    self.await_authentication(&mut core, &gateway_payment_id, &authentication_url)
                {
                    error!(error = %err, "could not enter polling");
                    self.fail(&mut core, format!("Payment failed: {err}"));
                    return;
                }
                drop(core);
                self.poll(&gateway_payment_id).await;
            }
            Err(err) => {
                warn!(
                    http_status = ?err.http_status,
                    error = %err,
                    "payment creation failed"
                );
                self.fail(&mut core, format!("Payment failed: {}", err.message));
            }
        }
    }

    async fn lock_current(&self) -> Option<MutexGuard<'_, SessionCore>> {
        let core = self.core.lock().await;
        (core.epoch == self.epoch).then_some(core)
    }

    fn await_authentication(
        &self,
        core: &mut SessionCore,
        payment_id: &str,
        url: &str,
    ) -> Result<()> {
        core.attempt.assign_payment_id(payment_id)?;
        core.attempt.require_authentication(url)?;
        core.publish();
        info!(payment_id, "step-up authentication required");
        self.notifier.notify(&Notification::new(
            NotificationKind::AuthenticationRequired,
            format!("Complete authentication to finish the payment: {url}"),
        ));

        core.attempt.transition(PaymentState::Polling)?;
        core.publish();
        Ok(())
    }

    async fn poll(&self, payment_id: &str) {
        loop {
            tokio::time::sleep(self.policy.interval).await;

            let status = match self.gateway.fetch_payment_status(payment_id).await {
                Ok(status) => status,
                Err(err) => {
                    warn!(payment_id, error = %err, "status check failed, counting as pending");
                    PaymentStatus::Pending
                }
            };

            let Some(mut core) = self.lock_current().await else {
                debug!(payment_id, "status resolved after the attempt was discarded");
                return;
            };
            let round = core.attempt.record_poll_round();
            debug!(payment_id, round, ?status, "status check");

            match status {
                PaymentStatus::Authorized | PaymentStatus::Captured => {
                    self.succeed(&mut core, payment_id);
                    return;
                }
                PaymentStatus::Failed => {
                    self.fail(
                        &mut core,
                        format!("Payment failed: payment {payment_id} was declined"),
                    );
                    return;
                }
                PaymentStatus::Pending if round >= self.policy.max_attempts => {
                    self.time_out(&mut core, payment_id);
                    return;
                }
                PaymentStatus::Pending => {
                    if let Err(err) = core.attempt.transition(PaymentState::Polling) {
                        error!(error = %err, "polling interrupted");
                        return;
                    }
                    core.publish();
                }
            }
        }
    }

    fn succeed(&self, core: &mut SessionCore, payment_id: &str) {
        let amount = self.request.amount;
        let message = format!(
            "Payment of {} {amount} successful! Payment ID: {payment_id}",
            self.request.currency
        );
        let settled = core
            .attempt
            .assign_payment_id(payment_id)
            .and_then(|()| core.attempt.finish(PaymentState::Succeeded, message.clone()));
        if let Err(err) = settled {
            error!(payment_id, error = %err, "could not record successful payment");
            return;
        }

        core.cart.clear();
        core.selected_instrument = None;
        core.publish();
        info!(payment_id, %amount, "payment succeeded");
        self.notifier
            .notify(&Notification::new(NotificationKind::Success, message));
    }

    fn fail(&self, core: &mut SessionCore, message: String) {
        if let Err(err) = core.attempt.finish(PaymentState::Failed, message.clone()) {
            error!(error = %err, "could not record failed payment");
            return;
        }
        core.publish();
        info!(reason = %message, "payment failed");
        self.notifier
            .notify(&Notification::new(NotificationKind::Error, message));
    }

    fn time_out(&self, core: &mut SessionCore, payment_id: &str) {
        let message = format!(
            "Payment status check timed out. The outcome of payment {payment_id} is unverified; \
             please confirm with your bank before paying again."
        );
        if let Err(err) = core.attempt.finish(PaymentState::TimedOut, message.clone()) {
            error!(error = %err, "could not record timed out payment");
            return;
        }
        core.publish();
        warn!(
            payment_id,
            rounds = core.attempt.poll_attempts(),
            "payment status unverified"
        );
        self.notifier
            .notify(&Notification::new(NotificationKind::Warning, message));
    }
}
