use crate::domain::payment::{Notification, NotificationKind};
use crate::domain::ports::NotificationSink;
use tracing::{info, warn};

/// Emits notifications as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: &Notification) {
        let message = notification.message.as_str();
        match notification.kind {
            NotificationKind::Success => info!(kind = "success", message),
            NotificationKind::AuthenticationRequired => {
                info!(kind = "authentication_required", message)
            }
            NotificationKind::Warning => warn!(kind = "warning", message),
            NotificationKind::Error => warn!(kind = "error", message),
        }
    }
}
