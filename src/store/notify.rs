use crate::{models::Severity, store::NotificationSink};
use async_trait::async_trait;
use tracing::{error, info, warn};

/// Notification sink that turns user-facing messages into log events.
///
/// Used by the agenda binary and by hosts without a toast layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => info!(?severity, "{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
    }
}
