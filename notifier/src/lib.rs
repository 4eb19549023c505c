use async_trait::async_trait;
use soapbox_core::NotifyError;
use tracing::{debug, warn};

pub mod slack;

pub use slack::SlackNotifier;

/// Pluggable sink for run-completion messages.
///
/// Every call site treats delivery as best-effort: a sink failure is logged
/// and swallowed, and must never fail the operation being reported on.
#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Sink used when no notification channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl NotifySink for NoopNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        debug!(len = text.len(), "Notification channel not configured, dropping message");
        Ok(())
    }
}

/// Fire-and-forget send: failures are logged, never propagated.
pub async fn notify_best_effort<S>(sink: &S, text: &str)
where
    S: NotifySink + ?Sized,
{
    if let Err(e) = sink.send(text).await {
        warn!("Failed to send notification: {}", e);
    }
}
