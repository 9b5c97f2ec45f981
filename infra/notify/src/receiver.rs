use crate::Notification;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Lag-tolerant receive for notification subscribers.
pub trait NotificationReceiverExt {
    /// Next notification, or `None` once every notifier handle is dropped.
    ///
    /// A subscriber that falls behind skips the overwritten messages and
    /// continues from the oldest one still buffered.
    fn next(&mut self) -> impl Future<Output = Option<Arc<Notification>>> + Send;
}

impl NotificationReceiverExt for broadcast::Receiver<Arc<Notification>> {
    async fn next(&mut self) -> Option<Arc<Notification>> {
        let mut skipped = 0u64;

        loop {
            match self.recv().await {
                Ok(notification) => {
                    if skipped > 0 {
                        warn!(skipped, "Notification subscriber lagged; messages were dropped");
                    }
                    return Some(notification);
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    skipped = skipped.saturating_add(n);
                    debug!(skipped = n, total_skipped = skipped, "Notification subscriber lagging");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
