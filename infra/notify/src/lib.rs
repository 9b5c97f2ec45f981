//! # Notifications
//!
//! Fire-and-forget dispatch of user notifications (package received, shipment
//! shipped, payment received, ...).
//!
//! Slices stage notifications in an [`Outbox`] while their transaction runs and
//! hand it to [`Notifier::flush`] only after the commit, so a rolled-back
//! operation never notifies anyone. Delivery (email, SMS, templates) belongs to
//! whoever subscribes; a notifier without subscribers silently drops messages.
//!
//! # Example
//!
//! ```rust
//! use fhub_domain::models::NotificationKind;
//! use fhub_notify::{Notification, NotificationReceiverExt, Notifier, Outbox};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let notifier = Notifier::new();
//!     let mut rx = notifier.subscribe();
//!
//!     let mut outbox = Outbox::default();
//!     outbox.push(Notification::new(NotificationKind::PackageReceived, "user:1", "BP2345ABCD"));
//!     notifier.flush(outbox);
//!
//!     let received = rx.next().await.unwrap();
//!     assert_eq!(received.subject, "BP2345ABCD");
//! }
//! ```

mod error;
mod receiver;

pub use error::{NotifyError, NotifyErrorExt};
pub use receiver::NotificationReceiverExt;

use chrono::{DateTime, Utc};
use fhub_domain::models::NotificationKind;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// A safe default for the channel buffer.
const DEFAULT_CAPACITY: usize = 256;

/// A message for one user about one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    /// User id of the recipient.
    pub recipient: String,
    /// Human-readable code of the record (tracking number, shipment code, ...).
    pub subject: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        recipient: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self { kind, recipient: recipient.into(), subject: subject.into(), at: Utc::now() }
    }
}

/// Notifications staged during a transaction.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<Notification>,
}

impl Outbox {
    pub fn push(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    /// Stages the notification only when `enabled` (the matching `notify_on_*` flag).
    pub fn push_if(&mut self, enabled: bool, notification: Notification) {
        if enabled {
            self.pending.push(notification);
        } else {
            trace!(kind = %notification.kind, "Notification disabled by settings");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Shared broadcast sender; clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Arc<Notification>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { sender }
    }

    /// # Errors
    /// Returns [`NotifyError::InvalidCapacity`] for a zero capacity.
    pub fn with_capacity(capacity: usize) -> Result<Self, NotifyError> {
        if capacity == 0 {
            return Err(NotifyError::InvalidCapacity {
                message: "capacity must be greater than zero".into(),
                context: None,
            });
        }
        let (sender, _) = broadcast::channel(capacity);
        Ok(Self { sender })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.sender.subscribe()
    }

    /// Publishes one notification; returns how many subscribers received it.
    pub fn dispatch(&self, notification: Notification) -> usize {
        let kind = notification.kind;
        match self.sender.send(Arc::new(notification)) {
            Ok(receivers) => {
                debug!(%kind, receivers, "Notification dispatched");
                receivers
            },
            Err(_) => {
                trace!(%kind, "Notification dropped, no subscribers");
                0
            },
        }
    }

    /// Publishes every staged notification in order.
    pub fn flush(&self, outbox: Outbox) {
        for notification in outbox.pending {
            self.dispatch(notification);
        }
    }
}
