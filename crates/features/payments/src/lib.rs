//! # Payments
//!
//! The ledger records payment attempts against a shipment. Attempts may be
//! created only while the shipment is `pending`; confirming one completes it
//! and, in the same transaction, moves the shipment to `paid`. A shipment
//! accepts at most one completed payment. Failed attempts stay on record so
//! the client can retry, and completed payments of cancelled shipments can be
//! refunded by an administrator.

mod error;
#[cfg(feature = "server")]
pub mod server;
mod service;

pub use error::{PaymentError, PaymentErrorExt};
pub use service::{ConfirmPayment, FailPayment, NewPayment};

use fhub_kernel::domain::registry::InitializedSlice;
use fhub_notify::Notifier;
use fhub_store::Store;
use tracing::info;

fhub_kernel::operation!(pub Pay, "pay", PAY);
fhub_kernel::operation!(pub RefundPayment, "refund_payment", MANAGE_PAYMENTS);
fhub_kernel::operation!(pub ViewPayments, "view_payments", VIEW_OWN);

/// Payments feature state.
#[fhub_derive::fhub_slice]
pub struct Payments {
    store: Store,
    notifier: Notifier,
}

#[must_use]
pub fn build(store: &Store, notifier: &Notifier) -> Payments {
    Payments::new(PaymentsInner { store: store.clone(), notifier: notifier.clone() })
}

/// Initialize the payments feature.
#[must_use]
pub fn init(store: &Store, notifier: &Notifier) -> InitializedSlice {
    info!("Payments slice initialized");
    InitializedSlice::new(build(store, notifier))
}
