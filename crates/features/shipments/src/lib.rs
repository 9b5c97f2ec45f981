//! # Shipments
//!
//! A shipment is the billable unit sent to a delivery address, built from
//! either loose `received` packages or one active consolidation. Creation
//! copies the total weight, prices it through the rate table and fixes
//! `total_cost = shipping_cost + insurance_cost`.
//!
//! Lifecycle: `pending → paid → processing → shipped → in_transit → delivered`,
//! with `cancelled` reachable until the carrier takes it. Only a confirmed
//! payment moves a shipment out of `pending`; agents drive the rest and the
//! constituent packages follow (`in_transit`, then `available`).
//!
//! When no band prices the weight, [`MissingRatePolicy`] decides between
//! rejecting the shipment and creating it at zero shipping cost.

mod error;
mod input;
#[cfg(feature = "server")]
pub mod server;
mod service;

pub use error::{ShipmentError, ShipmentErrorExt};
pub use fhub_kernel::domain::config::MissingRatePolicy;
pub use input::{AdvanceShipment, CreateShipment, Source};

use fhub_kernel::domain::config::WorkflowConfig;
use fhub_kernel::domain::registry::InitializedSlice;
use fhub_notify::Notifier;
use fhub_store::Store;
use tracing::info;

fhub_kernel::operation!(pub CreateShipments, "create_shipment", CREATE_SHIPMENT);
fhub_kernel::operation!(pub AdvanceShipments, "advance_shipment", ADVANCE_SHIPMENT);
fhub_kernel::operation!(
    /// Owner-side cancellation of an unpaid shipment.
    pub CancelShipment, "cancel_shipment", CREATE_SHIPMENT
);
fhub_kernel::operation!(pub ViewShipments, "view_shipments", VIEW_OWN);

/// Shipments feature state.
#[fhub_derive::fhub_slice]
pub struct Shipments {
    store: Store,
    notifier: Notifier,
    workflow: WorkflowConfig,
}

#[must_use]
pub fn build(store: &Store, notifier: &Notifier, workflow: &WorkflowConfig) -> Shipments {
    Shipments::new(ShipmentsInner {
        store: store.clone(),
        notifier: notifier.clone(),
        workflow: workflow.clone(),
    })
}

/// Initialize the shipments feature.
#[must_use]
pub fn init(store: &Store, notifier: &Notifier, workflow: &WorkflowConfig) -> InitializedSlice {
    info!(missing_rate = ?workflow.missing_rate, "Shipments slice initialized");
    InitializedSlice::new(build(store, notifier, workflow))
}
