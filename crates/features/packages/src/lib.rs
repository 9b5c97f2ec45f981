//! # Packages
//!
//! A package is one physical parcel. Clients announce parcels before they
//! reach the warehouse (`announced`); inbound agents either process those
//! announcements or register unannounced parcels directly (`received`).
//! Consolidation membership parks a parcel in `waiting`, shipments carry it
//! through `in_transit` to `available`, and the outbound agent's hand-over
//! ends it in `delivered`.
//!
//! Inbound agents may also force any status explicitly. Every transition,
//! whoever causes it, is appended to the package's audit trail through
//! [`workflow::transition`].

mod error;
mod input;
#[cfg(feature = "server")]
pub mod server;
mod service;
pub mod workflow;

pub use error::{PackageError, PackageErrorExt};
pub use input::{DeliverPackage, PackageDetails, ProcessPackage, RegisterPackage, StatusUpdate};
pub use service::PublicTracking;

use fhub_kernel::domain::config::WorkflowConfig;
use fhub_kernel::domain::registry::InitializedSlice;
use fhub_notify::Notifier;
use fhub_store::Store;
use tracing::info;

fhub_kernel::operation!(pub AnnouncePackage, "announce_package", ANNOUNCE_PACKAGE);
fhub_kernel::operation!(pub RegisterParcel, "register_package", REGISTER_PACKAGE);
fhub_kernel::operation!(pub ProcessAnnounced, "process_package", PROCESS_PACKAGE);
fhub_kernel::operation!(pub UpdatePackageStatus, "update_package_status", UPDATE_PACKAGE_STATUS);
fhub_kernel::operation!(pub DeliverParcel, "deliver_package", DELIVER_PACKAGE);
fhub_kernel::operation!(pub ViewPackages, "view_packages", VIEW_OWN);

/// Packages feature state.
#[fhub_derive::fhub_slice]
pub struct Packages {
    store: Store,
    notifier: Notifier,
    workflow: WorkflowConfig,
}

#[must_use]
pub fn build(store: &Store, notifier: &Notifier, workflow: &WorkflowConfig) -> Packages {
    Packages::new(PackagesInner {
        store: store.clone(),
        notifier: notifier.clone(),
        workflow: workflow.clone(),
    })
}

/// Initialize the packages feature.
#[must_use]
pub fn init(store: &Store, notifier: &Notifier, workflow: &WorkflowConfig) -> InitializedSlice {
    info!("Packages slice initialized");
    InitializedSlice::new(build(store, notifier, workflow))
}
