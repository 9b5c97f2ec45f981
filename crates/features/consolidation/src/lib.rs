//! # Consolidation
//!
//! A consolidation groups two or more `received` packages of one client into a
//! single billing unit. Members wait in `waiting` until they leave the group or
//! the group is dissolved, at which point they return to `received`.
//!
//! Dropping below two members deactivates the consolidation; deleting it does
//! the same. Records are never removed, only marked inactive.

pub mod aggregate;
mod error;
#[cfg(feature = "server")]
pub mod server;
mod service;

pub use aggregate::Totals;
pub use error::{ConsolidationError, ConsolidationErrorExt};
pub use service::{AddPackage, CreateConsolidation};

use fhub_kernel::domain::config::WorkflowConfig;
use fhub_kernel::domain::registry::InitializedSlice;
use fhub_store::Store;
use tracing::info;

fhub_kernel::operation!(pub Consolidate, "consolidate", CONSOLIDATE);
fhub_kernel::operation!(pub ViewConsolidations, "view_consolidations", VIEW_OWN);

/// Consolidation feature state.
#[fhub_derive::fhub_slice]
pub struct Consolidations {
    store: Store,
    workflow: WorkflowConfig,
}

#[must_use]
pub fn build(store: &Store, workflow: &WorkflowConfig) -> Consolidations {
    Consolidations::new(ConsolidationsInner { store: store.clone(), workflow: workflow.clone() })
}

/// Initialize the consolidation feature.
#[must_use]
pub fn init(store: &Store, workflow: &WorkflowConfig) -> InitializedSlice {
    info!("Consolidation slice initialized");
    InitializedSlice::new(build(store, workflow))
}
