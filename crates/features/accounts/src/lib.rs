//! Accounts feature slice.
//!
//! A deliberately small user directory: the workflow only needs to know who a
//! client is, which customer id is printed on their parcels and where they
//! ship to. Credentials and sessions belong to the identity provider in front
//! of the server.

mod error;
#[cfg(feature = "server")]
pub mod server;
mod service;

pub use error::{AccountError, AccountErrorExt};
pub use service::{RegisterUser, by_email};

use fhub_kernel::domain::config::WorkflowConfig;
use fhub_kernel::domain::registry::InitializedSlice;
use fhub_notify::Notifier;
use fhub_store::Store;
use tracing::info;

fhub_kernel::operation!(
    /// Creating users of any role and reading other users' records.
    pub ManageUsers, "manage_users", MANAGE_USERS
);
fhub_kernel::operation!(pub ViewAccount, "view_account", VIEW_OWN);

/// Accounts feature state.
#[fhub_derive::fhub_slice]
pub struct Accounts {
    store: Store,
    notifier: Notifier,
    workflow: WorkflowConfig,
}

#[must_use]
pub fn build(store: &Store, notifier: &Notifier, workflow: &WorkflowConfig) -> Accounts {
    Accounts::new(AccountsInner {
        store: store.clone(),
        notifier: notifier.clone(),
        workflow: workflow.clone(),
    })
}

/// Initialize the accounts feature.
#[must_use]
pub fn init(store: &Store, notifier: &Notifier, workflow: &WorkflowConfig) -> InitializedSlice {
    info!("Accounts slice initialized");
    InitializedSlice::new(build(store, notifier, workflow))
}
