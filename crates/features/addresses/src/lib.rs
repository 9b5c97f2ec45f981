//! # Addresses
//!
//! Physical locations of the company: the receiving warehouses abroad, the
//! offices where clients pay and collect, and pickup points.
//!
//! One active warehouse may be flagged as the default. Its address, with the
//! client's name and customer id, is what clients give to merchants.

mod error;
#[cfg(feature = "server")]
pub mod server;
mod service;

pub use error::{AddressError, AddressErrorExt};
pub use service::{AddressInput, default_warehouse};

use fhub_kernel::domain::registry::InitializedSlice;
use fhub_store::Store;
use tracing::info;

fhub_kernel::operation!(pub ViewAddresses, "view_addresses", VIEW_OWN);
fhub_kernel::operation!(
    /// Creating, editing and deleting locations.
    pub ManageAddresses, "manage_addresses", MANAGE_SETTINGS
);

/// Addresses feature state.
#[fhub_derive::fhub_slice]
pub struct Addresses {
    store: Store,
}

#[must_use]
pub fn build(store: &Store) -> Addresses {
    Addresses::new(AddressesInner { store: store.clone() })
}

/// Initialize the addresses feature.
#[must_use]
pub fn init(store: &Store) -> InitializedSlice {
    info!("Addresses slice initialized");
    InitializedSlice::new(build(store))
}
