//! # Rating
//!
//! The rate table is an ordered set of weight bands per shipping mode. A
//! weight is priced by the active band of its mode whose inclusive
//! `[min_weight, max_weight]` range contains it; a weight no band covers is
//! an expected, reportable outcome ([`RatingError::NoRate`]) rather than a
//! defect.
//!
//! [`engine`] holds the pure lookup and fee composition used by both the quote
//! endpoint and shipment creation.

pub mod engine;
mod error;
#[cfg(feature = "server")]
pub mod server;
mod service;

pub use engine::{Quote, base_cost, compose, lookup};
pub use error::{RatingError, RatingErrorExt};
pub use service::RateInput;

use fhub_kernel::domain::registry::InitializedSlice;
use fhub_store::Store;
use tracing::info;

fhub_kernel::operation!(pub ManageRates, "manage_rates", MANAGE_RATES);
fhub_kernel::operation!(pub QuoteShipping, "quote_shipping", VIEW_OWN);

/// Rating feature state.
#[fhub_derive::fhub_slice]
pub struct Rating {
    store: Store,
}

#[must_use]
pub fn build(store: &Store) -> Rating {
    Rating::new(RatingInner { store: store.clone() })
}

/// Initialize the rating feature.
#[must_use]
pub fn init(store: &Store) -> InitializedSlice {
    info!("Rating slice initialized");
    InitializedSlice::new(build(store))
}
