//! # Settings
//!
//! Business configuration editable at runtime: VAT, handling fee, enabled
//! shipping modes and payment methods, limits and notification toggles.
//!
//! Exactly one settings record is active. Every write that activates a record
//! deactivates the others inside the same batch. The unauthenticated
//! projection ([`AppSettings::public`]) is served from a five-minute cache that
//! is dropped on every write.
//!
//! Other slices read the active record through [`current`].

mod error;
#[cfg(feature = "server")]
pub mod server;
mod service;

pub use error::{SettingsError, SettingsErrorExt};
pub use service::{MaintenanceNotice, MaintenanceUpdate, TemplateUpdate};

use fhub_kernel::domain::models::{PublicSettings, Settings};
use fhub_kernel::domain::registry::InitializedSlice;
use fhub_store::{Store, StoreError};
use moka::future::Cache;
use std::time::Duration;
use tracing::info;

/// Lifetime of the cached public projection.
pub const PUBLIC_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

fhub_kernel::operation!(
    /// Any write to settings, maintenance or templates.
    pub ManageSettings, "manage_settings", MANAGE_SETTINGS
);

/// Settings feature state.
#[fhub_derive::fhub_slice]
pub struct AppSettings {
    store: Store,
    public_cache: Cache<&'static str, PublicSettings>,
}

/// Builds the slice over the shared store.
#[must_use]
pub fn build(store: &Store) -> AppSettings {
    let public_cache = Cache::builder().max_capacity(1).time_to_live(PUBLIC_CACHE_TTL).build();
    AppSettings::new(AppSettingsInner { store: store.clone(), public_cache })
}

/// Initialize the settings feature.
#[must_use]
pub fn init(store: &Store) -> InitializedSlice {
    info!("Settings slice initialized");
    InitializedSlice::new(build(store))
}

/// The active settings record, or the defaults when none exists yet.
pub async fn current(store: &Store) -> Result<Settings, StoreError> {
    let records = store.list::<Settings>().await?;
    Ok(records.into_iter().find(|s| s.is_active).unwrap_or_default())
}
