//! Facade crate for `ForwardHub` features and shared modules.
//! Re-exports domain/kernel primitives and wires every feature slice over one
//! record store and one notifier.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Library use: build a [`Platform`] and call the slices directly.
//! - Server use (feature `server`): register [`init`]'s slices in the
//!   `ApiState` and mount [`server::router`].

pub use fhub_domain as domain;
pub use fhub_kernel as kernel;
pub use fhub_notify as notify;
pub use fhub_store as store;

use domain::config::ApiConfig;
use domain::registry::InitializedSlice;
use fhub_notify::Notifier;
use fhub_store::Store;
use tracing::info;

#[cfg(feature = "server")]
pub mod server {
    use axum::Router;
    use fhub_kernel::server::ApiState;

    pub mod router {
        pub use fhub_kernel::server::system_router;
    }

    /// Every feature route, unmounted from state.
    #[must_use]
    pub fn router() -> Router<ApiState> {
        Router::new()
            .merge(super::features::accounts::server::router())
            .merge(super::features::addresses::server::router())
            .merge(super::features::settings::server::router())
            .merge(super::features::rating::server::router())
            .merge(super::features::packages::server::router())
            .merge(super::features::consolidation::server::router())
            .merge(super::features::shipments::server::router())
            .merge(super::features::payments::server::router())
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use fhub_accounts as accounts;
    pub use fhub_addresses as addresses;
    pub use fhub_consolidation as consolidation;
    pub use fhub_packages as packages;
    pub use fhub_payments as payments;
    pub use fhub_rating as rating;
    pub use fhub_settings as settings;
    pub use fhub_shipments as shipments;

    /// Slices compiled into this build.
    pub const ENABLED: &[&str] = &[
        "accounts",
        "addresses",
        "settings",
        "rating",
        "packages",
        "consolidation",
        "shipments",
        "payments",
        #[cfg(feature = "server")]
        "server",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Every slice, sharing one store and one notifier.
#[derive(Debug, Clone)]
pub struct Platform {
    pub store: Store,
    pub notifier: Notifier,
    pub accounts: features::accounts::Accounts,
    pub addresses: features::addresses::Addresses,
    pub settings: features::settings::AppSettings,
    pub rating: features::rating::Rating,
    pub packages: features::packages::Packages,
    pub consolidations: features::consolidation::Consolidations,
    pub shipments: features::shipments::Shipments,
    pub payments: features::payments::Payments,
}

impl Platform {
    #[must_use]
    pub fn new(config: &ApiConfig, store: &Store, notifier: &Notifier) -> Self {
        let workflow = &config.workflow;
        Self {
            store: store.clone(),
            notifier: notifier.clone(),
            accounts: features::accounts::build(store, notifier, workflow),
            addresses: features::addresses::build(store),
            settings: features::settings::build(store),
            rating: features::rating::build(store),
            packages: features::packages::build(store, notifier, workflow),
            consolidations: features::consolidation::build(store, workflow),
            shipments: features::shipments::build(store, notifier, workflow),
            payments: features::payments::build(store, notifier),
        }
    }

    /// A volatile platform with default configuration.
    ///
    /// # Errors
    /// Returns [`fhub_store::StoreError`] if the in-memory engine fails to start.
    pub async fn in_memory() -> Result<Self, fhub_store::StoreError> {
        let store = Store::in_memory().await?;
        Ok(Self::new(&ApiConfig::default(), &store, &Notifier::new()))
    }
}

/// Initialize all feature slices for server mode.
#[must_use]
pub fn init(config: &ApiConfig, store: &Store, notifier: &Notifier) -> Vec<InitializedSlice> {
    let workflow = &config.workflow;
    let slices = vec![
        features::settings::init(store),
        features::accounts::init(store, notifier, workflow),
        features::addresses::init(store),
        features::rating::init(store),
        features::packages::init(store, notifier, workflow),
        features::consolidation::init(store, workflow),
        features::shipments::init(store, notifier, workflow),
        features::payments::init(store, notifier),
    ];
    info!(slices = slices.len(), "Platform slices initialized");
    slices
}
