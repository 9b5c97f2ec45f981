use crate::{AddressError, Addresses, ManageAddresses, ViewAddresses};
use chrono::Utc;
use fhub_kernel::domain::constants::ADDRESS;
use fhub_kernel::domain::models::{Address, AddressKind, AddressService, Country};
use fhub_kernel::record_id;
use fhub_kernel::security::{Actor, ResourceGuard};
use fhub_store::{Batch, Store, StoreError};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// A location as submitted by an administrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub kind: AddressKind,
    pub name: String,
    pub country: Country,
    pub city: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default)]
    pub is_default_warehouse: bool,
    #[serde(default)]
    pub services: Vec<AddressService>,
}

const fn active() -> bool {
    true
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl AddressInput {
    fn validate(&self) -> Result<(), AddressError> {
        for (field, value) in [
            ("name", &self.name),
            ("city", &self.city),
            ("addressLine1", &self.address_line1),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                return Err(AddressError::invalid(field, "must not be empty"));
            }
        }
        if !self.email.contains('@') {
            return Err(AddressError::invalid("email", "not a valid email address"));
        }
        if self.is_default_warehouse && self.kind != AddressKind::Warehouse {
            return Err(AddressError::invalid(
                "isDefaultWarehouse",
                "only warehouses can be default",
            ));
        }
        if self.is_default_warehouse && !self.is_active {
            return Err(AddressError::invalid(
                "isDefaultWarehouse",
                "an inactive warehouse cannot be default",
            ));
        }
        let mut seen = BTreeSet::new();
        if self.services.iter().any(|s| !seen.insert(s.service)) {
            return Err(AddressError::invalid("services", "each service may be listed once"));
        }
        Ok(())
    }

    fn into_address(self, id: String, created_at: chrono::DateTime<Utc>) -> Address {
        let mut services = self.services;
        services.sort_by_key(|s| s.service);
        Address {
            id,
            kind: self.kind,
            name: self.name.trim().to_owned(),
            country: self.country,
            city: self.city.trim().to_owned(),
            address_line1: self.address_line1.trim().to_owned(),
            address_line2: optional(self.address_line2),
            state: optional(self.state),
            postal_code: optional(self.postal_code),
            phone: self.phone.trim().to_owned(),
            email: self.email.trim().to_lowercase(),
            hours: self.hours.trim().to_owned(),
            is_active: self.is_active,
            display_order: self.display_order,
            is_default_warehouse: self.is_default_warehouse,
            services,
            created_at,
            updated_at: Utc::now(),
        }
    }
}

/// The active warehouse flagged as default, if one is configured.
pub async fn default_warehouse(store: &Store) -> Result<Option<Address>, StoreError> {
    let addresses = store.list::<Address>().await?;
    Ok(addresses
        .into_iter()
        .find(|a| a.is_active && a.kind == AddressKind::Warehouse && a.is_default_warehouse))
}

/// Stages clearing the default flag on every other warehouse.
async fn clear_default(store: &Store, batch: &mut Batch, keep: &str) -> Result<(), AddressError> {
    for previous in store.list::<Address>().await? {
        if !previous.is_default_warehouse || previous.id == keep {
            continue;
        }
        let next =
            Address { is_default_warehouse: false, updated_at: Utc::now(), ..previous.clone() };
        batch.update(&previous, &next)?;
    }
    Ok(())
}

fn sorted(mut addresses: Vec<Address>) -> Vec<Address> {
    addresses.sort_by(|a, b| {
        a.display_order.cmp(&b.display_order).then_with(|| a.name.cmp(&b.name))
    });
    addresses
}

impl Addresses {
    /// Active locations ordered by display order, then name.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Address>, AddressError> {
        self.active(actor, None).await
    }

    pub async fn warehouses(&self, actor: &Actor) -> Result<Vec<Address>, AddressError> {
        self.active(actor, Some(AddressKind::Warehouse)).await
    }

    pub async fn offices(&self, actor: &Actor) -> Result<Vec<Address>, AddressError> {
        self.active(actor, Some(AddressKind::Office)).await
    }

    async fn active(
        &self,
        actor: &Actor,
        kind: Option<AddressKind>,
    ) -> Result<Vec<Address>, AddressError> {
        actor.authorize::<ViewAddresses>()?;
        let mut addresses = self.store.list::<Address>().await?;
        addresses.retain(|a| a.is_active && kind.is_none_or(|k| a.kind == k));
        Ok(sorted(addresses))
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id, kind = %input.kind))]
    pub async fn create(
        &self,
        actor: &Actor,
        input: AddressInput,
    ) -> Result<Address, AddressError> {
        actor.authorize::<ManageAddresses>()?;
        input.validate()?;

        let address = input.into_address(record_id!(ADDRESS), Utc::now());
        let mut batch = self.store.batch();
        if address.is_default_warehouse {
            clear_default(&self.store, &mut batch, &address.id).await?;
        }
        batch.create(&address)?;
        batch.commit().await?;

        info!(address = %address.id, default = address.is_default_warehouse, "Address created");
        Ok(address)
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        input: AddressInput,
    ) -> Result<Address, AddressError> {
        actor.authorize::<ManageAddresses>()?;
        input.validate()?;
        let id = ResourceGuard::verify(id, ADDRESS)?;

        let previous =
            self.store.get::<Address>(&id).await?.ok_or_else(|| AddressError::not_found(&id))?;
        let address = input.into_address(id, previous.created_at);
        let mut batch = self.store.batch();
        if address.is_default_warehouse {
            clear_default(&self.store, &mut batch, &address.id).await?;
        }
        batch.update(&previous, &address)?;
        batch.commit().await?;

        info!(address = %address.id, "Address updated");
        Ok(address)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete(&self, actor: &Actor, id: &str) -> Result<(), AddressError> {
        actor.authorize::<ManageAddresses>()?;
        let id = ResourceGuard::verify(id, ADDRESS)?;
        if self.store.get::<Address>(&id).await?.is_none() {
            return Err(AddressError::not_found(&id));
        }

        let mut batch = self.store.batch();
        batch.delete::<Address>(&id);
        batch.commit().await?;

        info!(address = %id, "Address deleted");
        Ok(())
    }
}
