use crate::aggregate::{members, recompute};
use crate::{Consolidate, ConsolidationError, Consolidations, ViewConsolidations};
use chrono::{DateTime, Utc};
use fhub_kernel::codes::{random_code, with_unique_code};
use fhub_kernel::domain::constants::{
    CODE_SUFFIX_LEN, CONSOLIDATION, CONSOLIDATION_PREFIX, MIN_CONSOLIDATION_MEMBERS, PACKAGE,
};
use fhub_kernel::domain::models::{
    Consolidation, Package, PackageStatus, Shipment, ShipmentStatus,
};
use fhub_kernel::domain::security::Capabilities;
use fhub_kernel::record_id;
use fhub_kernel::security::{Actor, ResourceGuard};
use fhub_packages::workflow::{active_consolidations, carrying, holding, open_shipments, transition};
use fhub_store::{Batch, Column, Store, StoreError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsolidation {
    pub package_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPackage {
    pub package_id: String,
}

async fn ensure_enabled(store: &Store) -> Result<(), ConsolidationError> {
    if fhub_settings::current(store).await?.consolidation_enabled {
        Ok(())
    } else {
        Err(ConsolidationError::rule("consolidation is disabled"))
    }
}

/// Packages already spoken for, as seen when a membership change starts.
struct Claims {
    consolidations: Vec<Consolidation>,
    shipments: Vec<Shipment>,
}

impl Claims {
    async fn load(store: &Store) -> Result<Self, StoreError> {
        Ok(Self {
            consolidations: active_consolidations(store).await?,
            shipments: open_shipments(store).await?,
        })
    }

    /// Fails when `package_id` is a member of an active consolidation or
    /// travels on an open shipment. A status override back to `received`
    /// does not release either claim.
    fn ensure_free(&self, package_id: &str) -> Result<(), ConsolidationError> {
        if let Some(consolidation) = holding(&self.consolidations, package_id) {
            return Err(ConsolidationError::rule(format!(
                "package {package_id} is already in consolidation {}",
                consolidation.code
            )));
        }
        if let Some(shipment) = carrying(&self.shipments, package_id) {
            return Err(ConsolidationError::rule(format!(
                "package {package_id} is already on shipment {}",
                shipment.code
            )));
        }
        Ok(())
    }
}

/// A `received`, unclaimed package visible to `actor` and owned by `owner`
/// when given.
async fn eligible(
    store: &Store,
    claims: &Claims,
    actor: &Actor,
    package_id: &str,
    owner: Option<&str>,
) -> Result<Package, ConsolidationError> {
    let package = store
        .get::<Package>(package_id)
        .await?
        .filter(|p| actor.sees(&p.owner, Capabilities::VIEW_ALL_PACKAGES))
        .filter(|p| owner.is_none_or(|owner| p.owner == owner))
        .filter(|p| p.status == PackageStatus::Received)
        .ok_or_else(|| ConsolidationError::not_found(format!("no received package {package_id}")))?;
    claims.ensure_free(package_id)?;
    Ok(package)
}

/// Stages members still `waiting` back to `received`, recording `reason`.
///
/// Members whose status was overridden since they joined keep that status.
fn release(
    batch: &mut Batch,
    actor: &Actor,
    packages: &[Package],
    reason: &str,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    for package in packages {
        if package.status == PackageStatus::Waiting {
            transition(batch, package, PackageStatus::Received, actor, Some(reason), at)?;
        } else {
            debug!(package = %package.id, status = %package.status, "Member left as is");
        }
    }
    Ok(())
}

fn dissolve(consolidation: &mut Consolidation, at: DateTime<Utc>) {
    consolidation.package_ids.clear();
    consolidation.is_active = false;
    consolidation.total_weight = Decimal::ZERO;
    consolidation.total_value = Decimal::ZERO;
    consolidation.updated_at = at;
}

impl Consolidations {
    /// An active consolidation visible to `actor` and not yet handed to a shipment.
    async fn editable(&self, actor: &Actor, id: &str) -> Result<Consolidation, ConsolidationError> {
        let consolidation = self
            .store
            .get::<Consolidation>(id)
            .await?
            .filter(|c| c.is_active && actor.sees(&c.owner, Capabilities::VIEW_ALL_PACKAGES))
            .ok_or_else(|| ConsolidationError::not_found(format!("no active consolidation {id}")))?;
        let shipped = self
            .store
            .list_by::<Shipment>(Column::Parent, id)
            .await?
            .iter()
            .any(|s| s.status != ShipmentStatus::Cancelled);
        if shipped {
            return Err(ConsolidationError::rule("consolidation is already on a shipment"));
        }
        Ok(consolidation)
    }

    #[instrument(
        skip(self, actor, req),
        fields(actor = %actor.id, members = req.package_ids.len())
    )]
    pub async fn create(
        &self,
        actor: &Actor,
        req: CreateConsolidation,
    ) -> Result<Consolidation, ConsolidationError> {
        actor.authorize::<Consolidate>()?;
        if req.package_ids.len() < MIN_CONSOLIDATION_MEMBERS {
            return Err(ConsolidationError::rule(format!(
                "a consolidation needs at least {MIN_CONSOLIDATION_MEMBERS} packages"
            )));
        }
        let mut package_ids = Vec::with_capacity(req.package_ids.len());
        let mut seen = HashSet::new();
        for raw in &req.package_ids {
            let id = ResourceGuard::verify(raw, PACKAGE)?;
            if !seen.insert(id.clone()) {
                let message = format!("{id} is listed twice");
                return Err(ConsolidationError::invalid("packageIds", message));
            }
            package_ids.push(id);
        }

        ensure_enabled(&self.store).await?;
        let claims = Claims::load(&self.store).await?;
        let first = eligible(&self.store, &claims, actor, &package_ids[0], None).await?;
        let owner = first.owner.clone();
        let mut packages = vec![first];
        for id in &package_ids[1..] {
            packages.push(eligible(&self.store, &claims, actor, id, Some(&owner)).await?);
        }

        let now = Utc::now();
        let id = record_id!(CONSOLIDATION);
        let consolidation = with_unique_code(
            self.workflow.code_attempts,
            || random_code(CONSOLIDATION_PREFIX, CODE_SUFFIX_LEN),
            |code| {
                let mut consolidation = Consolidation {
                    id: id.clone(),
                    owner: owner.clone(),
                    code,
                    package_ids: package_ids.clone(),
                    total_weight: Decimal::ZERO,
                    total_value: Decimal::ZERO,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                let mut batch = self.store.batch();
                let packages = &packages;
                async move {
                    let message = format!("joined consolidation {}", consolidation.code);
                    let note = Some(message.as_str());
                    let mut waiting = Vec::with_capacity(packages.len());
                    for package in packages {
                        let status = PackageStatus::Waiting;
                        waiting.push(transition(&mut batch, package, status, actor, note, now)?);
                    }
                    recompute(&mut consolidation, &waiting, now);
                    batch.create(&consolidation)?;
                    batch.commit().await?;
                    Ok(consolidation)
                }
            },
        )
        .await?;

        info!(
            consolidation = %consolidation.id,
            code = %consolidation.code,
            weight = %consolidation.total_weight,
            "Consolidation created"
        );
        Ok(consolidation)
    }

    #[instrument(skip(self, actor, req), fields(actor = %actor.id, package = %req.package_id))]
    pub async fn add_package(
        &self,
        actor: &Actor,
        id: &str,
        req: AddPackage,
    ) -> Result<Consolidation, ConsolidationError> {
        actor.authorize::<Consolidate>()?;
        let id = ResourceGuard::verify(id, CONSOLIDATION)?;
        let package_id = ResourceGuard::verify(&req.package_id, PACKAGE)?;

        ensure_enabled(&self.store).await?;
        let previous = self.editable(actor, &id).await?;
        let claims = Claims::load(&self.store).await?;
        let package =
            eligible(&self.store, &claims, actor, &package_id, Some(&previous.owner)).await?;
        let mut packages = members(&self.store, &previous.package_ids).await?;

        let now = Utc::now();
        let mut consolidation = previous.clone();
        consolidation.package_ids.push(package_id);
        let message = format!("joined consolidation {}", consolidation.code);
        let mut batch = self.store.batch();
        let status = PackageStatus::Waiting;
        packages.push(transition(&mut batch, &package, status, actor, Some(&message), now)?);
        recompute(&mut consolidation, &packages, now);
        batch.update(&previous, &consolidation)?;
        batch.commit().await?;

        info!(
            consolidation = %consolidation.id,
            weight = %consolidation.total_weight,
            "Package added"
        );
        Ok(consolidation)
    }

    /// Removes one member; fewer than two remaining members dissolve the group.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn remove_package(
        &self,
        actor: &Actor,
        id: &str,
        package_id: &str,
    ) -> Result<Consolidation, ConsolidationError> {
        actor.authorize::<Consolidate>()?;
        let id = ResourceGuard::verify(id, CONSOLIDATION)?;
        let package_id = ResourceGuard::verify(package_id, PACKAGE)?;

        let previous = self.editable(actor, &id).await?;
        if !previous.contains(&package_id) {
            return Err(ConsolidationError::not_found(format!(
                "package {package_id} is not in consolidation {}",
                previous.code
            )));
        }
        let (leaving, staying): (Vec<Package>, Vec<Package>) =
            members(&self.store, &previous.package_ids)
                .await?
                .into_iter()
                .partition(|p| p.id == package_id);

        let now = Utc::now();
        let code = previous.code.clone();
        let mut consolidation = previous.clone();
        consolidation.package_ids.retain(|member| *member != package_id);
        let mut batch = self.store.batch();
        release(&mut batch, actor, &leaving, &format!("left consolidation {code}"), now)?;

        if consolidation.package_ids.len() < MIN_CONSOLIDATION_MEMBERS {
            debug!(
                consolidation = %id,
                remaining = consolidation.package_ids.len(),
                "Dissolving consolidation"
            );
            release(&mut batch, actor, &staying, &format!("consolidation {code} dissolved"), now)?;
            dissolve(&mut consolidation, now);
        } else {
            recompute(&mut consolidation, &staying, now);
        }
        batch.update(&previous, &consolidation)?;
        batch.commit().await?;

        info!(
            consolidation = %consolidation.id,
            active = consolidation.is_active,
            weight = %consolidation.total_weight,
            "Package removed"
        );
        Ok(consolidation)
    }

    /// Dissolves the consolidation: members still waiting return to
    /// `received` and the record stays, inactive.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete(
        &self,
        actor: &Actor,
        id: &str,
    ) -> Result<Consolidation, ConsolidationError> {
        actor.authorize::<Consolidate>()?;
        let id = ResourceGuard::verify(id, CONSOLIDATION)?;

        let previous = self.editable(actor, &id).await?;
        let packages = members(&self.store, &previous.package_ids).await?;
        let now = Utc::now();
        let mut consolidation = previous.clone();
        let reason = format!("consolidation {} dissolved", previous.code);
        let mut batch = self.store.batch();
        release(&mut batch, actor, &packages, &reason, now)?;
        dissolve(&mut consolidation, now);
        batch.update(&previous, &consolidation)?;
        batch.commit().await?;

        info!(consolidation = %consolidation.id, "Consolidation dissolved");
        Ok(consolidation)
    }

    /// Own consolidations, or all of them for actors that see every package;
    /// newest first.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Consolidation>, ConsolidationError> {
        actor.authorize::<ViewConsolidations>()?;
        let mut consolidations = if actor.can(Capabilities::VIEW_ALL_PACKAGES) {
            self.store.list::<Consolidation>().await?
        } else {
            self.store.list_by::<Consolidation>(Column::Owner, &actor.id).await?
        };
        consolidations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(consolidations)
    }

    pub async fn get(&self, actor: &Actor, id: &str) -> Result<Consolidation, ConsolidationError> {
        actor.authorize::<ViewConsolidations>()?;
        let id = ResourceGuard::verify(id, CONSOLIDATION)?;
        self.store
            .get::<Consolidation>(&id)
            .await?
            .filter(|c| actor.sees(&c.owner, Capabilities::VIEW_ALL_PACKAGES))
            .ok_or_else(|| ConsolidationError::not_found(id))
    }
}
