//! Status transitions shared with the consolidation and shipment slices.
//!
//! Every change of a package's status is staged through [`transition`] or
//! [`record`], which add the audit entry to the same batch, so the append-only
//! trail stays complete whichever slice caused the change.

use chrono::{DateTime, Utc};
use fhub_kernel::domain::constants::AUDIT;
use fhub_kernel::domain::models::{
    AuditEntry, Consolidation, Package, PackageStatus, Shipment, ShipmentStatus,
};
use fhub_kernel::record_id;
use fhub_kernel::security::Actor;
use fhub_store::{Batch, Column, Store, StoreError};

pub fn entry(
    actor: &Actor,
    package_id: &str,
    from: Option<PackageStatus>,
    to: PackageStatus,
    message: Option<&str>,
    at: DateTime<Utc>,
) -> AuditEntry {
    AuditEntry {
        id: record_id!(AUDIT),
        package_id: package_id.to_owned(),
        at,
        actor_id: actor.id.clone(),
        actor_name: actor.name.clone(),
        from,
        to,
        message: message.map(ToOwned::to_owned),
    }
}

/// Stages `previous -> next` together with the audit entry of the status change.
///
/// The update is guarded on `previous`, so the batch fails if another writer
/// moved the package in the meantime.
pub fn record(
    batch: &mut Batch,
    previous: &Package,
    next: &Package,
    actor: &Actor,
    message: Option<&str>,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    batch.update(previous, next)?;
    batch.create(&entry(actor, &next.id, Some(previous.status), next.status, message, at))?;
    Ok(())
}

/// Stages moving `package` to `to` and returns the package as it will be stored.
pub fn transition(
    batch: &mut Batch,
    package: &Package,
    to: PackageStatus,
    actor: &Actor,
    message: Option<&str>,
    at: DateTime<Utc>,
) -> Result<Package, StoreError> {
    let next = Package { status: to, updated_at: at, ..package.clone() };
    record(batch, package, &next, actor, message, at)?;
    Ok(next)
}

/// Undelivered packages currently held by `owner`.
pub async fn undelivered_count(store: &Store, owner: &str) -> Result<usize, StoreError> {
    let packages = store.list_by::<Package>(Column::Owner, owner).await?;
    Ok(packages.iter().filter(|p| p.status != PackageStatus::Delivered).count())
}

/// Every shipment that still carries its packages (anything but cancelled).
pub async fn open_shipments(store: &Store) -> Result<Vec<Shipment>, StoreError> {
    let mut shipments = store.list::<Shipment>().await?;
    shipments.retain(|s| s.status != ShipmentStatus::Cancelled);
    Ok(shipments)
}

/// The shipment among `shipments` carrying `package_id`, if any.
#[must_use]
pub fn carrying<'a>(shipments: &'a [Shipment], package_id: &str) -> Option<&'a Shipment> {
    shipments.iter().find(|s| s.package_ids.iter().any(|id| id == package_id))
}

pub async fn active_consolidations(store: &Store) -> Result<Vec<Consolidation>, StoreError> {
    let mut consolidations = store.list::<Consolidation>().await?;
    consolidations.retain(|c| c.is_active);
    Ok(consolidations)
}

/// The consolidation among `consolidations` holding `package_id`, if any.
#[must_use]
pub fn holding<'a>(
    consolidations: &'a [Consolidation],
    package_id: &str,
) -> Option<&'a Consolidation> {
    consolidations.iter().find(|c| c.package_ids.iter().any(|id| id == package_id))
}

/// The audit trail of `package_id`, oldest first.
pub async fn history(store: &Store, package_id: &str) -> Result<Vec<AuditEntry>, StoreError> {
    let mut trail = store.list_by::<AuditEntry>(Column::Parent, package_id).await?;
    trail.sort_by_key(|e| e.at);
    Ok(trail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhub_kernel::domain::models::{Fragility, ShippingMode};
    use fhub_kernel::domain::security::Role;
    use rust_decimal::Decimal;

    fn parcel(status: PackageStatus) -> Package {
        let now = Utc::now();
        Package {
            id: "package:p1".to_owned(),
            owner: "user:c".to_owned(),
            tracking_number: "BP22223333".to_owned(),
            sender: String::new(),
            description: "Shoes".to_owned(),
            weight: Decimal::ONE,
            length: Decimal::ZERO,
            width: Decimal::ZERO,
            height: Decimal::ZERO,
            declared_value: Decimal::ZERO,
            fragility: Fragility::Normal,
            shipping_mode: ShippingMode::Sea,
            destination: String::new(),
            status,
            announced_at: None,
            received_at: None,
            agent_in: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn lost_race_leaves_no_audit_trace() {
        let store = Store::in_memory().await.unwrap();
        let actor = Actor::new("user:a", "Agent", Role::AgentIn);
        let package = parcel(PackageStatus::Received);
        let mut batch = store.batch();
        batch.create(&package).unwrap();
        batch.commit().await.unwrap();

        let mut batch = store.batch();
        let now = Utc::now();
        let moved = transition(&mut batch, &package, PackageStatus::Waiting, &actor, None, now);
        assert_eq!(moved.unwrap().status, PackageStatus::Waiting);
        batch.commit().await.unwrap();

        // Still holds the pre-transition body.
        let mut batch = store.batch();
        transition(&mut batch, &package, PackageStatus::InTransit, &actor, None, Utc::now())
            .unwrap();
        assert!(matches!(batch.commit().await, Err(StoreError::Stale { .. })));

        let trail = history(&store, &package.id).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].from, Some(PackageStatus::Received));
        assert_eq!(trail[0].to, PackageStatus::Waiting);
        let stored = store.get::<Package>(&package.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PackageStatus::Waiting);
    }
}
