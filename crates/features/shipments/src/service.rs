use crate::input::Source;
use crate::{
    AdvanceShipment, AdvanceShipments, CancelShipment, CreateShipment, CreateShipments,
    MissingRatePolicy, ShipmentError, Shipments, ViewShipments,
};
use chrono::{DateTime, Utc};
use fhub_kernel::codes::{random_code, with_unique_code};
use fhub_kernel::domain::constants::{
    CODE_SUFFIX_LEN, CONSOLIDATION, PACKAGE, SHIPMENT, SHIPMENT_PREFIX,
};
use fhub_kernel::domain::models::{
    Consolidation, NotificationKind, Package, PackageStatus, Shipment, ShipmentStatus,
    ShippingMode, ShippingRate, round_money,
};
use fhub_kernel::domain::security::Capabilities;
use fhub_kernel::record_id;
use fhub_kernel::security::{Actor, ResourceGuard};
use fhub_notify::{Notification, Outbox};
use fhub_packages::workflow::{active_consolidations, carrying, holding, open_shipments, transition};
use fhub_rating::{base_cost, lookup};
use fhub_store::{Batch, Column, Store, StoreError};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Constituents resolved from a [`Source`].
struct Contents {
    owner: String,
    package_ids: Vec<String>,
    consolidation_id: Option<String>,
    weight: Decimal,
}

/// Fails when any of `package_ids` already travels on one of `shipments`.
fn ensure_unshipped(shipments: &[Shipment], package_ids: &[String]) -> Result<(), ShipmentError> {
    for id in package_ids {
        if let Some(shipment) = carrying(shipments, id) {
            return Err(ShipmentError::rule(format!(
                "package {id} is already on shipment {}",
                shipment.code
            )));
        }
    }
    Ok(())
}

async fn loose(store: &Store, actor: &Actor, ids: &[String]) -> Result<Contents, ShipmentError> {
    let consolidations = active_consolidations(store).await?;
    let mut owner: Option<String> = None;
    let mut weight = Decimal::ZERO;
    for id in ids {
        let package = store
            .get::<Package>(id)
            .await?
            .filter(|p| actor.sees(&p.owner, Capabilities::VIEW_ALL_PACKAGES))
            .filter(|p| owner.as_deref().is_none_or(|owner| p.owner == owner))
            .filter(|p| p.status == PackageStatus::Received)
            .ok_or_else(|| ShipmentError::not_found(format!("no received package {id}")))?;
        if let Some(consolidation) = holding(&consolidations, id) {
            return Err(ShipmentError::rule(format!(
                "package {id} belongs to consolidation {}, ship the consolidation instead",
                consolidation.code
            )));
        }
        owner.get_or_insert(package.owner);
        weight += package.weight;
    }
    ensure_unshipped(&open_shipments(store).await?, ids)?;
    let owner = owner.ok_or_else(|| ShipmentError::invalid("packageIds", "must not be empty"))?;
    Ok(Contents { owner, package_ids: ids.to_vec(), consolidation_id: None, weight })
}

async fn consolidated(store: &Store, actor: &Actor, id: &str) -> Result<Contents, ShipmentError> {
    let consolidation = store
        .get::<Consolidation>(id)
        .await?
        .filter(|c| c.is_active && actor.sees(&c.owner, Capabilities::VIEW_ALL_PACKAGES))
        .ok_or_else(|| ShipmentError::not_found(format!("no active consolidation {id}")))?;
    let shipments = open_shipments(store).await?;
    let taken = shipments.iter().find(|s| s.consolidation_id.as_deref() == Some(id));
    if let Some(shipment) = taken {
        return Err(ShipmentError::rule(format!(
            "consolidation {} is already on shipment {}",
            consolidation.code, shipment.code
        )));
    }
    ensure_unshipped(&shipments, &consolidation.package_ids)?;
    Ok(Contents {
        owner: consolidation.owner,
        package_ids: consolidation.package_ids,
        consolidation_id: Some(consolidation.id),
        weight: consolidation.total_weight,
    })
}

/// Whether an agent may move a shipment from `from` to `to`.
///
/// Moves are forward only. `paid` is entered exclusively through payment
/// confirmation, so a `pending` shipment can only be cancelled here.
pub(crate) fn check_advance(from: ShipmentStatus, to: ShipmentStatus) -> Result<(), ShipmentError> {
    if from.is_terminal() {
        return Err(ShipmentError::rule(format!("shipment is already {from}")));
    }
    if to == ShipmentStatus::Cancelled {
        return if from.is_cancellable() {
            Ok(())
        } else {
            Err(ShipmentError::rule(format!("a {from} shipment can no longer be cancelled")))
        };
    }
    if to == ShipmentStatus::Paid {
        return Err(ShipmentError::rule("only a confirmed payment marks a shipment paid"));
    }
    if from == ShipmentStatus::Pending {
        return Err(ShipmentError::rule("shipment is awaiting payment"));
    }
    match (from.stage(), to.stage()) {
        (Some(current), Some(next)) if next > current => Ok(()),
        _ => Err(ShipmentError::rule(format!("cannot move a shipment from {from} to {to}"))),
    }
}

/// Package status that follows a shipment entering `status`.
const fn package_status(status: ShipmentStatus) -> Option<PackageStatus> {
    match status {
        ShipmentStatus::Shipped | ShipmentStatus::InTransit => Some(PackageStatus::InTransit),
        ShipmentStatus::Delivered => Some(PackageStatus::Available),
        _ => None,
    }
}

/// Stages the constituent packages following `shipment` into its new status.
async fn cascade(
    store: &Store,
    batch: &mut Batch,
    actor: &Actor,
    shipment: &Shipment,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    let Some(target) = package_status(shipment.status) else {
        return Ok(());
    };
    let message = format!("shipment {} {}", shipment.code, shipment.status);
    for id in &shipment.package_ids {
        if let Some(package) = store.get::<Package>(id).await?
            && package.status != target
        {
            transition(batch, &package, target, actor, Some(&message), at)?;
        }
    }
    debug!(
        shipment = %shipment.id,
        packages = shipment.package_ids.len(),
        %target,
        "Packages followed shipment"
    );
    Ok(())
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(ToOwned::to_owned)
}

impl Shipments {
    /// `(shipping_cost, rate_id)` for the weight, under the missing-rate policy.
    async fn price(
        &self,
        mode: ShippingMode,
        weight: Decimal,
    ) -> Result<(Decimal, Option<String>), ShipmentError> {
        let rates = self.store.list::<ShippingRate>().await?;
        if let Some(rate) = lookup(&rates, mode, weight) {
            return Ok((round_money(base_cost(rate, weight)), Some(rate.id.clone())));
        }
        match self.workflow.missing_rate {
            MissingRatePolicy::Reject => Err(ShipmentError::NoRate { mode, weight, context: None }),
            MissingRatePolicy::ZeroCost => {
                warn!(%mode, %weight, "No rate band covers the shipment; pricing it at zero");
                Ok((Decimal::ZERO, None))
            },
        }
    }

    async fn visible(&self, actor: &Actor, id: &str) -> Result<Shipment, ShipmentError> {
        self.store
            .get::<Shipment>(id)
            .await?
            .filter(|s| actor.sees(&s.owner, Capabilities::VIEW_ALL_SHIPMENTS))
            .ok_or_else(|| ShipmentError::not_found(id.to_owned()))
    }

    #[instrument(skip(self, actor, req), fields(actor = %actor.id, mode = %req.shipping_mode))]
    pub async fn create(
        &self,
        actor: &Actor,
        req: CreateShipment,
    ) -> Result<Shipment, ShipmentError> {
        actor.authorize::<CreateShipments>()?;
        let source = match req.source()? {
            Source::Packages(raw) => {
                let mut seen = HashSet::new();
                let mut ids = Vec::with_capacity(raw.len());
                for id in &raw {
                    let id = ResourceGuard::verify(id, PACKAGE)?;
                    if !seen.insert(id.clone()) {
                        let message = format!("{id} is listed twice");
                        return Err(ShipmentError::invalid("packageIds", message));
                    }
                    ids.push(id);
                }
                Source::Packages(ids)
            },
            Source::Consolidation(id) => {
                Source::Consolidation(ResourceGuard::verify(&id, CONSOLIDATION)?)
            },
        };
        req.validate()?;

        let settings = fhub_settings::current(&self.store).await?;
        if !settings.mode_enabled(req.shipping_mode) {
            let message = format!("{} shipping is disabled", req.shipping_mode);
            return Err(ShipmentError::rule(message));
        }
        let contents = match &source {
            Source::Packages(ids) => loose(&self.store, actor, ids).await?,
            Source::Consolidation(id) => consolidated(&self.store, actor, id).await?,
        };
        let (shipping_cost, rate_id) = self.price(req.shipping_mode, contents.weight).await?;

        let now = Utc::now();
        let mut template = Shipment {
            id: record_id!(SHIPMENT),
            owner: contents.owner,
            code: String::new(),
            package_ids: contents.package_ids,
            consolidation_id: contents.consolidation_id,
            shipping_mode: req.shipping_mode,
            total_weight: contents.weight,
            shipping_cost: Decimal::ZERO,
            insurance_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            rate_id,
            delivery: req.delivery.clone(),
            status: ShipmentStatus::Pending,
            carrier_tracking: None,
            notes: trimmed(req.notes.as_deref()),
            created_at: now,
            paid_at: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            updated_at: now,
        };
        template.set_costs(shipping_cost, req.insurance_cost);

        let shipment = with_unique_code(
            self.workflow.code_attempts,
            || random_code(SHIPMENT_PREFIX, CODE_SUFFIX_LEN),
            |code| {
                let shipment = Shipment { code, ..template.clone() };
                let mut batch = self.store.batch();
                async move {
                    batch.create(&shipment)?;
                    batch.commit().await?;
                    Ok(shipment)
                }
            },
        )
        .await?;

        let mut outbox = Outbox::default();
        outbox.push_if(
            settings.notifies(NotificationKind::ShipmentCreated),
            Notification::new(NotificationKind::ShipmentCreated, &shipment.owner, &shipment.code),
        );
        self.notifier.flush(outbox);
        info!(
            shipment = %shipment.id,
            code = %shipment.code,
            weight = %shipment.total_weight,
            total = %shipment.total_cost,
            "Shipment created"
        );
        Ok(shipment)
    }

    /// Agent-driven lifecycle move; constituent packages follow.
    #[instrument(skip(self, actor, req), fields(actor = %actor.id, status = %req.status))]
    pub async fn advance(
        &self,
        actor: &Actor,
        id: &str,
        req: AdvanceShipment,
    ) -> Result<Shipment, ShipmentError> {
        actor.authorize::<AdvanceShipments>()?;
        let target = req.target()?;
        let id = ResourceGuard::verify(id, SHIPMENT)?;

        let previous = self.visible(actor, &id).await?;
        let from = previous.status;
        check_advance(from, target)?;

        let now = Utc::now();
        let mut shipment = previous.clone();
        let newly_shipped = shipment.shipped_at.is_none();
        shipment.enter(target, now);
        if let Some(reference) = trimmed(req.carrier_tracking.as_deref()) {
            shipment.carrier_tracking = Some(reference);
        }
        if let Some(note) = trimmed(req.notes.as_deref()) {
            shipment.notes = Some(note);
        }

        let mut batch = self.store.batch();
        batch.update(&previous, &shipment)?;
        cascade(&self.store, &mut batch, actor, &shipment, now).await?;
        batch.commit().await?;

        let settings = fhub_settings::current(&self.store).await?;
        let (owner, code) = (&shipment.owner, &shipment.code);
        let mut outbox = Outbox::default();
        outbox.push_if(
            newly_shipped
                && shipment.shipped_at.is_some()
                && settings.notifies(NotificationKind::ShipmentShipped),
            Notification::new(NotificationKind::ShipmentShipped, owner, code),
        );
        outbox.push_if(
            target == ShipmentStatus::Delivered
                && settings.notifies(NotificationKind::ShipmentDelivered),
            Notification::new(NotificationKind::ShipmentDelivered, owner, code),
        );
        self.notifier.flush(outbox);
        info!(shipment = %shipment.id, %from, to = %target, "Shipment advanced");
        Ok(shipment)
    }

    /// The owner withdraws a shipment that has not been paid yet.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn cancel(&self, actor: &Actor, id: &str) -> Result<Shipment, ShipmentError> {
        actor.authorize::<CancelShipment>()?;
        let id = ResourceGuard::verify(id, SHIPMENT)?;

        let previous = self.visible(actor, &id).await?;
        if previous.status != ShipmentStatus::Pending {
            return Err(ShipmentError::rule(format!(
                "only pending shipments can be cancelled, this one is {}",
                previous.status
            )));
        }
        let mut shipment = previous.clone();
        shipment.enter(ShipmentStatus::Cancelled, Utc::now());
        let mut batch = self.store.batch();
        batch.update(&previous, &shipment)?;
        batch.commit().await?;

        info!(shipment = %shipment.id, "Shipment cancelled");
        Ok(shipment)
    }

    /// Own shipments, or every shipment for actors that see them all; newest first.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Shipment>, ShipmentError> {
        actor.authorize::<ViewShipments>()?;
        let mut shipments = if actor.can(Capabilities::VIEW_ALL_SHIPMENTS) {
            self.store.list::<Shipment>().await?
        } else {
            self.store.list_by::<Shipment>(Column::Owner, &actor.id).await?
        };
        shipments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(shipments)
    }

    pub async fn get(&self, actor: &Actor, id: &str) -> Result<Shipment, ShipmentError> {
        actor.authorize::<ViewShipments>()?;
        let id = ResourceGuard::verify(id, SHIPMENT)?;
        self.visible(actor, &id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhub_kernel::domain::error::{Classify, ErrorKind};
    use fhub_kernel::domain::models::DeliveryInfo;

    #[test]
    fn pending_only_leaves_through_payment_or_cancellation() {
        use ShipmentStatus::*;
        assert!(check_advance(Pending, Processing).is_err());
        assert!(check_advance(Pending, Paid).is_err());
        assert!(check_advance(Pending, Cancelled).is_ok());
        assert!(check_advance(Paid, Processing).is_ok());
        assert!(check_advance(Paid, InTransit).is_ok());
    }

    #[test]
    fn moves_are_forward_only_and_stop_at_terminal_states() {
        use ShipmentStatus::*;
        let err = check_advance(Shipped, Processing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BusinessRule);
        assert!(check_advance(Shipped, Shipped).is_err());
        assert!(check_advance(Shipped, Cancelled).is_err());
        assert!(check_advance(Delivered, Cancelled).is_err());
        assert!(check_advance(Cancelled, Processing).is_err());
        assert!(check_advance(InTransit, Delivered).is_ok());
    }

    #[test]
    fn packages_follow_carrier_stages() {
        assert_eq!(package_status(ShipmentStatus::Shipped), Some(PackageStatus::InTransit));
        assert_eq!(package_status(ShipmentStatus::Delivered), Some(PackageStatus::Available));
        assert_eq!(package_status(ShipmentStatus::Cancelled), None);
    }

    #[test]
    fn members_already_travelling_block_a_consolidated_shipment() {
        let now = Utc::now();
        let other = Shipment {
            id: "shipment:s1".to_owned(),
            owner: "user:c".to_owned(),
            code: "SHP22223333".to_owned(),
            package_ids: vec!["package:p0".to_owned()],
            consolidation_id: None,
            shipping_mode: ShippingMode::Sea,
            total_weight: Decimal::ONE,
            shipping_cost: Decimal::ZERO,
            insurance_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            rate_id: None,
            delivery: DeliveryInfo::default(),
            status: ShipmentStatus::Paid,
            carrier_tracking: None,
            notes: None,
            created_at: now,
            paid_at: Some(now),
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            updated_at: now,
        };
        let members = vec!["package:p0".to_owned(), "package:p1".to_owned()];

        let err = ensure_unshipped(std::slice::from_ref(&other), &members).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BusinessRule);
        assert!(err.to_string().contains("SHP22223333"));
        assert!(ensure_unshipped(&[other], &members[1..]).is_ok());
        assert!(ensure_unshipped(&[], &members).is_ok());
    }
}
