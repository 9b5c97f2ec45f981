use crate::input::non_empty;
use crate::workflow::{self, entry, record, transition, undelivered_count};
use crate::{
    AnnouncePackage, DeliverPackage, DeliverParcel, PackageDetails, PackageError, Packages,
    ProcessAnnounced, ProcessPackage, RegisterPackage, RegisterParcel, StatusUpdate,
    UpdatePackageStatus, ViewPackages,
};
use chrono::{DateTime, Utc};
use fhub_kernel::codes::{random_code, with_unique_code};
use fhub_kernel::domain::constants::{CODE_SUFFIX_LEN, DELIVERY, PACKAGE, TRACKING_PREFIX};
use fhub_kernel::domain::models::{
    AuditTrail, NotificationKind, Package, PackageDelivery, PackageStatus, Settings, ShippingMode,
};
use fhub_kernel::domain::security::{Capabilities, Role};
use fhub_kernel::record_id;
use fhub_kernel::security::{Actor, ResourceGuard};
use fhub_notify::{Notification, Outbox};
use fhub_store::{Column, Store};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// What anyone holding a tracking number may learn about a parcel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTracking {
    pub tracking_number: String,
    pub status: PackageStatus,
    pub shipping_mode: ShippingMode,
    pub announced_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

fn visible(actor: &Actor, package: &Package) -> bool {
    actor.sees(&package.owner, Capabilities::VIEW_ALL_PACKAGES)
}

fn received_notice(settings: &Settings, outbox: &mut Outbox, package: &Package) {
    outbox.push_if(
        settings.notifies(NotificationKind::PackageReceived),
        Notification::new(
            NotificationKind::PackageReceived,
            &package.owner,
            &package.tracking_number,
        ),
    );
}

async fn load(store: &Store, id: &str) -> Result<Package, PackageError> {
    store.get::<Package>(id).await?.ok_or_else(|| PackageError::not_found(id.to_owned()))
}

impl Packages {
    /// Stores a new package after the per-client limits of `settings`.
    async fn create(
        &self,
        settings: &Settings,
        actor: &Actor,
        owner: &str,
        details: PackageDetails,
        status: PackageStatus,
    ) -> Result<Package, PackageError> {
        details.validate(settings.max_package_weight_kg)?;
        let limit = usize::try_from(settings.max_packages_per_user).unwrap_or(usize::MAX);
        if undelivered_count(&self.store, owner).await? >= limit {
            return Err(PackageError::rule(format!(
                "client already holds {limit} undelivered packages"
            )));
        }

        let now = Utc::now();
        let received = status == PackageStatus::Received;
        let template = Package {
            id: record_id!(PACKAGE),
            owner: owner.to_owned(),
            tracking_number: String::new(),
            sender: details.sender.trim().to_owned(),
            description: details.description.trim().to_owned(),
            weight: details.weight,
            length: details.length,
            width: details.width,
            height: details.height,
            declared_value: details.declared_value,
            fragility: details.fragility,
            shipping_mode: details.shipping_mode,
            destination: details.destination.trim().to_owned(),
            status,
            announced_at: (!received).then_some(now),
            received_at: received.then_some(now),
            agent_in: received.then(|| actor.id.clone()),
            notes: non_empty(details.notes.as_deref()),
            created_at: now,
            updated_at: now,
        };
        let audit = entry(actor, &template.id, None, status, None, now);

        let package = with_unique_code(
            self.workflow.code_attempts,
            || random_code(TRACKING_PREFIX, CODE_SUFFIX_LEN),
            |tracking_number| {
                let package = Package { tracking_number, ..template.clone() };
                let mut batch = self.store.batch();
                let audit = &audit;
                async move {
                    batch.create(&package)?.create(audit)?;
                    batch.commit().await?;
                    Ok(package)
                }
            },
        )
        .await?;
        Ok(package)
    }

    /// A client announces a parcel on its way to the warehouse.
    #[instrument(skip(self, actor, details), fields(actor = %actor.id))]
    pub async fn announce(
        &self,
        actor: &Actor,
        details: PackageDetails,
    ) -> Result<Package, PackageError> {
        actor.authorize::<AnnouncePackage>()?;

        let settings = fhub_settings::current(&self.store).await?;
        let package =
            self.create(&settings, actor, &actor.id, details, PackageStatus::Announced).await?;

        info!(package = %package.id, tracking = %package.tracking_number, "Package announced");
        Ok(package)
    }

    /// An inbound agent registers a parcel that arrived unannounced.
    #[instrument(skip(self, actor, req), fields(actor = %actor.id))]
    pub async fn register(
        &self,
        actor: &Actor,
        req: RegisterPackage,
    ) -> Result<Package, PackageError> {
        actor.authorize::<RegisterParcel>()?;
        if req.details.weight <= Decimal::ZERO {
            return Err(PackageError::invalid("weight", "must be positive"));
        }

        let owner = fhub_accounts::by_email(&self.store, &req.client_email)
            .await?
            .filter(|user| user.role == Role::Client && user.is_active)
            .map(|user| user.id)
            .ok_or_else(|| PackageError::invalid("clientEmail", "no client with this email"))?;
        let settings = fhub_settings::current(&self.store).await?;
        let package =
            self.create(&settings, actor, &owner, req.details, PackageStatus::Received).await?;

        let mut outbox = Outbox::default();
        received_notice(&settings, &mut outbox, &package);
        self.notifier.flush(outbox);
        info!(
            package = %package.id,
            tracking = %package.tracking_number,
            owner = %package.owner,
            "Package registered"
        );
        Ok(package)
    }

    /// `announced -> received`, applying the measurements taken at the warehouse.
    #[instrument(skip(self, actor, input), fields(actor = %actor.id))]
    pub async fn process(
        &self,
        actor: &Actor,
        id: &str,
        input: ProcessPackage,
    ) -> Result<Package, PackageError> {
        actor.authorize::<ProcessAnnounced>()?;
        let id = ResourceGuard::verify(id, PACKAGE)?;
        let measures =
            [input.weight, input.length, input.width, input.height, input.declared_value];
        if measures.into_iter().flatten().any(|value| value.is_sign_negative()) {
            return Err(PackageError::invalid("weight", "measurements must not be negative"));
        }

        let settings = fhub_settings::current(&self.store).await?;
        if input.weight.is_some_and(|w| w > settings.max_package_weight_kg) {
            return Err(PackageError::invalid("weight", "exceeds the package weight limit"));
        }
        let previous = self
            .store
            .get::<Package>(&id)
            .await?
            .filter(|p| p.status == PackageStatus::Announced)
            .ok_or_else(|| PackageError::not_found(format!("no announced package {id}")))?;

        let now = Utc::now();
        let mut package = previous.clone();
        if let Some(weight) = input.weight {
            package.weight = weight;
        }
        if let Some(length) = input.length {
            package.length = length;
        }
        if let Some(width) = input.width {
            package.width = width;
        }
        if let Some(height) = input.height {
            package.height = height;
        }
        if let Some(value) = input.declared_value {
            package.declared_value = value;
        }
        if let Some(fragility) = input.fragility {
            package.fragility = fragility;
        }
        if let Some(mode) = input.shipping_mode {
            package.shipping_mode = mode;
        }
        if let Some(description) = non_empty(input.description.as_deref()) {
            package.description = description;
        }
        if let Some(notes) = non_empty(input.notes.as_deref()) {
            package.notes = Some(notes);
        }
        package.status = PackageStatus::Received;
        package.received_at = Some(now);
        package.agent_in = Some(actor.id.clone());
        package.updated_at = now;

        let mut batch = self.store.batch();
        record(&mut batch, &previous, &package, actor, Some("processed at warehouse"), now)?;
        batch.commit().await?;

        let mut outbox = Outbox::default();
        received_notice(&settings, &mut outbox, &package);
        self.notifier.flush(outbox);
        info!(package = %package.id, weight = %package.weight, "Announced package received");
        Ok(package)
    }

    /// Explicit status override by an inbound agent, with an optional note.
    #[instrument(skip(self, actor, update), fields(actor = %actor.id, status = %update.status))]
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: &str,
        update: StatusUpdate,
    ) -> Result<Package, PackageError> {
        actor.authorize::<UpdatePackageStatus>()?;
        let target = update.target()?;
        let id = ResourceGuard::verify(id, PACKAGE)?;
        let note = non_empty(update.notes.as_deref());

        let previous = load(&self.store, &id).await?;
        let from = previous.status;
        let arrived = target == PackageStatus::Received && from != PackageStatus::Received;
        let now = Utc::now();
        let mut package = Package { status: target, updated_at: now, ..previous.clone() };
        if arrived {
            package.received_at = Some(now);
            package.agent_in = Some(actor.id.clone());
        }

        let mut batch = self.store.batch();
        record(&mut batch, &previous, &package, actor, note.as_deref(), now)?;
        batch.commit().await?;

        if arrived {
            let settings = fhub_settings::current(&self.store).await?;
            let mut outbox = Outbox::default();
            received_notice(&settings, &mut outbox, &package);
            self.notifier.flush(outbox);
        }
        info!(package = %package.id, %from, to = %target, "Package status updated");
        Ok(package)
    }

    /// Hands an `available` package to its recipient.
    #[instrument(skip(self, actor, input), fields(actor = %actor.id))]
    pub async fn deliver(
        &self,
        actor: &Actor,
        id: &str,
        input: DeliverPackage,
    ) -> Result<PackageDelivery, PackageError> {
        actor.authorize::<DeliverParcel>()?;
        let id = ResourceGuard::verify(id, PACKAGE)?;
        let recipient_name = input.recipient_name.trim();
        if recipient_name.is_empty() {
            return Err(PackageError::invalid("recipientName", "must not be empty"));
        }
        if input.recipient_id.trim().is_empty() {
            return Err(PackageError::invalid("recipientId", "must not be empty"));
        }

        let package = load(&self.store, &id).await?;
        if package.status != PackageStatus::Available {
            return Err(PackageError::rule(format!(
                "package is {}, only available packages can be delivered",
                package.status
            )));
        }
        if self.store.find_by::<PackageDelivery>(Column::Parent, &id).await?.is_some() {
            return Err(PackageError::rule("package already has a delivery record"));
        }

        let now = Utc::now();
        let delivery = PackageDelivery {
            id: record_id!(DELIVERY),
            package_id: id.clone(),
            agent_out: actor.id.clone(),
            recipient_name: recipient_name.to_owned(),
            recipient_id: input.recipient_id.trim().to_owned(),
            signature: non_empty(input.signature.as_deref()),
            photo: non_empty(input.photo.as_deref()),
            notes: non_empty(input.notes.as_deref()),
            delivered_at: now,
        };
        let message = format!("handed to {recipient_name}");
        let mut batch = self.store.batch();
        batch.create(&delivery)?;
        transition(&mut batch, &package, PackageStatus::Delivered, actor, Some(&message), now)?;
        batch.commit().await?;

        info!(package = %delivery.package_id, delivery = %delivery.id, "Package delivered");
        Ok(delivery)
    }

    /// Own packages, or every package for actors that see them all; newest first.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Package>, PackageError> {
        actor.authorize::<ViewPackages>()?;
        let mut packages = if actor.can(Capabilities::VIEW_ALL_PACKAGES) {
            self.store.list::<Package>().await?
        } else {
            self.store.list_by::<Package>(Column::Owner, &actor.id).await?
        };
        packages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(packages)
    }

    /// The inbound agents' work queue: announced packages, latest announcement first.
    pub async fn announced(&self, actor: &Actor) -> Result<Vec<Package>, PackageError> {
        actor.authorize::<ProcessAnnounced>()?;
        let mut packages = self.store.list::<Package>().await?;
        packages.retain(|p| p.status == PackageStatus::Announced);
        packages.sort_by(|a, b| b.announced_at.cmp(&a.announced_at));
        Ok(packages)
    }

    pub async fn get(&self, actor: &Actor, id: &str) -> Result<Package, PackageError> {
        actor.authorize::<ViewPackages>()?;
        let id = ResourceGuard::verify(id, PACKAGE)?;
        self.store
            .get::<Package>(&id)
            .await?
            .filter(|p| visible(actor, p))
            .ok_or_else(|| PackageError::not_found(id))
    }

    /// The package's transition log, oldest first.
    pub async fn history(&self, actor: &Actor, id: &str) -> Result<AuditTrail, PackageError> {
        let package = self.get(actor, id).await?;
        Ok(workflow::history(&self.store, &package.id).await?)
    }

    /// Unauthenticated lookup by tracking number, when the settings allow it.
    #[instrument(skip(self))]
    pub async fn track(&self, tracking_number: &str) -> Result<PublicTracking, PackageError> {
        let code = tracking_number.trim().to_uppercase();
        if !fhub_settings::current(&self.store).await?.public_tracking_enabled {
            return Err(PackageError::rule("public tracking is disabled"));
        }
        let package = self
            .store
            .find_by::<Package>(Column::Code, &code)
            .await?
            .ok_or_else(|| PackageError::not_found(code))?;
        debug!(package = %package.id, "Tracking lookup");
        Ok(PublicTracking {
            tracking_number: package.tracking_number,
            status: package.status,
            shipping_mode: package.shipping_mode,
            announced_at: package.announced_at,
            received_at: package.received_at,
            updated_at: package.updated_at,
        })
    }
}
