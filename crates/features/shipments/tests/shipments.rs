use fhub_accounts::RegisterUser;
use fhub_consolidation::CreateConsolidation;
use fhub_domain::config::{MissingRatePolicy, WorkflowConfig};
use fhub_domain::error::{Classify, ErrorKind};
use fhub_domain::models::{
    DeliveryInfo, NotificationKind, Package, PackageStatus, Shipment, ShipmentStatus, ShippingMode,
};
use fhub_domain::security::Role;
use fhub_kernel::security::Actor;
use fhub_notify::{NotificationReceiverExt, Notifier};
use fhub_packages::{PackageDetails, RegisterPackage, StatusUpdate};
use fhub_rating::RateInput;
use fhub_shipments::{AdvanceShipment, CreateShipment, ShipmentError, Shipments};
use fhub_store::Store;
use rust_decimal::Decimal;

const EMAIL: &str = "rose@example.com";

struct Hub {
    store: Store,
    notifier: Notifier,
    workflow: WorkflowConfig,
    client: Actor,
}

fn admin() -> Actor {
    Actor::new("user:admin", "Admin", Role::Admin)
}

fn agent_in() -> Actor {
    Actor::new("user:agent-in", "Inbound", Role::AgentIn)
}

fn agent_out() -> Actor {
    Actor::new("user:agent-out", "Outbound", Role::AgentOut)
}

impl Hub {
    async fn new(missing_rate: MissingRatePolicy) -> Self {
        let store = Store::in_memory().await.unwrap();
        let notifier = Notifier::new();
        let workflow = WorkflowConfig { missing_rate, ..WorkflowConfig::default() };
        let user = fhub_accounts::build(&store, &notifier, &workflow)
            .register(
                None,
                RegisterUser {
                    email: EMAIL.to_owned(),
                    first_name: "Rose".to_owned(),
                    last_name: "Joseph".to_owned(),
                    phone: None,
                    role: None,
                },
            )
            .await
            .unwrap();
        let client = Actor::new(user.id, "Rose Joseph", Role::Client);
        Self { store, notifier, workflow, client }
    }

    fn shipments(&self) -> Shipments {
        fhub_shipments::build(&self.store, &self.notifier, &self.workflow)
    }

    async fn received(&self, weight: Decimal) -> Package {
        let details =
            PackageDetails { description: "Box".to_owned(), weight, ..PackageDetails::default() };
        let req = RegisterPackage { client_email: EMAIL.to_owned(), details };
        fhub_packages::build(&self.store, &self.notifier, &self.workflow)
            .register(&agent_in(), req)
            .await
            .unwrap()
    }

    async fn sea_band(&self, price: Decimal) {
        let band = RateInput {
            mode: ShippingMode::Sea,
            min_weight: Decimal::ZERO,
            max_weight: Decimal::new(100, 0),
            price_per_kg: price,
            delivery_days: 21,
            is_active: true,
        };
        fhub_rating::build(&self.store).create_rate(&admin(), band).await.unwrap();
    }

    async fn status(&self, id: &str) -> PackageStatus {
        self.store.get::<Package>(id).await.unwrap().unwrap().status
    }

    async fn mark_paid(&self, id: &str) {
        let previous = self.store.get::<Shipment>(id).await.unwrap().unwrap();
        let mut paid = previous.clone();
        paid.enter(ShipmentStatus::Paid, chrono::Utc::now());
        let mut batch = self.store.batch();
        batch.update(&previous, &paid).unwrap();
        batch.commit().await.unwrap();
    }
}

fn delivery() -> DeliveryInfo {
    DeliveryInfo {
        address: "8 Rue Pavée, Cap-Haïtien".to_owned(),
        recipient_name: "Rose Joseph".to_owned(),
        recipient_phone: "+509 3400 0000".to_owned(),
    }
}

fn from_packages(packages: &[&Package], mode: ShippingMode) -> CreateShipment {
    CreateShipment {
        package_ids: Some(packages.iter().map(|p| p.id.clone()).collect()),
        shipping_mode: mode,
        insurance_cost: Decimal::new(550, 2),
        delivery: delivery(),
        ..CreateShipment::default()
    }
}

#[tokio::test]
async fn loose_packages_are_rated_and_announced() {
    let hub = Hub::new(MissingRatePolicy::Reject).await;
    hub.sea_band(Decimal::new(250, 2)).await;
    let a = hub.received(Decimal::new(40, 1)).await;
    let b = hub.received(Decimal::new(35, 1)).await;
    let mut rx = hub.notifier.subscribe();

    let req = from_packages(&[&a, &b], ShippingMode::Sea);
    let shipment = hub.shipments().create(&hub.client, req).await.unwrap();
    assert!(shipment.code.starts_with("SH"));
    assert_eq!(shipment.code.len(), 10);
    assert_eq!(shipment.total_weight, Decimal::new(75, 1));
    assert_eq!(shipment.shipping_cost, Decimal::new(1875, 2));
    assert_eq!(shipment.total_cost, shipment.shipping_cost + shipment.insurance_cost);
    assert_eq!(shipment.status, ShipmentStatus::Pending);
    assert!(shipment.rate_id.is_some());
    let status = hub.status(&a.id).await;
    assert_eq!(status, PackageStatus::Received, "loose packages keep their status");

    let notification = rx.next().await.unwrap();
    assert_eq!(notification.kind, NotificationKind::ShipmentCreated);
    assert_eq!(notification.subject, shipment.code);

    let req = from_packages(&[&a], ShippingMode::Sea);
    let err = hub.shipments().create(&hub.client, req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);

    hub.shipments().cancel(&hub.client, &shipment.id).await.unwrap();
    let req = from_packages(&[&a], ShippingMode::Sea);
    assert!(hub.shipments().create(&hub.client, req).await.is_ok());
}

#[tokio::test]
async fn missing_rate_rejects_by_default() {
    let hub = Hub::new(MissingRatePolicy::Reject).await;
    let a = hub.received(Decimal::TWO).await;

    let req = from_packages(&[&a], ShippingMode::Air);
    let err = hub.shipments().create(&hub.client, req).await.unwrap_err();
    assert!(matches!(err, ShipmentError::NoRate { mode: ShippingMode::Air, .. }));
    assert_eq!(err.kind(), ErrorKind::BusinessRule);
    assert!(hub.store.list::<Shipment>().await.unwrap().is_empty());
}

#[tokio::test]
async fn consolidation_without_rate_ships_at_zero_cost() {
    let hub = Hub::new(MissingRatePolicy::ZeroCost).await;
    let mut members = Vec::new();
    for weight in [Decimal::new(20, 1), Decimal::new(30, 1), Decimal::new(15, 1)] {
        members.push(hub.received(weight).await.id);
    }
    let consolidation = fhub_consolidation::build(&hub.store, &hub.workflow)
        .create(&hub.client, CreateConsolidation { package_ids: members })
        .await
        .unwrap();
    assert_eq!(consolidation.total_weight, Decimal::new(65, 1));

    let req = CreateShipment {
        consolidation_id: Some(consolidation.id.clone()),
        shipping_mode: ShippingMode::Air,
        delivery: delivery(),
        ..CreateShipment::default()
    };
    let shipment = hub.shipments().create(&hub.client, req.clone()).await.unwrap();
    assert_eq!(shipment.total_weight, Decimal::new(65, 1));
    assert_eq!(shipment.shipping_cost, Decimal::ZERO);
    assert_eq!(shipment.total_cost, Decimal::ZERO);
    assert!(shipment.rate_id.is_none());
    assert_eq!(shipment.package_ids, consolidation.package_ids);

    let err = hub.shipments().create(&hub.client, req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);
}

#[tokio::test]
async fn consolidated_package_cannot_ship_loose_after_an_override() {
    let hub = Hub::new(MissingRatePolicy::ZeroCost).await;
    let p0 = hub.received(Decimal::ONE).await;
    let p1 = hub.received(Decimal::ONE).await;
    let c1 = fhub_consolidation::build(&hub.store, &hub.workflow)
        .create(&hub.client, CreateConsolidation { package_ids: vec![p0.id.clone(), p1.id] })
        .await
        .unwrap();

    let update = StatusUpdate { status: "received".to_owned(), notes: None };
    fhub_packages::build(&hub.store, &hub.notifier, &hub.workflow)
        .update_status(&agent_in(), &p0.id, update)
        .await
        .unwrap();

    let req = from_packages(&[&p0], ShippingMode::Sea);
    let err = hub.shipments().create(&hub.client, req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);
    assert!(err.to_string().contains(&c1.code));

    let req = CreateShipment {
        consolidation_id: Some(c1.id.clone()),
        delivery: delivery(),
        ..CreateShipment::default()
    };
    let shipment = hub.shipments().create(&hub.client, req).await.unwrap();
    let carrying_p0 = hub
        .store
        .list::<Shipment>()
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.package_ids.contains(&p0.id))
        .count();
    assert_eq!(carrying_p0, 1);
    assert_eq!(shipment.consolidation_id.as_deref(), Some(c1.id.as_str()));
}

#[tokio::test]
async fn source_and_ownership_are_checked() {
    let hub = Hub::new(MissingRatePolicy::ZeroCost).await;
    let a = hub.received(Decimal::ONE).await;

    let both = CreateShipment {
        consolidation_id: Some("consolidation:abc".to_owned()),
        ..from_packages(&[&a], ShippingMode::Sea)
    };
    let err = hub.shipments().create(&hub.client, both).await.unwrap_err();
    assert_eq!(err.field(), Some("source"));

    let stranger = Actor::new("user:stranger", "Stranger", Role::Client);
    let req = from_packages(&[&a], ShippingMode::Sea);
    let err = hub.shipments().create(&stranger, req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let req = from_packages(&[&a], ShippingMode::Sea);
    let shipment = hub.shipments().create(&hub.client, req).await.unwrap();
    let err = hub.shipments().get(&stranger, &shipment.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(hub.shipments().list(&agent_out()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn agents_carry_paid_shipments_to_delivery() {
    let hub = Hub::new(MissingRatePolicy::ZeroCost).await;
    let a = hub.received(Decimal::ONE).await;
    let b = hub.received(Decimal::TWO).await;
    let shipments = hub.shipments();
    let req = from_packages(&[&a, &b], ShippingMode::Sea);
    let shipment = shipments.create(&hub.client, req).await.unwrap();

    let step = |status: &str| AdvanceShipment {
        status: status.to_owned(),
        carrier_tracking: Some("DHL-778".to_owned()),
        notes: None,
    };
    let err = shipments.advance(&agent_out(), &shipment.id, step("processing")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);
    let err = shipments.advance(&hub.client, &shipment.id, step("processing")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    hub.mark_paid(&shipment.id).await;
    let mut rx = hub.notifier.subscribe();

    let shipped = shipments.advance(&agent_out(), &shipment.id, step("shipped")).await.unwrap();
    assert!(shipped.shipped_at.is_some());
    assert_eq!(shipped.carrier_tracking.as_deref(), Some("DHL-778"));
    assert_eq!(hub.status(&a.id).await, PackageStatus::InTransit);
    assert_eq!(rx.next().await.unwrap().kind, NotificationKind::ShipmentShipped);

    shipments.advance(&agent_out(), &shipment.id, step("in_transit")).await.unwrap();
    let err = shipments.advance(&agent_out(), &shipment.id, step("shipped")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);

    let delivered = shipments.advance(&agent_out(), &shipment.id, step("delivered")).await.unwrap();
    assert!(delivered.delivered_at.is_some());
    assert_eq!(delivered.shipped_at, shipped.shipped_at);
    assert_eq!(hub.status(&b.id).await, PackageStatus::Available);
    assert_eq!(rx.next().await.unwrap().kind, NotificationKind::ShipmentDelivered);

    let trail = fhub_packages::build(&hub.store, &hub.notifier, &hub.workflow)
        .history(&hub.client, &a.id)
        .await
        .unwrap();
    let tail: Vec<_> = trail.iter().skip(1).map(|e| e.to).collect();
    assert_eq!(tail, [PackageStatus::InTransit, PackageStatus::Available]);
}
