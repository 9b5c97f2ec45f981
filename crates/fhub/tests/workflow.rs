use fhub::Platform;
use fhub::domain::models::{
    AddressKind, Country, DeliveryInfo, NotificationKind, PackageStatus, PaymentMethod,
    ShipmentStatus, ShippingMode,
};
use fhub::domain::security::Role;
use fhub::features::accounts::RegisterUser;
use fhub::features::addresses::AddressInput;
use fhub::features::consolidation::CreateConsolidation;
use fhub::features::packages::{DeliverPackage, PackageDetails, ProcessPackage};
use fhub::features::payments::{ConfirmPayment, NewPayment};
use fhub::features::rating::RateInput;
use fhub::features::shipments::{AdvanceShipment, CreateShipment};
use fhub::kernel::security::Actor;
use rust_decimal::Decimal;

fn staff(role: Role) -> Actor {
    Actor::new(format!("user:{role}"), role.to_string(), role)
}

fn advance(status: &str) -> AdvanceShipment {
    AdvanceShipment { status: status.to_owned(), ..AdvanceShipment::default() }
}

fn miami() -> AddressInput {
    AddressInput {
        kind: AddressKind::Warehouse,
        name: "ForwardHub Miami".to_owned(),
        country: Country::Us,
        city: "Doral".to_owned(),
        address_line1: "8400 NW 25th St".to_owned(),
        address_line2: None,
        state: Some("FL".to_owned()),
        postal_code: Some("33122".to_owned()),
        phone: "+13055550100".to_owned(),
        email: "mia@forwardhub.test".to_owned(),
        hours: "Mon-Fri 9:00-17:00".to_owned(),
        is_active: true,
        display_order: 0,
        is_default_warehouse: true,
        services: vec![],
    }
}

#[tokio::test]
async fn parcel_travels_from_announcement_to_hand_over() {
    let hub = Platform::in_memory().await.unwrap();
    let admin = staff(Role::Admin);
    let agent_in = staff(Role::AgentIn);
    let agent_out = staff(Role::AgentOut);

    let user = hub
        .accounts
        .register(
            None,
            RegisterUser {
                email: "nadine@example.com".to_owned(),
                first_name: "Nadine".to_owned(),
                last_name: "Charles".to_owned(),
                phone: Some("+509 3100 0000".to_owned()),
                role: None,
            },
        )
        .await
        .unwrap();
    let client = Actor::new(&user.id, user.full_name(), user.role);
    let mut rx = hub.notifier.subscribe();

    hub.addresses.create(&admin, miami()).await.unwrap();
    let block = hub.accounts.warehouse_address(&client, &user.id).await.unwrap();
    assert_eq!(block.addressee, format!("Nadine Charles #{}", user.customer_id));
    assert_eq!(block.street, "8400 NW 25th St");

    hub.rating
        .create_rate(
            &admin,
            RateInput {
                mode: ShippingMode::Air,
                min_weight: Decimal::ZERO,
                max_weight: Decimal::new(20, 0),
                price_per_kg: Decimal::new(600, 2),
                delivery_days: 5,
                is_active: true,
            },
        )
        .await
        .unwrap();

    let mut ids = Vec::new();
    for weight in [Decimal::new(15, 1), Decimal::new(25, 1)] {
        let details = PackageDetails {
            sender: "Shein".to_owned(),
            description: "Clothes".to_owned(),
            weight,
            ..PackageDetails::default()
        };
        let package = hub.packages.announce(&client, details).await.unwrap();
        hub.packages.process(&agent_in, &package.id, ProcessPackage::default()).await.unwrap();
        ids.push(package.id);
    }

    let consolidation = hub
        .consolidations
        .create(&client, CreateConsolidation { package_ids: ids.clone() })
        .await
        .unwrap();
    assert_eq!(consolidation.total_weight, Decimal::new(40, 1));

    let shipment = hub
        .shipments
        .create(
            &client,
            CreateShipment {
                consolidation_id: Some(consolidation.id.clone()),
                shipping_mode: ShippingMode::Air,
                delivery: DeliveryInfo {
                    address: "Delmas 33, Port-au-Prince".to_owned(),
                    recipient_name: "Nadine Charles".to_owned(),
                    recipient_phone: "+509 3100 0000".to_owned(),
                },
                ..CreateShipment::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(shipment.shipping_cost, Decimal::new(2400, 2));

    let stripe = NewPayment { method: PaymentMethod::Stripe, amount: None };
    let payment = hub.payments.create_payment(&client, &shipment.id, stripe).await.unwrap();
    hub.payments
        .confirm(&client, &payment.id, ConfirmPayment { transaction_id: "pi_123".to_owned() })
        .await
        .unwrap();

    for status in ["processing", "shipped", "in_transit", "delivered"] {
        hub.shipments.advance(&agent_out, &shipment.id, advance(status)).await.unwrap();
    }
    let delivered = hub.shipments.get(&client, &shipment.id).await.unwrap();
    assert_eq!(delivered.status, ShipmentStatus::Delivered);

    let hand_over = DeliverPackage {
        recipient_name: "Nadine Charles".to_owned(),
        recipient_id: "001-234-567".to_owned(),
        ..DeliverPackage::default()
    };
    hub.packages.deliver(&agent_out, &ids[0], hand_over).await.unwrap();

    let packages = hub.packages.list(&client).await.unwrap();
    let status_of = |id: &str| packages.iter().find(|p| p.id == id).map(|p| p.status);
    assert_eq!(status_of(&ids[0]), Some(PackageStatus::Delivered));
    assert_eq!(status_of(&ids[1]), Some(PackageStatus::Available));

    let mut kinds = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        kinds.push(notification.kind);
    }
    assert_eq!(
        kinds,
        [
            NotificationKind::PackageReceived,
            NotificationKind::PackageReceived,
            NotificationKind::ShipmentCreated,
            NotificationKind::PaymentReceived,
            NotificationKind::ShipmentShipped,
            NotificationKind::ShipmentDelivered,
        ]
    );
}

#[test]
fn every_slice_is_listed() {
    let slices = [
        "accounts",
        "addresses",
        "settings",
        "rating",
        "packages",
        "consolidation",
        "shipments",
        "payments",
    ];
    for name in slices {
        assert!(fhub::features::is_enabled(name), "{name} missing");
    }
}
