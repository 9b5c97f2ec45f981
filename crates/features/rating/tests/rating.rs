use chrono::Utc;
use fhub_domain::error::{Classify, ErrorKind};
use fhub_domain::models::{Settings, ShippingMode, ShippingRate};
use fhub_domain::security::Role;
use fhub_kernel::security::Actor;
use fhub_rating::{RateInput, RatingError, build, compose, lookup};
use fhub_store::Store;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn admin() -> Actor {
    Actor::new("user:admin", "Admin", Role::Admin)
}

fn client() -> Actor {
    Actor::new("user:client", "Client", Role::Client)
}

fn band(mode: ShippingMode, min: i64, max: i64, price: Decimal) -> RateInput {
    RateInput {
        mode,
        min_weight: Decimal::new(min, 0),
        max_weight: Decimal::new(max, 0),
        price_per_kg: price,
        delivery_days: 14,
        is_active: true,
    }
}

#[tokio::test]
async fn sea_quote_composes_fee_and_vat() {
    let rating = build(&Store::in_memory().await.unwrap());
    rating.create_rate(&admin(), band(ShippingMode::Sea, 0, 20, Decimal::TWO)).await.unwrap();

    let quote = rating.quote(&client(), ShippingMode::Sea, Decimal::TEN).await.unwrap();
    assert_eq!(quote.shipping_cost, Decimal::new(2000, 2));
    assert_eq!(quote.handling_fee, Decimal::new(200, 2));
    assert_eq!(quote.vat, Decimal::ZERO);
    assert_eq!(quote.total, Decimal::new(2200, 2));
    assert_eq!(quote.delivery_days, 14);
}

#[tokio::test]
async fn uncovered_weight_is_a_business_rule_failure() {
    let rating = build(&Store::in_memory().await.unwrap());
    rating.create_rate(&admin(), band(ShippingMode::Sea, 0, 20, Decimal::TWO)).await.unwrap();

    let err = rating.quote(&client(), ShippingMode::Sea, Decimal::new(25, 0)).await.unwrap_err();
    assert!(matches!(err, RatingError::NoRate { .. }));
    assert_eq!(err.kind(), ErrorKind::BusinessRule);

    let err = rating.quote(&client(), ShippingMode::Sea, Decimal::ZERO).await.unwrap_err();
    assert_eq!(err.field(), Some("weight"));
}

#[tokio::test]
async fn disabled_modes_are_not_quoted() {
    let store = Store::in_memory().await.unwrap();
    let rating = build(&store);
    rating.create_rate(&admin(), band(ShippingMode::Express, 0, 20, Decimal::TEN)).await.unwrap();

    let err = rating.quote(&client(), ShippingMode::Express, Decimal::ONE).await.unwrap_err();
    assert!(matches!(err, RatingError::ModeDisabled { .. }));

    let settings = fhub_settings::build(&store);
    let record = Settings { express_enabled: true, ..settings.active(&admin()).await.unwrap() };
    settings.save(&admin(), record, true).await.unwrap();
    assert!(rating.quote(&client(), ShippingMode::Express, Decimal::ONE).await.is_ok());
}

#[tokio::test]
async fn rate_management_is_admin_only_and_validated() {
    let rating = build(&Store::in_memory().await.unwrap());
    let air = |min, max| band(ShippingMode::Air, min, max, Decimal::ONE);

    let err = rating.create_rate(&client(), air(0, 5)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = rating.create_rate(&admin(), air(10, 5)).await.unwrap_err();
    assert_eq!(err.field(), Some("maxWeight"));

    let rate = rating.create_rate(&admin(), air(0, 5)).await.unwrap();
    let widened = rating.update_rate(&admin(), &rate.id, air(0, 8)).await.unwrap();
    assert_eq!(widened.max_weight, Decimal::new(8, 0));
    assert_eq!(widened.created_at, rate.created_at);

    rating.deactivate_rate(&admin(), &rate.id).await.unwrap();
    assert!(rating.list_rates(&client()).await.unwrap().is_empty());
    assert_eq!(rating.list_rates(&admin()).await.unwrap().len(), 1);
    assert!(rating.quote(&client(), ShippingMode::Air, Decimal::ONE).await.is_err());

    let err = rating.deactivate_rate(&admin(), "rate:missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

fn sea_band(price: Decimal) -> ShippingRate {
    ShippingRate {
        id: "rate:sea".to_owned(),
        mode: ShippingMode::Sea,
        min_weight: Decimal::ZERO,
        max_weight: Decimal::new(20, 0),
        price_per_kg: price,
        delivery_days: 21,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #[test]
    fn shipping_cost_is_price_times_weight(grams in 1_i64..=40_000, cents in 0_i64..=5_000) {
        let price = Decimal::new(cents, 2);
        let rates = [sea_band(price)];
        let weight = Decimal::new(grams, 3);

        match lookup(&rates, ShippingMode::Sea, weight) {
            Some(rate) => {
                prop_assert!(weight <= Decimal::new(20, 0));
                let quote = compose(rate, weight, Decimal::TWO, Decimal::ZERO);
                prop_assert_eq!(quote.shipping_cost, price * weight);
            },
            None => prop_assert!(weight > Decimal::new(20, 0)),
        }
    }
}
