//! Pure rate lookup and cost composition.

use fhub_kernel::domain::models::{ShippingMode, ShippingRate, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The active band of `mode` covering `weight` (bounds inclusive).
///
/// Overlapping bands resolve to the one with the lowest lower bound, then the
/// lowest id, so a weight sitting on a shared boundary always prices the same.
pub fn lookup<'a, I>(rates: I, mode: ShippingMode, weight: Decimal) -> Option<&'a ShippingRate>
where
    I: IntoIterator<Item = &'a ShippingRate>,
{
    rates
        .into_iter()
        .filter(|rate| rate.covers(mode, weight))
        .min_by(|a, b| a.min_weight.cmp(&b.min_weight).then_with(|| a.id.cmp(&b.id)))
}

/// `weight × price_per_kg` at full precision.
#[must_use]
pub fn base_cost(rate: &ShippingRate, weight: Decimal) -> Decimal {
    weight * rate.price_per_kg
}

/// Fee composition of a public quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub mode: ShippingMode,
    pub weight: Decimal,
    pub rate_id: String,
    pub price_per_kg: Decimal,
    pub delivery_days: u32,
    /// Unrounded `weight × price_per_kg`.
    pub shipping_cost: Decimal,
    pub handling_fee: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

/// `total = base + handling_fee + base × vat_rate / 100`.
///
/// Fee, VAT and total are rounded independently from full-precision inputs.
#[must_use]
pub fn compose(
    rate: &ShippingRate,
    weight: Decimal,
    handling_fee: Decimal,
    vat_rate: Decimal,
) -> Quote {
    let shipping_cost = base_cost(rate, weight);
    let vat = shipping_cost * vat_rate / Decimal::ONE_HUNDRED;
    let total = shipping_cost + handling_fee + vat;
    Quote {
        mode: rate.mode,
        weight,
        rate_id: rate.id.clone(),
        price_per_kg: rate.price_per_kg,
        delivery_days: rate.delivery_days,
        shipping_cost,
        handling_fee: round_money(handling_fee),
        vat: round_money(vat),
        total: round_money(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn band(id: &str, mode: ShippingMode, min: i64, max: i64, price: Decimal) -> ShippingRate {
        ShippingRate {
            id: id.to_owned(),
            mode,
            min_weight: Decimal::new(min, 0),
            max_weight: Decimal::new(max, 0),
            price_per_kg: price,
            delivery_days: 21,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn sea_quote_with_flat_fee_and_no_vat() {
        let rate = band("rate:sea", ShippingMode::Sea, 0, 20, Decimal::TWO);
        let quote = compose(&rate, Decimal::TEN, Decimal::TWO, Decimal::ZERO);
        assert_eq!(quote.shipping_cost, Decimal::new(2000, 2));
        assert_eq!(quote.handling_fee, Decimal::new(200, 2));
        assert_eq!(quote.total, Decimal::new(2200, 2));
    }

    #[test]
    fn vat_and_total_round_independently() {
        // 3.333 kg at 1.00/kg, 7.5% VAT: vat 0.249975 -> 0.25, total 5.582975 -> 5.58
        let rate = band("rate:air", ShippingMode::Air, 0, 10, Decimal::ONE);
        let quote = compose(&rate, Decimal::new(3333, 3), Decimal::TWO, Decimal::new(75, 1));
        assert_eq!(quote.vat, Decimal::new(25, 2));
        assert_eq!(quote.total, Decimal::new(558, 2));
        assert_eq!(quote.shipping_cost, Decimal::new(3333, 3));
    }

    #[test]
    fn lookup_respects_mode_activity_and_bounds() {
        let mut inactive = band("rate:c", ShippingMode::Sea, 0, 100, Decimal::ONE);
        inactive.is_active = false;
        let rates = [
            band("rate:b", ShippingMode::Sea, 20, 50, Decimal::ONE),
            band("rate:a", ShippingMode::Sea, 0, 20, Decimal::TWO),
            band("rate:x", ShippingMode::Air, 0, 50, Decimal::TEN),
            inactive,
        ];

        let id = |weight| lookup(&rates, ShippingMode::Sea, weight).map(|r| r.id.as_str());
        assert_eq!(id(Decimal::new(20, 0)), Some("rate:a"));
        assert_eq!(id(Decimal::new(21, 0)), Some("rate:b"));
        assert!(lookup(&rates, ShippingMode::Sea, Decimal::new(51, 0)).is_none());
        assert!(lookup(&rates, ShippingMode::Express, Decimal::ONE).is_none());
    }
}
