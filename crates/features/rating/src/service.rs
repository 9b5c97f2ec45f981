use crate::engine::{Quote, compose, lookup};
use crate::{ManageRates, QuoteShipping, Rating, RatingError};
use chrono::Utc;
use fhub_kernel::domain::constants::RATE;
use fhub_kernel::domain::models::{ShippingMode, ShippingRate};
use fhub_kernel::domain::security::Capabilities;
use fhub_kernel::record_id;
use fhub_kernel::security::{Actor, ResourceGuard};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// A rate band as submitted by an administrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateInput {
    pub mode: ShippingMode,
    pub min_weight: Decimal,
    pub max_weight: Decimal,
    pub price_per_kg: Decimal,
    pub delivery_days: u32,
    #[serde(default = "active")]
    pub is_active: bool,
}

const fn active() -> bool {
    true
}

impl RateInput {
    fn validate(&self) -> Result<(), RatingError> {
        if self.min_weight.is_sign_negative() {
            return Err(RatingError::invalid("minWeight", "must not be negative"));
        }
        if self.min_weight > self.max_weight {
            return Err(RatingError::invalid("maxWeight", "must not be below minWeight"));
        }
        if self.price_per_kg.is_sign_negative() {
            return Err(RatingError::invalid("pricePerKg", "must not be negative"));
        }
        Ok(())
    }
}

impl Rating {
    #[instrument(skip(self, actor, input), fields(actor = %actor.id, mode = %input.mode))]
    pub async fn create_rate(
        &self,
        actor: &Actor,
        input: RateInput,
    ) -> Result<ShippingRate, RatingError> {
        actor.authorize::<ManageRates>()?;
        input.validate()?;

        let now = Utc::now();
        let rate = ShippingRate {
            id: record_id!(RATE),
            mode: input.mode,
            min_weight: input.min_weight,
            max_weight: input.max_weight,
            price_per_kg: input.price_per_kg,
            delivery_days: input.delivery_days,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        let mut batch = self.store.batch();
        batch.create(&rate)?;
        batch.commit().await?;

        info!(rate = %rate.id, min = %rate.min_weight, max = %rate.max_weight, "Rate created");
        Ok(rate)
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id))]
    pub async fn update_rate(
        &self,
        actor: &Actor,
        id: &str,
        input: RateInput,
    ) -> Result<ShippingRate, RatingError> {
        actor.authorize::<ManageRates>()?;
        input.validate()?;
        let previous = self.load(id).await?;

        let rate = ShippingRate {
            mode: input.mode,
            min_weight: input.min_weight,
            max_weight: input.max_weight,
            price_per_kg: input.price_per_kg,
            delivery_days: input.delivery_days,
            is_active: input.is_active,
            updated_at: Utc::now(),
            ..previous.clone()
        };
        let mut batch = self.store.batch();
        batch.update(&previous, &rate)?;
        batch.commit().await?;

        info!(rate = %rate.id, "Rate updated");
        Ok(rate)
    }

    /// Rates are never deleted; deactivation removes the band from lookups.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn deactivate_rate(
        &self,
        actor: &Actor,
        id: &str,
    ) -> Result<ShippingRate, RatingError> {
        actor.authorize::<ManageRates>()?;
        let previous = self.load(id).await?;

        let rate = ShippingRate { is_active: false, updated_at: Utc::now(), ..previous.clone() };
        let mut batch = self.store.batch();
        batch.update(&previous, &rate)?;
        batch.commit().await?;

        info!(rate = %rate.id, "Rate deactivated");
        Ok(rate)
    }

    async fn load(&self, id: &str) -> Result<ShippingRate, RatingError> {
        let id = ResourceGuard::verify(id, RATE)?;
        self.store
            .get::<ShippingRate>(&id)
            .await?
            .ok_or_else(|| RatingError::NotFound { message: id.into(), context: None })
    }

    /// Bands ordered by mode and lower bound; inactive ones only for rate managers.
    pub async fn list_rates(&self, actor: &Actor) -> Result<Vec<ShippingRate>, RatingError> {
        actor.authorize::<QuoteShipping>()?;
        let all = actor.can(Capabilities::MANAGE_RATES);
        let mut rates = self.store.list::<ShippingRate>().await?;
        rates.retain(|rate| all || rate.is_active);
        rates.sort_by(|a, b| a.mode.cmp(&b.mode).then_with(|| a.min_weight.cmp(&b.min_weight)));
        Ok(rates)
    }

    /// Prices `weight` for `mode` with the handling fee and VAT of the active settings.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn quote(
        &self,
        actor: &Actor,
        mode: ShippingMode,
        weight: Decimal,
    ) -> Result<Quote, RatingError> {
        actor.authorize::<QuoteShipping>()?;
        if weight <= Decimal::ZERO {
            return Err(RatingError::invalid("weight", "must be positive"));
        }

        let settings = fhub_settings::current(&self.store).await?;
        if !settings.mode_enabled(mode) {
            return Err(RatingError::ModeDisabled { mode, context: None });
        }
        let rates = self.store.list::<ShippingRate>().await?;
        let rate = lookup(&rates, mode, weight).ok_or_else(|| {
            debug!("No band covers the weight");
            RatingError::NoRate { mode, weight, context: None }
        })?;
        Ok(compose(rate, weight, settings.handling_fee, settings.vat_rate))
    }
}
