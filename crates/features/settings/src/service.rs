use crate::{AppSettings, ManageSettings, SettingsError, current};
use chrono::{DateTime, Utc};
use fhub_kernel::domain::constants::SETTINGS;
use fhub_kernel::domain::models::{
    Maintenance, ModeRate, NotificationKind, NotificationTemplate, PublicSettings, RatesSummary,
    Settings, ShippingMode,
};
use fhub_kernel::record_id;
use fhub_kernel::security::Actor;
use fhub_store::{Batch, MAINTENANCE_KEY, Store};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

const PUBLIC_KEY: &str = "public";

/// Maintenance switch as submitted by an administrator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenanceUpdate {
    pub enabled: bool,
    pub message: String,
    pub estimated_end: Option<DateTime<Utc>>,
    pub allowed_ips: Vec<String>,
}

/// What a caller blocked by maintenance mode is told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceNotice {
    pub message: String,
    pub estimated_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    pub kind: NotificationKind,
    pub email_subject: String,
    pub email_body: String,
    #[serde(default)]
    pub sms_body: String,
    #[serde(default = "enabled")]
    pub is_active: bool,
}

const fn enabled() -> bool {
    true
}

fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if settings.vat_rate < Decimal::ZERO || settings.vat_rate > Decimal::ONE_HUNDRED {
        return Err(SettingsError::invalid("vatRate", "must be between 0 and 100"));
    }
    if settings.handling_fee.is_sign_negative() {
        return Err(SettingsError::invalid("handlingFee", "must not be negative"));
    }
    if settings.usd_to_htg_rate <= Decimal::ZERO {
        return Err(SettingsError::invalid("usdToHtgRate", "must be positive"));
    }
    if settings.max_package_weight_kg <= Decimal::ZERO {
        return Err(SettingsError::invalid("maxPackageWeightKg", "must be positive"));
    }
    let rates = [settings.air_rate_per_kg, settings.sea_rate_per_kg, settings.express_rate_per_kg];
    if rates.iter().any(Decimal::is_sign_negative) {
        return Err(SettingsError::invalid("ratePerKg", "must not be negative"));
    }
    Ok(())
}

/// Stages the deactivation of every active record except `id`.
async fn deactivate_others(
    store: &Store,
    batch: &mut Batch,
    id: &str,
    at: DateTime<Utc>,
) -> Result<(), SettingsError> {
    for previous in store.list::<Settings>().await? {
        if !previous.is_active || previous.id == id {
            continue;
        }
        let next = Settings { is_active: false, updated_at: Some(at), ..previous.clone() };
        batch.update(&previous, &next)?;
    }
    Ok(())
}

impl AppSettings {
    /// The active record; a default one is created when none exists.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn active(&self, actor: &Actor) -> Result<Settings, SettingsError> {
        actor.authorize::<ManageSettings>()?;

        let records = self.store.list::<Settings>().await?;
        if let Some(active) = records.into_iter().find(|s| s.is_active) {
            return Ok(active);
        }
        let record = Settings {
            id: record_id!(SETTINGS),
            updated_at: Some(Utc::now()),
            ..Settings::default()
        };
        let mut batch = self.store.batch();
        batch.create(&record)?;
        batch.commit().await?;
        info!(id = %record.id, "Default settings record created");
        Ok(record)
    }

    /// Stores `record` (new when its id is empty or unknown). With `activate`
    /// it becomes the single active record.
    #[instrument(skip(self, actor, record), fields(actor = %actor.id))]
    pub async fn save(
        &self,
        actor: &Actor,
        mut record: Settings,
        activate: bool,
    ) -> Result<Settings, SettingsError> {
        actor.authorize::<ManageSettings>()?;
        validate(&record)?;

        let now = Utc::now();
        if record.id.is_empty() {
            record.id = record_id!(SETTINGS);
        }
        let previous = self.store.get::<Settings>(&record.id).await?;
        let activate = activate || record.is_active;
        record.is_active = activate;
        record.updated_at = Some(now);

        let mut batch = self.store.batch();
        if activate {
            deactivate_others(&self.store, &mut batch, &record.id, now).await?;
        }
        match &previous {
            Some(previous) => batch.update(previous, &record)?,
            None => batch.create(&record)?,
        };
        batch.commit().await?;

        self.public_cache.invalidate_all();
        info!(id = %record.id, active = record.is_active, "Settings saved");
        Ok(record)
    }

    /// Atomically makes `id` the single active record.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn activate(&self, actor: &Actor, id: &str) -> Result<Settings, SettingsError> {
        actor.authorize::<ManageSettings>()?;

        let previous = self.store.get::<Settings>(id).await?.ok_or_else(|| {
            SettingsError::NotFound { message: id.to_owned().into(), context: None }
        })?;
        let now = Utc::now();
        let activated = Settings { is_active: true, updated_at: Some(now), ..previous.clone() };

        let mut batch = self.store.batch();
        deactivate_others(&self.store, &mut batch, id, now).await?;
        batch.update(&previous, &activated)?;
        batch.commit().await?;

        self.public_cache.invalidate_all();
        info!(id, "Settings record activated");
        Ok(activated)
    }

    /// Public projection of the active record, cached for five minutes.
    pub async fn public(&self) -> Result<PublicSettings, SettingsError> {
        self.public_cache
            .try_get_with(PUBLIC_KEY, async {
                debug!("Public settings cache miss");
                Ok(current(&self.store).await?.public())
            })
            .await
            .map_err(|e: Arc<SettingsError>| {
                Arc::try_unwrap(e).unwrap_or_else(|arc| SettingsError::Internal {
                    message: arc.to_string().into(),
                    context: Some("Public settings loader failed".into()),
                })
            })
    }

    /// Flat per-kg rates of the enabled modes plus the fee composition.
    pub async fn rates_summary(&self) -> Result<RatesSummary, SettingsError> {
        let settings = current(&self.store).await?;
        let modes = [ShippingMode::Air, ShippingMode::Sea, ShippingMode::Express]
            .into_iter()
            .filter(|mode| settings.mode_enabled(*mode))
            .map(|mode| ModeRate { mode, price_per_kg: settings.flat_rate(mode) })
            .collect();
        Ok(RatesSummary {
            modes,
            handling_fee: settings.handling_fee,
            vat_rate: settings.vat_rate,
            usd_to_htg_rate: settings.usd_to_htg_rate,
        })
    }

    pub async fn maintenance(&self) -> Result<Maintenance, SettingsError> {
        Ok(self.store.get::<Maintenance>(MAINTENANCE_KEY).await?.unwrap_or_default())
    }

    #[instrument(skip(self, actor, update), fields(actor = %actor.id, enabled = update.enabled))]
    pub async fn set_maintenance(
        &self,
        actor: &Actor,
        update: MaintenanceUpdate,
    ) -> Result<Maintenance, SettingsError> {
        actor.authorize::<ManageSettings>()?;
        if update.enabled && update.message.trim().is_empty() {
            return Err(SettingsError::invalid("message", "required while maintenance is enabled"));
        }

        let maintenance = Maintenance {
            enabled: update.enabled,
            message: update.message.trim().to_owned(),
            estimated_end: update.estimated_end,
            allowed_ips: update.allowed_ips.into_iter().map(|ip| ip.trim().to_owned()).collect(),
        };
        let mut batch = self.store.batch();
        batch.put(&maintenance)?;
        batch.commit().await?;

        info!("Maintenance mode updated");
        Ok(maintenance)
    }

    /// `Some` when maintenance is on and `client_ip` is not allow-listed.
    pub async fn check_maintenance(
        &self,
        client_ip: Option<&str>,
    ) -> Result<Option<MaintenanceNotice>, SettingsError> {
        let maintenance = self.maintenance().await?;
        if !maintenance.enabled {
            return Ok(None);
        }
        if let Some(ip) = client_ip
            && maintenance.allowed_ips.iter().any(|allowed| allowed == ip)
        {
            debug!(ip, "Maintenance bypassed by allow-list");
            return Ok(None);
        }
        Ok(Some(MaintenanceNotice {
            message: maintenance.message,
            estimated_end: maintenance.estimated_end,
        }))
    }

    /// Creates or replaces the template of one notification kind.
    #[instrument(skip(self, actor, update), fields(actor = %actor.id, kind = %update.kind))]
    pub async fn upsert_template(
        &self,
        actor: &Actor,
        update: TemplateUpdate,
    ) -> Result<NotificationTemplate, SettingsError> {
        actor.authorize::<ManageSettings>()?;
        if update.email_subject.trim().is_empty() {
            return Err(SettingsError::invalid("emailSubject", "must not be empty"));
        }

        let template = NotificationTemplate {
            kind: update.kind,
            email_subject: update.email_subject,
            email_body: update.email_body,
            sms_body: update.sms_body,
            is_active: update.is_active,
            updated_at: Utc::now(),
        };
        let mut batch = self.store.batch();
        batch.put(&template)?;
        batch.commit().await?;

        info!("Notification template saved");
        Ok(template)
    }

    /// Active templates ordered by kind.
    pub async fn templates(
        &self,
        actor: &Actor,
    ) -> Result<Vec<NotificationTemplate>, SettingsError> {
        actor.authorize::<ManageSettings>()?;
        let mut templates = self.store.list::<NotificationTemplate>().await?;
        templates.retain(|t| t.is_active);
        templates.sort_by_key(|t| t.kind);
        Ok(templates)
    }
}
