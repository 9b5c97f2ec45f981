use super::{PaymentMethod, ShippingMode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Business configuration editable at runtime. Exactly one record is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub id: String,
    pub company_name: String,

    /// Percent applied to the base shipping cost of a quote.
    pub vat_rate: Decimal,
    /// Flat fee added to every quote.
    pub handling_fee: Decimal,
    pub usd_to_htg_rate: Decimal,

    pub air_enabled: bool,
    pub sea_enabled: bool,
    pub express_enabled: bool,
    /// Flat per-kg prices published on the rates page.
    pub air_rate_per_kg: Decimal,
    pub sea_rate_per_kg: Decimal,
    pub express_rate_per_kg: Decimal,

    pub stripe_enabled: bool,
    pub paypal_enabled: bool,
    pub moncash_enabled: bool,
    pub bank_transfer_enabled: bool,
    pub spih_enabled: bool,
    pub cash_enabled: bool,

    pub consolidation_enabled: bool,
    pub free_storage_days: u32,
    pub public_tracking_enabled: bool,
    /// Undelivered packages a single client may hold.
    pub max_packages_per_user: u32,
    pub max_package_weight_kg: Decimal,

    pub notify_on_package_received: bool,
    pub notify_on_shipment_created: bool,
    pub notify_on_shipment_shipped: bool,
    pub notify_on_shipment_delivered: bool,
    pub notify_on_payment_received: bool,
    pub notify_on_account_created: bool,

    pub is_active: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: String::new(),
            company_name: "ForwardHub".to_owned(),
            vat_rate: Decimal::ZERO,
            handling_fee: Decimal::TWO,
            usd_to_htg_rate: Decimal::new(150, 0),
            air_enabled: true,
            sea_enabled: true,
            express_enabled: false,
            air_rate_per_kg: Decimal::ZERO,
            sea_rate_per_kg: Decimal::ZERO,
            express_rate_per_kg: Decimal::ZERO,
            stripe_enabled: true,
            paypal_enabled: false,
            moncash_enabled: true,
            bank_transfer_enabled: true,
            spih_enabled: false,
            cash_enabled: true,
            consolidation_enabled: true,
            free_storage_days: 30,
            public_tracking_enabled: true,
            max_packages_per_user: 10,
            max_package_weight_kg: Decimal::new(50, 0),
            notify_on_package_received: true,
            notify_on_shipment_created: true,
            notify_on_shipment_shipped: true,
            notify_on_shipment_delivered: true,
            notify_on_payment_received: true,
            notify_on_account_created: true,
            is_active: true,
            updated_at: None,
        }
    }
}

impl Settings {
    #[must_use]
    pub const fn mode_enabled(&self, mode: ShippingMode) -> bool {
        match mode {
            ShippingMode::Air => self.air_enabled,
            ShippingMode::Sea => self.sea_enabled,
            ShippingMode::Express => self.express_enabled,
        }
    }

    #[must_use]
    pub const fn flat_rate(&self, mode: ShippingMode) -> Decimal {
        match mode {
            ShippingMode::Air => self.air_rate_per_kg,
            ShippingMode::Sea => self.sea_rate_per_kg,
            ShippingMode::Express => self.express_rate_per_kg,
        }
    }

    #[must_use]
    pub const fn method_enabled(&self, method: PaymentMethod) -> bool {
        match method {
            PaymentMethod::Stripe => self.stripe_enabled,
            PaymentMethod::Paypal => self.paypal_enabled,
            PaymentMethod::Moncash => self.moncash_enabled,
            PaymentMethod::BankTransfer => self.bank_transfer_enabled,
            PaymentMethod::Spih => self.spih_enabled,
            PaymentMethod::Cash => self.cash_enabled,
        }
    }

    #[must_use]
    pub const fn notifies(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::PackageReceived => self.notify_on_package_received,
            NotificationKind::ShipmentCreated => self.notify_on_shipment_created,
            NotificationKind::ShipmentShipped => self.notify_on_shipment_shipped,
            NotificationKind::ShipmentDelivered => self.notify_on_shipment_delivered,
            NotificationKind::PaymentReceived => self.notify_on_payment_received,
            NotificationKind::AccountCreated => self.notify_on_account_created,
        }
    }

    /// Projection safe to expose without authentication.
    #[must_use]
    pub fn public(&self) -> PublicSettings {
        let modes = [ShippingMode::Air, ShippingMode::Sea, ShippingMode::Express];
        let methods = [
            PaymentMethod::Stripe,
            PaymentMethod::Paypal,
            PaymentMethod::Moncash,
            PaymentMethod::BankTransfer,
            PaymentMethod::Spih,
            PaymentMethod::Cash,
        ];
        PublicSettings {
            company_name: self.company_name.clone(),
            vat_rate: self.vat_rate,
            handling_fee: self.handling_fee,
            usd_to_htg_rate: self.usd_to_htg_rate,
            shipping_modes: modes.into_iter().filter(|m| self.mode_enabled(*m)).collect(),
            payment_methods: methods.into_iter().filter(|m| self.method_enabled(*m)).collect(),
            consolidation_enabled: self.consolidation_enabled,
            public_tracking_enabled: self.public_tracking_enabled,
            free_storage_days: self.free_storage_days,
            max_package_weight_kg: self.max_package_weight_kg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSettings {
    pub company_name: String,
    pub vat_rate: Decimal,
    pub handling_fee: Decimal,
    pub usd_to_htg_rate: Decimal,
    pub shipping_modes: Vec<ShippingMode>,
    pub payment_methods: Vec<PaymentMethod>,
    pub consolidation_enabled: bool,
    pub public_tracking_enabled: bool,
    pub free_storage_days: u32,
    pub max_package_weight_kg: Decimal,
}

/// Published flat rate of one enabled mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeRate {
    pub mode: ShippingMode,
    pub price_per_kg: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesSummary {
    pub modes: Vec<ModeRate>,
    pub handling_fee: Decimal,
    pub vat_rate: Decimal,
    pub usd_to_htg_rate: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Maintenance {
    pub enabled: bool,
    pub message: String,
    pub estimated_end: Option<DateTime<Utc>>,
    /// Client addresses that bypass maintenance mode.
    pub allowed_ips: Vec<String>,
}

/// Events that produce a user notification; also the template keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PackageReceived,
    ShipmentCreated,
    ShipmentShipped,
    ShipmentDelivered,
    PaymentReceived,
    AccountCreated,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PackageReceived => "package_received",
            Self::ShipmentCreated => "shipment_created",
            Self::ShipmentShipped => "shipment_shipped",
            Self::ShipmentDelivered => "shipment_delivered",
            Self::PaymentReceived => "payment_received",
            Self::AccountCreated => "account_created",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored message texts for one notification kind. Rendering happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    pub kind: NotificationKind,
    pub email_subject: String,
    pub email_body: String,
    pub sms_body: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}
