use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport mode; a package preference and the key of a rate band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMode {
    #[serde(alias = "plane")]
    Air,
    #[default]
    #[serde(alias = "boat")]
    Sea,
    Express,
}

impl ShippingMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Sea => "sea",
            Self::Express => "express",
        }
    }
}

impl fmt::Display for ShippingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weight band `[min_weight, max_weight]` (inclusive) priced per kilogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRate {
    pub id: String,
    pub mode: ShippingMode,
    pub min_weight: Decimal,
    pub max_weight: Decimal,
    pub price_per_kg: Decimal,
    pub delivery_days: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShippingRate {
    #[must_use]
    pub fn covers(&self, mode: ShippingMode, weight: Decimal) -> bool {
        self.is_active
            && self.mode == mode
            && self.min_weight <= weight
            && weight <= self.max_weight
    }
}
