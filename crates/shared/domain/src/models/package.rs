use super::ShippingMode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a physical parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    /// Declared by the client, not yet at the warehouse.
    Announced,
    /// Checked in by an inbound agent.
    Received,
    /// Held in an active consolidation.
    Waiting,
    #[serde(alias = "inTransit")]
    InTransit,
    /// At the destination office, ready for pickup.
    Available,
    Delivered,
}

impl PackageStatus {
    pub const ALL: [Self; 6] = [
        Self::Announced,
        Self::Received,
        Self::Waiting,
        Self::InTransit,
        Self::Available,
        Self::Delivered,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Announced => "announced",
            Self::Received => "received",
            Self::Waiting => "waiting",
            Self::InTransit => "in_transit",
            Self::Available => "available",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .or_else(|| (normalized == "inTransit").then_some(Self::InTransit))
            .ok_or_else(|| format!("unknown package status '{normalized}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fragility {
    #[default]
    Normal,
    Fragile,
    VeryFragile,
}

/// A single parcel owned by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    /// User id of the client the parcel belongs to.
    pub owner: String,
    pub tracking_number: String,
    pub sender: String,
    pub description: String,
    /// Kilograms.
    pub weight: Decimal,
    /// Centimetres.
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    /// USD.
    pub declared_value: Decimal,
    pub fragility: Fragility,
    pub shipping_mode: ShippingMode,
    pub destination: String,
    pub status: PackageStatus,
    pub announced_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    /// Inbound agent who checked the parcel in.
    pub agent_in: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Package {
    /// Volume in litres (`L × W × H / 1000`).
    #[must_use]
    pub fn volume(&self) -> Decimal {
        self.length * self.width * self.height / Decimal::ONE_THOUSAND
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner == user_id
    }
}

/// Proof of hand-over to the recipient at the destination office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDelivery {
    pub id: String,
    pub package_id: String,
    /// Outbound agent who handed the parcel over.
    pub agent_out: String,
    pub recipient_name: String,
    /// Identity document number shown by the recipient.
    pub recipient_id: String,
    /// Reference to the signature image in external file storage.
    pub signature: Option<String>,
    pub photo: Option<String>,
    pub notes: Option<String>,
    pub delivered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_both_spellings_of_in_transit() {
        assert_eq!("in_transit".parse::<PackageStatus>(), Ok(PackageStatus::InTransit));
        assert_eq!("inTransit".parse::<PackageStatus>(), Ok(PackageStatus::InTransit));
        assert!("lost".parse::<PackageStatus>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&PackageStatus::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");
        let parsed: PackageStatus = serde_json::from_str("\"inTransit\"").unwrap();
        assert_eq!(parsed, PackageStatus::InTransit);
    }

    #[test]
    fn legacy_mode_names_are_accepted() {
        let mode: ShippingMode = serde_json::from_str("\"plane\"").unwrap();
        assert_eq!(mode, ShippingMode::Air);
        let mode: ShippingMode = serde_json::from_str("\"boat\"").unwrap();
        assert_eq!(mode, ShippingMode::Sea);
    }
}
