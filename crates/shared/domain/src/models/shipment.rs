use super::ShippingMode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `pending → paid → processing → shipped → in_transit → delivered`, with
/// `cancelled` reachable before the shipment leaves the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Paid,
        Self::Processing,
        Self::Shipped,
        Self::InTransit,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Position on the forward chain; `None` for `cancelled`.
    #[must_use]
    pub const fn stage(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Paid => Some(1),
            Self::Processing => Some(2),
            Self::Shipped => Some(3),
            Self::InTransit => Some(4),
            Self::Delivered => Some(5),
            Self::Cancelled => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Cancellation is possible until the shipment is handed to the carrier.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Paid | Self::Processing)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown shipment status '{normalized}'"))
    }
}

/// Where and to whom a shipment goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    pub address: String,
    pub recipient_name: String,
    pub recipient_phone: String,
}

/// The billable, trackable unit sent to a delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: String,
    pub owner: String,
    pub code: String,
    /// Constituent packages (loose, or the members of the consolidation).
    pub package_ids: Vec<String>,
    pub consolidation_id: Option<String>,
    pub shipping_mode: ShippingMode,
    /// Copied at creation; not re-synced afterwards.
    pub total_weight: Decimal,
    pub shipping_cost: Decimal,
    pub insurance_cost: Decimal,
    pub total_cost: Decimal,
    /// Id of the rate band used for `shipping_cost`; `None` for a zero-cost fallback.
    pub rate_id: Option<String>,
    pub delivery: DeliveryInfo,
    pub status: ShipmentStatus,
    /// Carrier reference at destination.
    pub carrier_tracking: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Sets the cost fields, keeping `total_cost = shipping_cost + insurance_cost`.
    pub fn set_costs(&mut self, shipping_cost: Decimal, insurance_cost: Decimal) {
        self.shipping_cost = shipping_cost;
        self.insurance_cost = insurance_cost;
        self.total_cost = shipping_cost + insurance_cost;
    }

    /// Moves to `status`, stamping each lifecycle timestamp on first entry.
    ///
    /// Skipped intermediate stages stamp their timestamp too, so a shipment that
    /// jumps from `processing` to `in_transit` still records `shipped_at`.
    pub fn enter(&mut self, status: ShipmentStatus, at: DateTime<Utc>) {
        let reached = |stage: ShipmentStatus| {
            matches!((status.stage(), stage.stage()), (Some(s), Some(t)) if s >= t)
        };
        if reached(ShipmentStatus::Paid) && self.paid_at.is_none() {
            self.paid_at = Some(at);
        }
        if reached(ShipmentStatus::Shipped) && self.shipped_at.is_none() {
            self.shipped_at = Some(at);
        }
        if reached(ShipmentStatus::Delivered) && self.delivered_at.is_none() {
            self.delivered_at = Some(at);
        }
        if status == ShipmentStatus::Cancelled && self.cancelled_at.is_none() {
            self.cancelled_at = Some(at);
        }
        self.status = status;
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn shipment() -> Shipment {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        Shipment {
            id: "shipment:1".to_owned(),
            owner: "user:1".to_owned(),
            code: "SHABCDEFGH".to_owned(),
            package_ids: vec![],
            consolidation_id: None,
            shipping_mode: ShippingMode::Sea,
            total_weight: Decimal::TEN,
            shipping_cost: Decimal::ZERO,
            insurance_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            rate_id: None,
            delivery: DeliveryInfo::default(),
            status: ShipmentStatus::Pending,
            carrier_tracking: None,
            notes: None,
            created_at: at,
            paid_at: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
            updated_at: at,
        }
    }

    #[test]
    fn set_costs_keeps_total_consistent() {
        let mut s = shipment();
        s.set_costs(Decimal::new(2000, 2), Decimal::new(550, 2));
        assert_eq!(s.total_cost, Decimal::new(2550, 2));
    }

    #[test]
    fn timestamps_are_stamped_once() {
        let mut s = shipment();
        let first = Utc.with_ymd_and_hms(2026, 1, 6, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 1, 7, 9, 0, 0).unwrap();

        s.enter(ShipmentStatus::Paid, first);
        s.enter(ShipmentStatus::Processing, later);
        assert_eq!(s.paid_at, Some(first));

        s.enter(ShipmentStatus::InTransit, later);
        assert_eq!(s.shipped_at, Some(later));
        assert!(s.delivered_at.is_none());
    }

    #[test]
    fn cancellation_window_ends_at_shipping() {
        assert!(ShipmentStatus::Processing.is_cancellable());
        assert!(!ShipmentStatus::Shipped.is_cancellable());
        assert_eq!(ShipmentStatus::Cancelled.stage(), None);
    }
}
