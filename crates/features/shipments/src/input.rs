use crate::ShipmentError;
use fhub_kernel::domain::models::{DeliveryInfo, ShipmentStatus, ShippingMode};
use rust_decimal::Decimal;
use serde::Deserialize;

/// What a shipment is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Packages(Vec<String>),
    Consolidation(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipment {
    /// Loose packages; mutually exclusive with `consolidation_id`.
    #[serde(default)]
    pub package_ids: Option<Vec<String>>,
    #[serde(default)]
    pub consolidation_id: Option<String>,
    #[serde(default)]
    pub shipping_mode: ShippingMode,
    #[serde(default)]
    pub insurance_cost: Decimal,
    pub delivery: DeliveryInfo,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateShipment {
    /// Exactly one source must be given; an empty package list counts as none.
    pub(crate) fn source(&self) -> Result<Source, ShipmentError> {
        let packages = self.package_ids.as_ref().filter(|ids| !ids.is_empty());
        let consolidation =
            self.consolidation_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
        match (packages, consolidation) {
            (Some(ids), None) => Ok(Source::Packages(ids.clone())),
            (None, Some(id)) => Ok(Source::Consolidation(id.to_owned())),
            (Some(_), Some(_)) => Err(ShipmentError::invalid(
                "source",
                "give either packageIds or consolidationId, not both",
            )),
            (None, None) => {
                Err(ShipmentError::invalid("source", "packageIds or consolidationId is required"))
            },
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ShipmentError> {
        if self.insurance_cost.is_sign_negative() {
            return Err(ShipmentError::invalid("insuranceCost", "must not be negative"));
        }
        if self.delivery.address.trim().is_empty() {
            return Err(ShipmentError::invalid("delivery.address", "must not be empty"));
        }
        if self.delivery.recipient_name.trim().is_empty() {
            return Err(ShipmentError::invalid("delivery.recipientName", "must not be empty"));
        }
        Ok(())
    }
}

/// Agent-driven move along the shipment lifecycle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceShipment {
    pub status: String,
    /// Carrier reference at destination; replaces any previous one.
    #[serde(default)]
    pub carrier_tracking: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AdvanceShipment {
    pub(crate) fn target(&self) -> Result<ShipmentStatus, ShipmentError> {
        self.status.parse().map_err(|message: String| ShipmentError::invalid("status", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateShipment {
        CreateShipment {
            delivery: DeliveryInfo {
                address: "12 Rue Capois, Port-au-Prince".to_owned(),
                recipient_name: "Marie".to_owned(),
                recipient_phone: "+509 3700 0000".to_owned(),
            },
            ..CreateShipment::default()
        }
    }

    #[test]
    fn source_must_be_exactly_one() {
        let neither = request();
        assert!(neither.source().is_err());

        let empty = CreateShipment { package_ids: Some(vec![]), ..request() };
        assert!(empty.source().is_err());

        let both = CreateShipment {
            package_ids: Some(vec!["package:a".to_owned()]),
            consolidation_id: Some("consolidation:b".to_owned()),
            ..request()
        };
        assert!(both.source().is_err());

        let padded = Some(" consolidation:b ".to_owned());
        let one = CreateShipment { consolidation_id: padded, ..request() };
        assert_eq!(one.source().unwrap(), Source::Consolidation("consolidation:b".to_owned()));
    }
}
