use crate::PackageError;
use fhub_kernel::domain::models::{Fragility, PackageStatus, ShippingMode};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Parcel description shared by client announcements and agent registrations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageDetails {
    pub sender: String,
    pub description: String,
    pub destination: String,
    pub weight: Decimal,
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    pub declared_value: Decimal,
    pub fragility: Fragility,
    pub shipping_mode: ShippingMode,
    pub notes: Option<String>,
}

impl PackageDetails {
    pub(crate) fn validate(&self, max_weight: Decimal) -> Result<(), PackageError> {
        if self.description.trim().is_empty() {
            return Err(PackageError::invalid("description", "must not be empty"));
        }
        let measures = [
            ("weight", self.weight),
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
            ("declaredValue", self.declared_value),
        ];
        if let Some((field, _)) = measures.into_iter().find(|(_, value)| value.is_sign_negative()) {
            return Err(PackageError::invalid(field, "must not be negative"));
        }
        if self.weight > max_weight {
            let message = format!("exceeds the {max_weight} kg limit");
            return Err(PackageError::invalid("weight", message));
        }
        Ok(())
    }
}

/// Warehouse registration of a parcel on behalf of a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPackage {
    /// Email of the existing client who owns the parcel.
    pub client_email: String,
    #[serde(flatten)]
    pub details: PackageDetails,
}

/// Fields an inbound agent may fill in or correct while processing an
/// announced parcel. Supplied values replace the announced ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessPackage {
    pub weight: Option<Decimal>,
    pub length: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub declared_value: Option<Decimal>,
    pub fragility: Option<Fragility>,
    pub shipping_mode: Option<ShippingMode>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: String,
    pub notes: Option<String>,
}

impl StatusUpdate {
    pub(crate) fn target(&self) -> Result<PackageStatus, PackageError> {
        if self.status.trim().is_empty() {
            return Err(PackageError::invalid("status", "is required"));
        }
        self.status.parse().map_err(|message: String| PackageError::invalid("status", message))
    }
}

/// Hand-over of an available parcel to its recipient.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverPackage {
    pub recipient_name: String,
    pub recipient_id: String,
    /// Reference to the signature image in external file storage.
    pub signature: Option<String>,
    pub photo: Option<String>,
    pub notes: Option<String>,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(ToOwned::to_owned)
}
