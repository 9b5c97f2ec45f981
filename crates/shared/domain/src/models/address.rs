use super::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a physical location is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    /// Receives client parcels from merchants.
    Warehouse,
    Office,
    PickupPoint,
}

impl AddressKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warehouse => "warehouse",
            Self::Office => "office",
            Self::PickupPoint => "pickup_point",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Country {
    Us,
    Ht,
    Ca,
    Fr,
}

impl Country {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Us => "United States",
            Self::Ht => "Haiti",
            Self::Ca => "Canada",
            Self::Fr => "France",
        }
    }
}

/// Services a location may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    PackageReception,
    Consolidation,
    SeaShipping,
    AirShipping,
    ExpressShipping,
    CustomerService,
    PackagePickup,
    Payments,
    TechnicalSupport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressService {
    pub service: ServiceKind,
    pub is_available: bool,
    pub additional_info: Option<String>,
}

/// A warehouse, office or pickup point of the company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub kind: AddressKind,
    pub name: String,
    pub country: Country,
    pub city: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: String,
    pub email: String,
    /// Free-form opening hours, e.g. `Mon-Fri 8:00-18:00`.
    pub hours: String,
    pub is_active: bool,
    pub display_order: u32,
    /// The warehouse whose address clients give to merchants. At most one.
    pub is_default_warehouse: bool,
    /// At most one entry per service kind.
    pub services: Vec<AddressService>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// `line1, line2, city, postal code, country`, skipping empty parts.
    #[must_use]
    pub fn full_address(&self) -> String {
        let mut parts = vec![self.address_line1.as_str()];
        parts.extend(self.address_line2.as_deref());
        parts.push(&self.city);
        parts.extend(self.postal_code.as_deref());
        parts.push(self.country.name());
        parts.join(", ")
    }

    /// The block `user` writes on orders shipped to this warehouse.
    ///
    /// `None` for offices and pickup points.
    #[must_use]
    pub fn personalized(&self, user: &User) -> Option<WarehouseAddress> {
        if self.kind != AddressKind::Warehouse {
            return None;
        }
        let street = match &self.address_line2 {
            Some(line2) => format!("{}, {line2}", self.address_line1),
            None => self.address_line1.clone(),
        };
        let city = [Some(self.city.as_str()), self.state.as_deref(), self.postal_code.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        Some(WarehouseAddress {
            addressee: format!("{} #{}", user.full_name(), user.customer_id),
            facility: self.name.clone(),
            street,
            city,
            country: self.country.name().to_owned(),
        })
    }
}

/// Address block a client gives to merchants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseAddress {
    pub addressee: String,
    pub facility: String,
    pub street: String,
    pub city: String,
    pub country: String,
}

impl fmt::Display for WarehouseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\n{}\n{}\n{}",
            self.addressee, self.facility, self.street, self.city, self.country
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::Role;

    fn miami() -> Address {
        let now = Utc::now();
        Address {
            id: "address:mia".to_owned(),
            kind: AddressKind::Warehouse,
            name: "ForwardHub Miami".to_owned(),
            country: Country::Us,
            city: "Miami".to_owned(),
            address_line1: "123 NW 21st St".to_owned(),
            address_line2: None,
            state: Some("FL".to_owned()),
            postal_code: Some("33142".to_owned()),
            phone: "+13055550100".to_owned(),
            email: "mia@forwardhub.test".to_owned(),
            hours: "Mon-Fri 8:00-18:00".to_owned(),
            is_active: true,
            display_order: 0,
            is_default_warehouse: true,
            services: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn personalized_block_names_client_and_facility() {
        let user = User {
            id: "user:1".to_owned(),
            email: "jp@example.com".to_owned(),
            first_name: "Jean".to_owned(),
            last_name: "Pierre".to_owned(),
            phone: None,
            role: Role::Client,
            customer_id: "JP7K2M9Q".to_owned(),
            is_active: true,
            created_at: Utc::now(),
        };
        let block = miami().personalized(&user).unwrap();
        assert_eq!(block.addressee, "Jean Pierre #JP7K2M9Q");
        assert_eq!(block.city, "Miami FL 33142");
        assert_eq!(
            block.to_string(),
            "Jean Pierre #JP7K2M9Q\nForwardHub Miami\n123 NW 21st St\nMiami FL 33142\nUnited States"
        );

        let mut office = miami();
        office.kind = AddressKind::Office;
        assert!(office.personalized(&user).is_none());
    }

    #[test]
    fn full_address_skips_missing_parts() {
        let mut address = miami();
        assert_eq!(address.full_address(), "123 NW 21st St, Miami, 33142, United States");
        address.address_line2 = Some("Suite 4".to_owned());
        address.postal_code = None;
        assert_eq!(address.full_address(), "123 NW 21st St, Suite 4, Miami, United States");
    }
}
