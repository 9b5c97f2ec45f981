use fhub_domain::constants;
use fhub_domain::models::{
    Address, AuditEntry, Consolidation, Maintenance, NotificationTemplate, Package,
    PackageDelivery, Payment, Settings, Shipment, ShippingRate, User,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Key of the single maintenance record.
pub const MAINTENANCE_KEY: &str = "maintenance:current";

/// Indexed columns stored next to a record body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// The record key, unique per table.
    Ident,
    /// Id of the owning user.
    Owner,
    /// Id of the enclosing record (shipment of a payment, package of an audit entry).
    Parent,
    /// Human-facing code, unique per table.
    Code,
    Email,
}

impl Column {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ident => "ident",
            Self::Owner => "owner",
            Self::Parent => "parent",
            Self::Code => "code",
            Self::Email => "email",
        }
    }
}

/// Column values of one record; `None` columns are not written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    pub owner: Option<String>,
    pub parent: Option<String>,
    pub code: Option<String>,
    pub email: Option<String>,
}

impl Columns {
    pub(crate) fn iter(&self) -> impl Iterator<Item = (Column, &str)> {
        [
            (Column::Owner, self.owner.as_deref()),
            (Column::Parent, self.parent.as_deref()),
            (Column::Code, self.code.as_deref()),
            (Column::Email, self.email.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v)))
    }
}

/// A type persisted as one row of [`Record::TABLE`].
///
/// The body is the JSON form of the value; [`Record::columns`] lists the
/// values lifted out of it for lookups and unique indexes.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;

    fn key(&self) -> &str;

    fn columns(&self) -> Columns {
        Columns::default()
    }
}

impl Record for User {
    const TABLE: &'static str = constants::USER;

    fn key(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Columns {
        Columns {
            code: Some(self.customer_id.clone()),
            email: Some(self.email.to_lowercase()),
            ..Columns::default()
        }
    }
}

impl Record for Package {
    const TABLE: &'static str = constants::PACKAGE;

    fn key(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Columns {
        Columns {
            owner: Some(self.owner.clone()),
            code: Some(self.tracking_number.clone()),
            ..Columns::default()
        }
    }
}

impl Record for PackageDelivery {
    const TABLE: &'static str = constants::DELIVERY;

    fn key(&self) -> &str {
        &self.id
    }

    // One delivery per package: the package id doubles as the unique code.
    fn columns(&self) -> Columns {
        Columns {
            parent: Some(self.package_id.clone()),
            code: Some(self.package_id.clone()),
            ..Columns::default()
        }
    }
}

impl Record for AuditEntry {
    const TABLE: &'static str = constants::AUDIT;

    fn key(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Columns {
        Columns { parent: Some(self.package_id.clone()), ..Columns::default() }
    }
}

impl Record for Consolidation {
    const TABLE: &'static str = constants::CONSOLIDATION;

    fn key(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Columns {
        Columns {
            owner: Some(self.owner.clone()),
            code: Some(self.code.clone()),
            ..Columns::default()
        }
    }
}

impl Record for Shipment {
    const TABLE: &'static str = constants::SHIPMENT;

    fn key(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Columns {
        Columns {
            owner: Some(self.owner.clone()),
            parent: self.consolidation_id.clone(),
            code: Some(self.code.clone()),
            ..Columns::default()
        }
    }
}

impl Record for Payment {
    const TABLE: &'static str = constants::PAYMENT;

    fn key(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Columns {
        Columns {
            owner: Some(self.owner.clone()),
            parent: Some(self.shipment_id.clone()),
            ..Columns::default()
        }
    }
}

impl Record for ShippingRate {
    const TABLE: &'static str = constants::RATE;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Settings {
    const TABLE: &'static str = constants::SETTINGS;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Address {
    const TABLE: &'static str = constants::ADDRESS;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Maintenance {
    const TABLE: &'static str = constants::MAINTENANCE;

    fn key(&self) -> &str {
        MAINTENANCE_KEY
    }
}

impl Record for NotificationTemplate {
    const TABLE: &'static str = constants::TEMPLATE;

    fn key(&self) -> &str {
        self.kind.as_str()
    }
}
