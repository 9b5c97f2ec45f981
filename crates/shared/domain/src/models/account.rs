use crate::security::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered person: client, warehouse agent or administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
    /// Human-facing identifier printed on parcels sent to the warehouse.
    pub customer_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() { self.email.clone() } else { name.to_owned() }
    }
}
