use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Packages of one client grouped into a single billing unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consolidation {
    pub id: String,
    pub owner: String,
    pub code: String,
    /// Current member package ids, in joining order.
    pub package_ids: Vec<String>,
    /// Sum of member weights, recomputed on every membership change.
    pub total_weight: Decimal,
    pub total_value: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Consolidation {
    #[must_use]
    pub fn contains(&self, package_id: &str) -> bool {
        self.package_ids.iter().any(|id| id == package_id)
    }
}
