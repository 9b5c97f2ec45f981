use super::PackageStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only record of a package status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub package_id: String,
    pub at: DateTime<Utc>,
    pub actor_id: String,
    pub actor_name: String,
    /// `None` for the entry that created the package.
    pub from: Option<PackageStatus>,
    pub to: PackageStatus,
    pub message: Option<String>,
}

/// Ordered transition log of a single package.
pub type AuditTrail = Vec<AuditEntry>;
