use fhub_domain::security::{Capabilities, Role};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::warn;

/// A workflow operation and the capabilities it requires.
///
/// Implemented by marker types, usually through [`crate::operation!`].
pub trait Operation {
    const NAME: &'static str;
    const REQUIRES: Capabilities;
}

#[fhub_derive::fhub_error]
pub enum AccessDenied {
    #[kind(Forbidden)]
    #[error("Role '{role}' may not perform '{operation}'{}", format_context(.context))]
    Role { role: Role, operation: &'static str, context: Option<Cow<'static, str>> },
}

/// The authenticated caller, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), name: name.into(), role }
    }

    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }

    #[must_use]
    pub const fn can(&self, required: Capabilities) -> bool {
        self.capabilities().contains(required)
    }

    /// Rejects the call unless the role grants every capability of `O`.
    ///
    /// # Errors
    /// Returns [`AccessDenied::Role`] for a role without the capability.
    pub fn authorize<O: Operation>(&self) -> Result<(), AccessDenied> {
        if self.can(O::REQUIRES) {
            return Ok(());
        }
        warn!(actor = %self.id, role = %self.role, operation = O::NAME, "Access denied");
        Err(AccessDenied::Role { role: self.role, operation: O::NAME, context: None })
    }

    #[must_use]
    pub fn owns(&self, owner: &str) -> bool {
        self.id == owner
    }

    /// Ownership filter: own records, or any record with the `view_all` capability.
    #[must_use]
    pub fn sees(&self, owner: &str, view_all: Capabilities) -> bool {
        self.owns(owner) || self.can(view_all)
    }
}
