//! Error taxonomy shared by every slice.

use serde::Serialize;
use std::fmt;

/// Coarse classification of a failed request.
///
/// Every slice error maps onto exactly one kind; the transport layer picks the
/// response status from it and never inspects concrete error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input, missing field, mutually exclusive fields.
    Validation,
    /// The actor's role does not grant the operation.
    Forbidden,
    /// Missing entity, or an entity the actor does not own.
    NotFound,
    /// A workflow rule rejected an otherwise well-formed request.
    BusinessRule,
    /// Uniqueness violations (codes, emails, double confirmation races).
    Conflict,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::BusinessRule => "business_rule",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }

    /// Whether the failure is attributable to the caller.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every slice error (generated by `fhub_derive::fhub_error`).
pub trait Classify {
    fn kind(&self) -> ErrorKind;

    /// Offending input field for validation failures.
    fn field(&self) -> Option<&str> {
        None
    }
}
