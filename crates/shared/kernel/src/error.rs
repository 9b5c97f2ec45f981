//! Wire shape of a failed request.

pub use fhub_domain::error::{Classify, ErrorKind};

use serde::Serialize;
use std::error::Error;

/// JSON body returned for every rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), field: None }
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Builds the body from a classified error. Internal failures never leak
    /// their message to the caller.
    pub fn from_error<E: Classify + Error + ?Sized>(err: &E) -> Self {
        let kind = err.kind();
        let message =
            if kind.is_client_error() { err.to_string() } else { "Internal error".to_owned() };
        Self { kind, message, field: err.field().map(ToOwned::to_owned) }
    }
}
