use fhub_kernel::security::{AccessDenied, ResourceGuardError};
use fhub_store::StoreError;
use std::borrow::Cow;

/// A specialized [`AddressError`] enum of this crate.
#[fhub_derive::fhub_error]
pub enum AddressError {
    #[kind(delegate)]
    #[error("Address access denied{}: {source}", format_context(.context))]
    Access { source: AccessDenied, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Address id rejected{}: {source}", format_context(.context))]
    Guard { source: ResourceGuardError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Address store error{}: {source}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },

    #[kind(Validation)]
    #[error("Invalid {field}{}: {message}", format_context(.context))]
    Validation {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    #[kind(NotFound)]
    #[error("Address not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal address error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AddressError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { field: field.into(), message: message.into(), context: None }
    }

    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { message: id.to_owned().into(), context: None }
    }
}
