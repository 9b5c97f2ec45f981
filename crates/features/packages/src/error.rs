use fhub_kernel::codes::CodeError;
use fhub_kernel::security::{AccessDenied, ResourceGuardError};
use fhub_store::StoreError;
use std::borrow::Cow;

/// A specialized [`PackageError`] enum of this crate.
#[fhub_derive::fhub_error]
pub enum PackageError {
    #[kind(delegate)]
    #[error("Package access denied{}: {source}", format_context(.context))]
    Access { source: AccessDenied, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Package id rejected{}: {source}", format_context(.context))]
    Guard { source: ResourceGuardError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Package store error{}: {source}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Tracking number generation failed{}: {source}", format_context(.context))]
    Code { source: CodeError, context: Option<Cow<'static, str>> },

    #[kind(Validation)]
    #[error("Invalid {field}{}: {message}", format_context(.context))]
    Validation {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// Missing, foreign, or not in the status the operation expects.
    #[kind(NotFound)]
    #[error("Package not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[kind(BusinessRule)]
    #[error("Package rule violated{}: {message}", format_context(.context))]
    Rule { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal package error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl PackageError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { field: field.into(), message: message.into(), context: None }
    }

    pub(crate) fn not_found(id: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: id.into(), context: None }
    }

    pub(crate) fn rule(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Rule { message: message.into(), context: None }
    }
}
