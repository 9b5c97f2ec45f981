use fhub_kernel::codes::CodeError;
use fhub_kernel::security::{AccessDenied, ResourceGuardError};
use fhub_store::StoreError;
use std::borrow::Cow;

/// A specialized [`AccountError`] enum of this crate.
#[fhub_derive::fhub_error]
pub enum AccountError {
    #[kind(delegate)]
    #[error("Account access denied{}: {source}", format_context(.context))]
    Access { source: AccessDenied, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Account id rejected{}: {source}", format_context(.context))]
    Guard { source: ResourceGuardError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Account store error{}: {source}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Customer id generation failed{}: {source}", format_context(.context))]
    Code { source: CodeError, context: Option<Cow<'static, str>> },

    #[kind(Validation)]
    #[error("Invalid {field}{}: {message}", format_context(.context))]
    Validation {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    #[kind(NotFound)]
    #[error("Account not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The email is already registered.
    #[kind(Conflict)]
    #[error("Email already registered{}: {message}", format_context(.context))]
    EmailTaken { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Clients cannot be given an address before a default warehouse exists.
    #[kind(BusinessRule)]
    #[error("No warehouse{}: {message}", format_context(.context))]
    NoWarehouse { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal account error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AccountError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { field: field.into(), message: message.into(), context: None }
    }

    pub(crate) fn email_taken(email: &str) -> Self {
        Self::EmailTaken { message: email.to_owned().into(), context: None }
    }

    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { message: id.to_owned().into(), context: None }
    }
}
