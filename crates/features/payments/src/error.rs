use fhub_kernel::security::{AccessDenied, ResourceGuardError};
use fhub_store::StoreError;
use std::borrow::Cow;

#[fhub_derive::fhub_error]
pub enum PaymentError {
    #[kind(delegate)]
    #[error("Payment access denied{}: {source}", format_context(.context))]
    Access { source: AccessDenied, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Payment id rejected{}: {source}", format_context(.context))]
    Guard { source: ResourceGuardError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Payment store error{}: {source}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },

    #[kind(Validation)]
    #[error("Invalid {field}{}: {message}", format_context(.context))]
    Validation {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    #[kind(NotFound)]
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[kind(BusinessRule)]
    #[error("Payment rule violated{}: {message}", format_context(.context))]
    Rule { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal payment error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl PaymentError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { field: field.into(), message: message.into(), context: None }
    }

    pub(crate) fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    pub(crate) fn rule(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Rule { message: message.into(), context: None }
    }
}
