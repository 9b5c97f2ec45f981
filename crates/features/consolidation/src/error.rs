use fhub_kernel::codes::CodeError;
use fhub_kernel::security::{AccessDenied, ResourceGuardError};
use fhub_store::StoreError;
use std::borrow::Cow;

#[fhub_derive::fhub_error]
pub enum ConsolidationError {
    #[kind(delegate)]
    #[error("Consolidation access denied{}: {source}", format_context(.context))]
    Access { source: AccessDenied, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Consolidation id rejected{}: {source}", format_context(.context))]
    Guard { source: ResourceGuardError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Consolidation store error{}: {source}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Consolidation code generation failed{}: {source}", format_context(.context))]
    Code { source: CodeError, context: Option<Cow<'static, str>> },

    #[kind(Validation)]
    #[error("Invalid {field}{}: {message}", format_context(.context))]
    Validation {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// Missing or foreign consolidation or package, or a package in the wrong status.
    #[kind(NotFound)]
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[kind(BusinessRule)]
    #[error("Consolidation rule violated{}: {message}", format_context(.context))]
    Rule { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal consolidation error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ConsolidationError {
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
