use fhub_kernel::domain::models::ShippingMode;
use fhub_kernel::security::{AccessDenied, ResourceGuardError};
use fhub_store::StoreError;
use rust_decimal::Decimal;
use std::borrow::Cow;

/// A specialized [`RatingError`] enum of this crate.
#[fhub_derive::fhub_error]
pub enum RatingError {
    #[kind(delegate)]
    #[error("Rating access denied{}: {source}", format_context(.context))]
    Access { source: AccessDenied, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Rate id rejected{}: {source}", format_context(.context))]
    Guard { source: ResourceGuardError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Rating store error{}: {source}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },

    #[kind(Validation)]
    #[error("Invalid {field}{}: {message}", format_context(.context))]
    Validation {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    #[kind(NotFound)]
    #[error("Rate not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No active band of the mode covers the weight.
    #[kind(BusinessRule)]
    #[error("No applicable rate for {mode} at {weight} kg{}", format_context(.context))]
    NoRate { mode: ShippingMode, weight: Decimal, context: Option<Cow<'static, str>> },

    #[kind(BusinessRule)]
    #[error("Shipping mode {mode} is disabled{}", format_context(.context))]
    ModeDisabled { mode: ShippingMode, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal rating error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl RatingError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { field: field.into(), message: message.into(), context: None }
    }
}
