use fhub_kernel::codes::CodeError;
use fhub_kernel::domain::models::ShippingMode;
use fhub_kernel::security::{AccessDenied, ResourceGuardError};
use fhub_store::StoreError;
use rust_decimal::Decimal;
use std::borrow::Cow;

#[fhub_derive::fhub_error]
pub enum ShipmentError {
    #[kind(delegate)]
    #[error("Shipment access denied{}: {source}", format_context(.context))]
    Access { source: AccessDenied, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Shipment id rejected{}: {source}", format_context(.context))]
    Guard { source: ResourceGuardError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Shipment store error{}: {source}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },

    #[kind(delegate)]
    #[error("Shipment code generation failed{}: {source}", format_context(.context))]
    Code { source: CodeError, context: Option<Cow<'static, str>> },

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

    /// No active band prices the shipment and the missing-rate policy rejects.
    #[kind(BusinessRule)]
    #[error("No applicable {mode} rate for {weight} kg{}", format_context(.context))]
    NoRate { mode: ShippingMode, weight: Decimal, context: Option<Cow<'static, str>> },

    #[kind(BusinessRule)]
    #[error("Shipment rule violated{}: {message}", format_context(.context))]
    Rule { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal shipment error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ShipmentError {
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
