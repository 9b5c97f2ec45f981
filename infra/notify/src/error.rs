use std::borrow::Cow;

/// Errors that can occur while setting up the notifier.
#[fhub_derive::fhub_error]
pub enum NotifyError {
    /// Capacity must be greater than zero.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
