//! Human-readable codes: tracking numbers, consolidation and shipment codes,
//! customer ids.
//!
//! Codes are printed on labels and read over the phone, so they use a reduced
//! uppercase alphabet. Uniqueness is enforced by the store's unique code
//! indexes: [`with_unique_code`] retries the whole write with a fresh code when
//! the commit reports a taken one.

use fhub_domain::constants::{CUSTOMER_FALLBACK_INITIALS, CUSTOMER_SUFFIX_LEN};
use fhub_store::{Column, StoreError};
use std::borrow::Cow;
use tracing::debug;

/// Uppercase alphabet without `0`, `1`, `I` and `O`.
pub const CODE_ALPHABET: &[char; 32] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

#[fhub_derive::fhub_error]
pub enum CodeError {
    /// Every attempt produced a code that is already in use.
    #[kind(Conflict)]
    #[error("Code space exhausted{}: {message}", format_context(.context))]
    Exhausted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The write failed for a reason other than a taken code.
    #[kind(delegate)]
    #[error("{source}{}", format_context(.context))]
    Store {
        #[source]
        source: StoreError,
        context: Option<Cow<'static, str>>,
    },
}

/// Draws `prefix` followed by `len` random characters.
#[must_use]
pub fn random_code(prefix: &str, len: usize) -> String {
    format!("{prefix}{}", nanoid::nanoid!(len, CODE_ALPHABET))
}

/// Runs `write` with freshly generated codes until the store accepts one.
///
/// Only a [`StoreError::Duplicate`] on the code column triggers a retry; any
/// other failure is returned as is.
///
/// # Errors
/// * [`CodeError::Exhausted`] when all `attempts` collided.
/// * [`CodeError::Store`] when `write` failed otherwise.
pub async fn with_unique_code<T, F, Fut>(
    attempts: u32,
    mut generate: impl FnMut() -> String,
    mut write: F,
) -> Result<T, CodeError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        let candidate = generate();
        match write(candidate.clone()).await {
            Ok(value) => return Ok(value),
            Err(StoreError::Duplicate { field, .. }) if field == Column::Code.as_str() => {
                debug!(attempt, code = %candidate, "Code collision, regenerating");
            },
            Err(err) => return Err(err.into()),
        }
    }
    Err(CodeError::Exhausted {
        message: format!("no free code after {attempts} attempts").into(),
        context: None,
    })
}

/// One or two uppercase initials: first letters of the first and last name,
/// else the first two characters of the email, else the fallback `BP`.
#[must_use]
pub fn initials(first_name: &str, last_name: &str, email: &str) -> String {
    let from_name: String = [first_name, last_name]
        .iter()
        .filter_map(|part| part.trim().chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if !from_name.is_empty() {
        return from_name.chars().take(2).collect();
    }

    let from_email: String = email.trim().chars().take(2).flat_map(char::to_uppercase).collect();
    if !from_email.is_empty() {
        return from_email;
    }

    CUSTOMER_FALLBACK_INITIALS.to_owned()
}

/// Customer id candidate: initials plus six random code characters.
#[must_use]
pub fn customer_id(first_name: &str, last_name: &str, email: &str) -> String {
    random_code(&initials(first_name, last_name, email), CUSTOMER_SUFFIX_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_follow_fallback_chain() {
        assert_eq!(initials("jean", "pierre", "jp@example.com"), "JP");
        assert_eq!(initials("Marie", "", "m@example.com"), "M");
        assert_eq!(initials(" ", "", "zoe@example.com"), "ZO");
        assert_eq!(initials("", "", ""), "BP");
    }

    fn taken(field: &'static str) -> StoreError {
        StoreError::Duplicate { field: field.into(), message: "taken".into(), context: None }
    }

    #[tokio::test]
    async fn collisions_are_retried_then_reported() {
        let mut drawn = ["BP22222222", "BP33333333"].into_iter();
        let code = with_unique_code(
            3,
            || drawn.next().unwrap_or_default().to_owned(),
            |code| async move {
                if code == "BP22222222" {
                    return Err(taken("code"));
                }
                Ok(code)
            },
        )
        .await;
        assert_eq!(code.ok().as_deref(), Some("BP33333333"));

        let err = with_unique_code(4, || "SH22222222".to_owned(), |_| async {
            Err::<(), _>(taken("code"))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CodeError::Exhausted { .. }));
    }

    #[tokio::test]
    async fn other_duplicates_are_not_retried() {
        let mut calls = 0;
        let err = with_unique_code(
            5,
            || "JP7K2M9Q".to_owned(),
            |_| {
                calls += 1;
                async { Err::<(), _>(taken("email")) }
            },
        )
        .await
        .unwrap_err();
        assert_eq!(calls, 1);
        assert_eq!(fhub_domain::error::Classify::field(&err), Some("email"));
    }
}
