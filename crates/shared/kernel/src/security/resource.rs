use std::borrow::Cow;

#[fhub_derive::fhub_error]
pub enum ResourceGuardError {
    /// The id is malformed or belongs to another table. Reported as not-found
    /// so callers cannot probe for records of other kinds.
    #[kind(NotFound)]
    #[error("Unknown resource{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Utilities for safe resource handling and ID validation.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Normalizes a record id to `table:key` form.
    ///
    /// Prevents "ID Spoofing" where a caller passes an id from a different table
    /// (e.g., a `payment:..` id to a package endpoint).
    ///
    /// # Arguments
    /// * `id` - The ID to verify (e.g., `"package:K7mQ"` or just `"K7mQ"`)
    /// * `expected_table` - The table the ID must belong to (e.g., `"package"`)
    ///
    /// # Errors
    /// Returns an error if the id is empty or its table does not match.
    pub fn verify<I, T>(id: I, expected_table: T) -> Result<String, ResourceGuardError>
    where
        I: AsRef<str>,
        T: AsRef<str>,
    {
        let id_ref = id.as_ref().trim();
        let table_ref = expected_table.as_ref();

        let key = match id_ref.split_once(':') {
            Some((table, key)) if table == table_ref => key,
            Some((table, _)) => {
                return Err(ResourceGuardError::Invalid {
                    message: format!("Expected '{table_ref}', got '{table}'").into(),
                    context: Some("ID table mismatch".into()),
                });
            },
            None => id_ref,
        };

        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ResourceGuardError::Invalid {
                message: format!("Malformed {table_ref} id").into(),
                context: None,
            });
        }

        Ok(format!("{table_ref}:{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhub_domain::error::{Classify, ErrorKind};

    #[test]
    fn verification_normalizes_and_rejects() {
        assert_eq!(ResourceGuard::verify("package:123", "package").unwrap(), "package:123");
        assert_eq!(ResourceGuard::verify("123", "package").unwrap(), "package:123");

        let err = ResourceGuard::verify("payment:123", "package").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(ResourceGuard::verify("package:", "package").is_err());
        assert!(ResourceGuard::verify("a b", "package").is_err());
    }
}
