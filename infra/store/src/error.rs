use std::borrow::Cow;

/// A specialized [`StoreError`] enum of this crate.
#[fhub_derive::fhub_error]
pub enum StoreError {
    /// Missing connection parameters.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when the engine cannot be started or stays unhealthy.
    #[error("Store connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Authentication failed{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for underlying `SurrealDB` engine errors.
    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A stored body does not decode into its record type, or the reverse.
    #[error("Record encoding error{}: {source}", format_context(.context))]
    Encoding {
        #[source]
        source: serde_json::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A unique index already holds the value; `field` names the indexed column.
    #[kind(Conflict)]
    #[error("Duplicate {field}{}: {message}", format_context(.context))]
    Duplicate {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A guarded update found the record changed since it was read.
    #[kind(Conflict)]
    #[error("Stale record{}: {message}", format_context(.context))]
    Stale { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal store error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
