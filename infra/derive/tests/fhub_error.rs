use fhub_domain::error::{Classify, ErrorKind};
use lookup::{LookupError, LookupErrorExt};
use workflow::WorkflowError;

mod lookup {
    use fhub_derive::fhub_error;
    use std::borrow::Cow;

    #[fhub_error]
    pub enum LookupError {
        #[kind(NotFound)]
        #[error("Record not found{}: {message}", format_context(.context))]
        Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

        #[kind(Validation)]
        #[error("Invalid {field}{}: {message}", format_context(.context))]
        Invalid {
            field: Cow<'static, str>,
            message: Cow<'static, str>,
            context: Option<Cow<'static, str>>,
        },

        #[error("IO error{}: {source}", format_context(.context))]
        Io {
            #[source]
            source: std::io::Error,
            context: Option<Cow<'static, str>>,
        },

        #[error("Internal error{}: {message}", format_context(.context))]
        Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }
}

mod workflow {
    use super::LookupError;
    use fhub_derive::fhub_error;
    use std::borrow::Cow;

    #[fhub_error]
    pub enum WorkflowError {
        #[kind(delegate)]
        #[error("Lookup failed{}: {source}", format_context(.context))]
        Lookup { source: LookupError, context: Option<Cow<'static, str>> },

        #[kind(Conflict)]
        #[error("Duplicate{}: {message}", format_context(.context))]
        Duplicate { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }
}

fn missing() -> Result<(), LookupError> {
    Err(LookupError::Missing { message: "package BP12345678".into(), context: None })
}

#[test]
fn fhub_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/fhub_error_pass.rs");
}

#[test]
fn kind_attribute_classifies_variants() {
    let err = missing().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.field(), None);

    let err = LookupError::Invalid {
        field: "weight".into(),
        message: "must be positive".into(),
        context: None,
    };
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.field(), Some("weight"));
}

#[test]
fn unmarked_variants_classify_as_internal() {
    let err: LookupError = "boom".into();
    assert_eq!(err.kind(), ErrorKind::Internal);

    let io = std::io::Error::other("disk");
    let err: LookupError = io.into();
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn delegate_reuses_source_classification() {
    let inner = LookupError::Invalid {
        field: "destination".into(),
        message: "required".into(),
        context: None,
    };
    let err: WorkflowError = inner.into();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.field(), Some("destination"));

    let err = WorkflowError::Duplicate { message: "code".into(), context: None };
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn context_is_rendered_in_message() {
    let err = missing().context("receiving").unwrap_err();
    assert_eq!(err.to_string(), "Record not found (receiving): package BP12345678");
}

#[test]
fn source_context_converts_into_enum() {
    let res: Result<(), std::io::Error> = Err(std::io::Error::other("disk"));
    let err = res.context("snapshot").unwrap_err();
    assert!(matches!(err, LookupError::Io { context: Some(_), .. }));
}
