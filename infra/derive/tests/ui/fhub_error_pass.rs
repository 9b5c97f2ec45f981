use fhub_derive::fhub_error;
use std::borrow::Cow;

#[fhub_error]
pub enum DemoError {
    #[kind(BusinessRule)]
    #[error("Rule violated{}: {message}", format_context(.context))]
    Rule { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {}
