#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the `ForwardHub` slices.
//! The macros remove the boilerplate around error taxonomies, slice handles and
//! HTTP data models so every feature crate wires them the same way.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! fhub-derive.workspace = true
//! ```
//!
//! Expanded code refers to `::thiserror`, `::serde`, `::fhub_domain` and `::fhub_kernel`,
//! so consumers must depend on the crates their macros touch.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Attribute macro for HTTP request and response bodies.
///
/// Fields are renamed to `camelCase` unless the model sets its own `rename_all`.
/// The optional direction limits the serde derives that get injected:
///
/// * `#[api_model]` derives `Serialize` and `Deserialize`.
/// * `#[api_model(request)]` derives only `Deserialize`.
/// * `#[api_model(response)]` derives only `Serialize`.
///
/// Deserialized models reject unknown fields; add `lenient` to accept them.
/// `Debug` is derived when missing.
///
/// # Example
///
/// ```rust,ignore
/// use fhub_derive::api_model;
///
/// #[api_model(request)]
/// pub struct QuoteRequest {
///     pub weight: rust_decimal::Decimal,
///     pub mode: ShippingMode,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro for defining slice error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]`.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `#[source]` field.
/// * **Internal Fallback**: Provides `From<&str>` and `From<String>` when an `Internal`
///   variant is present.
/// * **Classification**: Implements `fhub_domain::error::Classify`. Each variant may carry
///   `#[kind(NotFound)]` (any `ErrorKind`) or `#[kind(delegate)]` to reuse the kind of its
///   source. Unmarked variants classify as `Internal`. A variant with a `field` member
///   reports it through `Classify::field`.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping other errors must include a `source` field (or `#[source]`/`#[from]`).
///
/// # Example
///
/// ```rust,ignore
/// use fhub_derive::fhub_error;
/// use std::borrow::Cow;
///
/// #[fhub_error]
/// pub enum PackageError {
///     #[kind(NotFound)]
///     #[error("Package not found{}: {message}", format_context(.context))]
///     NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[kind(delegate)]
///     #[error("Store failure{}: {source}", format_context(.context))]
///     Store { source: fhub_store::StoreError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn fhub_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a Vertical Slice handle.
///
/// 1. Generates a thread-safe `Arc` wrapper.
/// 2. Implements `Deref` for transparent access to the inner state.
/// 3. Implements `FeatureSlice` for registration in the Kernel.
///
/// # Example
/// ```rust,ignore
/// #[fhub_derive::fhub_slice]
/// pub struct Packages {
///     pub store: fhub_store::Store,
/// }
///
/// let packages = Packages::new(PackagesInner { store });
/// ```
#[proc_macro_attribute]
pub fn fhub_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
