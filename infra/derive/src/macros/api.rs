use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Ident, ItemStruct, Token};

/// Which side of the wire a model travels on.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Request,
    Response,
    Both,
}

struct Flags {
    direction: Direction,
    lenient: bool,
}

fn parse_flags(args: TokenStream) -> syn::Result<Flags> {
    let idents = Punctuated::<Ident, Token![,]>::parse_terminated.parse2(args)?;
    let mut flags = Flags { direction: Direction::Both, lenient: false };
    let mut direction_set = false;

    for ident in idents {
        let direction = match ident.to_string().as_str() {
            "request" => Direction::Request,
            "response" => Direction::Response,
            "lenient" => {
                flags.lenient = true;
                continue;
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "expected `request`, `response` or `lenient`",
                ));
            },
        };
        if direction_set {
            return Err(syn::Error::new_spanned(ident, "direction given twice"));
        }
        direction_set = true;
        flags.direction = direction;
    }

    if flags.lenient && flags.direction == Direction::Response {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "`lenient` only applies to models that are deserialized",
        ));
    }
    Ok(flags)
}

/// Expands `#[api_model]`: camelCase JSON, strict request bodies and the
/// serde derives the model's direction needs.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let flags = match parse_flags(args) {
        Ok(flags) => flags,
        Err(err) => return err.to_compile_error(),
    };
    let present = derived(&input.attrs);
    let (has_rename, has_deny) = serde_flags(&input.attrs);

    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote! { Debug });
    }
    if flags.direction != Direction::Request && !present.contains("Serialize") {
        derives.push(quote! { ::serde::Serialize });
    }
    let reads = flags.direction != Direction::Response;
    if reads && !present.contains("Deserialize") {
        derives.push(quote! { ::serde::Deserialize });
    }

    let derive_attr = (!derives.is_empty()).then(|| quote! { #[derive(#(#derives),*)] });
    let rename_attr = (!has_rename).then(|| quote! { #[serde(rename_all = "camelCase")] });
    let deny_attr =
        (reads && !flags.lenient && !has_deny).then(|| quote! { #[serde(deny_unknown_fields)] });

    quote! {
        #derive_attr
        #rename_attr
        #deny_attr
        #input
    }
}

/// Last path segment of every derived trait.
fn derived(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                names.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }
    names
}

/// Whether the model already sets `rename_all` / `deny_unknown_fields` itself.
fn serde_flags(attrs: &[Attribute]) -> (bool, bool) {
    let (mut rename, mut deny) = (false, false);
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                rename = true;
                let _: syn::LitStr = meta.value()?.parse()?;
            } else if meta.path.is_ident("deny_unknown_fields") {
                deny = true;
            } else if meta.input.peek(Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    (rename, deny)
}
