use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ItemStruct, LitStr};

/// `AppSettings` -> `app_settings`.
fn snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn expand_slice(input: ItemStruct) -> TokenStream {
    let handle = &input.ident;
    let vis = &input.vis;
    let fields = &input.fields;
    let attrs = &input.attrs;

    let inner = format_ident!("{handle}Inner");
    let name = LitStr::new(&snake_case(&handle.to_string()), handle.span());

    quote! {
        #(#attrs)*
        #[derive(Debug, Clone)]
        #vis struct #inner #fields

        /// Cheaply cloneable handle; every clone shares one state.
        #[derive(Debug, Clone)]
        #vis struct #handle {
            inner: ::std::sync::Arc<#inner>,
        }

        impl #handle {
            pub fn new(inner: #inner) -> Self {
                Self { inner: ::std::sync::Arc::new(inner) }
            }
        }

        impl ::std::ops::Deref for #handle {
            type Target = #inner;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::fhub_kernel::domain::registry::FeatureSlice for #handle {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn name(&self) -> &'static str {
                #name
            }
        }
    }
}
