//! wirekit-macros - Derive macro for wirekit request payloads
//!
//! This crate provides:
//! - `#[derive(Wirekit)]` - Register the `#[wirekit(..)]` field attribute
//!
//! The generator reads `#[wirekit(..)]` entries from source; the derive only
//! makes the attribute legal and rejects entries the generator would not
//! understand. It expands to nothing.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Token, parse_macro_input};

/// Keys naming a wire source, optionally with a wire name
const SOURCE_KEYS: &[&str] = &["path", "query", "header", "cookie", "form", "json"];

/// Keys that require a value
const VALUE_KEYS: &[&str] = &["default", "validate"];

/// Keys that take no value
const FLAG_KEYS: &[&str] = &["flatten", "raw_body"];

/// Derive macro for request payloads
///
/// # Example
///
/// ```ignore
/// use wirekit_runtime::Wirekit;
///
/// #[derive(Default, Wirekit)]
/// struct SearchUsers {
///     #[wirekit(query = "q", validate = "required")]
///     filter: String,
///     #[wirekit(header = "X-Tenant", default = "public")]
///     tenant: String,
/// }
/// ```
#[proc_macro_derive(Wirekit, attributes(wirekit))]
pub fn derive_wirekit(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match check_payload(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.into_compile_error()),
    }
}

/// Check every `#[wirekit(..)]` attribute on a struct's fields
fn check_payload(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Wirekit can only be derived for structs",
            ));
        }
    };

    if let Some(attr) = input.attrs.iter().find(|a| a.path().is_ident("wirekit")) {
        return Err(syn::Error::new_spanned(
            attr,
            "#[wirekit(..)] belongs on fields, not on the struct",
        ));
    }

    let mut errors: Option<syn::Error> = None;
    let attrs: Vec<&Attribute> = match fields {
        Fields::Named(named) => named.named.iter().flat_map(|f| &f.attrs).collect(),
        Fields::Unnamed(unnamed) => unnamed.unnamed.iter().flat_map(|f| &f.attrs).collect(),
        Fields::Unit => Vec::new(),
    };
    for attr in attrs.into_iter().filter(|a| a.path().is_ident("wirekit")) {
        if let Err(err) = check_attribute(attr) {
            match errors.as_mut() {
                Some(all) => all.combine(err),
                None => errors = Some(err),
            }
        }
    }

    match errors {
        Some(err) => Err(err),
        None => Ok(quote! {}),
    }
}

fn check_attribute(attr: &Attribute) -> syn::Result<()> {
    attr.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .map(ToString::to_string)
            .unwrap_or_default();
        let has_value = meta.input.peek(Token![=]);

        if SOURCE_KEYS.contains(&key.as_str()) {
            if has_value {
                // Wire names must be string literals
                let _: syn::LitStr = meta.value()?.parse()?;
            }
            Ok(())
        } else if VALUE_KEYS.contains(&key.as_str()) {
            if !has_value {
                return Err(meta.error(format!("`{}` needs a value", key)));
            }
            let _: syn::Expr = meta.value()?.parse()?;
            Ok(())
        } else if FLAG_KEYS.contains(&key.as_str()) {
            if has_value {
                return Err(meta.error(format!("`{}` takes no value", key)));
            }
            Ok(())
        } else {
            Err(meta.error(format!(
                "unknown wirekit key; expected one of {}",
                SOURCE_KEYS
                    .iter()
                    .chain(VALUE_KEYS)
                    .chain(FLAG_KEYS)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    })
}
