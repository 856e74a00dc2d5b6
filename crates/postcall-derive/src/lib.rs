//! Derive macro for postcall record types.
//!
//! `#[derive(Typed)]` describes a struct with named fields as a record and
//! builds it back from a coerced value.
//!
//! # Example
//!
//! ```ignore
//! use postcall::Typed;
//!
//! #[derive(Typed)]
//! struct Person {
//!     #[typed(rename = "full_name")]
//!     name: String,
//!     age: u8,
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, LitStr};

/// Derive `postcall::Typed` for a struct with named fields.
///
/// # Attributes
///
/// - `#[typed(rename = "key")]` - read the field from `key` instead of
///   its Rust name
#[proc_macro_derive(Typed, attributes(typed))]
pub fn derive_typed(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(mut input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.clone(),
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Typed can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Typed can only be derived for structs",
            ))
        }
    };

    for param in input.generics.type_params_mut() {
        param.bounds.push(parse_quote!(::postcall::Typed));
    }

    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut descriptors = Vec::new();
    let mut takes = Vec::new();

    for field in &fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let ident_str = ident.to_string();
        let ty = &field.ty;

        let descriptor = match get_rename(&field.attrs)? {
            Some(key) => quote! {
                ::postcall::Field::new(#ident_str, <#ty as ::postcall::Typed>::value_type())
                    .rename(#key)
            },
            None => quote! {
                ::postcall::Field::new(#ident_str, <#ty as ::postcall::Typed>::value_type())
            },
        };
        descriptors.push(descriptor);
        takes.push(quote! {
            #ident: fields.take::<#ty>(#ident_str)?
        });
    }

    Ok(quote! {
        impl #impl_generics ::postcall::Typed for #name #ty_generics #where_clause {
            fn value_type() -> ::postcall::ValueType {
                ::postcall::record_type(#name_str, ::std::vec![#(#descriptors),*])
            }

            fn from_value(
                value: ::postcall::Value,
            ) -> ::std::result::Result<Self, ::postcall::ConversionError> {
                let mut fields = ::postcall::RecordFields::new(value)?;
                ::std::result::Result::Ok(Self {
                    #(#takes),*
                })
            }
        }
    })
}

/// Extract `#[typed(rename = "...")]`
fn get_rename(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut rename = None;
    for attr in attrs {
        if !attr.path().is_ident("typed") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let key: LitStr = meta.value()?.parse()?;
                rename = Some(key.value());
                Ok(())
            } else {
                Err(meta.error("unsupported typed attribute, expected `rename`"))
            }
        })?;
    }
    Ok(rename)
}
