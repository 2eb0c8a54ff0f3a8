//! Derive macro implementation for fromenv

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Visibility};

mod attrs;

use attrs::{FieldAttrs, StructAttrs};

/// `FromEnv` derive macro
///
/// Implements `fromenv::Struct` and `fromenv::Value`, so the struct can be
/// passed to `fromenv::unmarshal` and nested in other `FromEnv` structs.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[env(prefix = "PREFIX_")]`: Prepend to every key of this struct
/// - `#[env(separator = ',')]`: Split key and default at this character instead of `=`
/// - `#[env(settable)]`: The struct implements `fromenv::Set` and may be annotated itself
///
/// **Field-level**:
/// - `#[env("KEY")]`: Set from `KEY` when present
/// - `#[env("KEY=default")]`: Set from `KEY`, or from `default` when absent
/// - `#[env(skip)]`: Ignore the field entirely
///
/// Fields without an attribute are not set, but the structs they contain are
/// walked if the field is `pub`. Every `pub` field that is not skipped must
/// implement `fromenv::Value`.
///
/// An annotated field that is not `pub` compiles, and is reported by
/// `unmarshal` as unsettable.
#[proc_macro_derive(FromEnv, attributes(env))]
pub fn derive_fromenv(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let struct_name_str = struct_name.unraw().to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "FromEnv does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "FromEnv only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "FromEnv only supports structs",
            ))
        }
    };

    let struct_attrs = StructAttrs::from_attrs(&input.attrs)?;

    let mut descriptors = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = ident.unraw().to_string();
        let ty = &field.ty;
        let public = matches!(field.vis, Visibility::Public(_));

        let descriptor = match (FieldAttrs::from_field(field)?, public) {
            (FieldAttrs::Skip, _) | (FieldAttrs::None, false) => continue,
            (FieldAttrs::None, true) => quote! {
                ::fromenv::Field::writable(#name, ::core::option::Option::None, &mut self.#ident)
            },
            (FieldAttrs::Tag(tag), true) => quote! {
                ::fromenv::Field::writable(#name, ::core::option::Option::Some(#tag), &mut self.#ident)
            },
            (FieldAttrs::Tag(tag), false) => quote! {
                ::fromenv::Field::unsettable::<#ty>(#name, #tag)
            },
        };
        descriptors.push(descriptor);
    }

    let separator = struct_attrs.separator.unwrap_or('=');
    let prefix = struct_attrs.prefix.unwrap_or_default();

    let (kind, settable) = if struct_attrs.settable {
        (
            quote! { ::fromenv::Kind::Settable },
            quote! {
                fn settable(&mut self) -> ::core::option::Option<&mut dyn ::fromenv::Set> {
                    ::core::option::Option::Some(self)
                }
            },
        )
    } else {
        (quote! { ::fromenv::Kind::Struct }, quote! {})
    };

    Ok(quote! {
        impl ::fromenv::Value for #struct_name {
            fn shape() -> ::fromenv::Shape {
                ::fromenv::Shape::of::<Self>(#kind)
            }

            fn target(&mut self) -> &mut dyn ::fromenv::Value {
                self
            }

            #settable

            fn children<'__a>(
                &'__a mut self,
                queue: &mut ::std::collections::VecDeque<::fromenv::Node<'__a>>,
            ) {
                queue.push_back(::fromenv::Node::Inline(self));
            }
        }

        impl ::fromenv::Struct for #struct_name {
            fn struct_name(&self) -> &'static str {
                #struct_name_str
            }

            fn tag_style(&self) -> ::fromenv::TagStyle {
                ::fromenv::TagStyle {
                    separator: #separator,
                    prefix: #prefix,
                }
            }

            fn fields(&mut self) -> ::std::vec::Vec<::fromenv::Field<'_>> {
                ::std::vec![#(#descriptors),*]
            }
        }
    })
}
