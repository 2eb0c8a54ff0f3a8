//! Attribute parsing for `#[env(...)]` annotations.

use syn::parse::ParseStream;
use syn::{Attribute, Field, Ident, LitChar, LitStr};

/// What a single field annotation asks for.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum FieldAttrs {
    /// No `#[env]` attribute
    #[default]
    None,
    /// `#[env("KEY")]` or `#[env("KEY=default")]`, kept verbatim
    Tag(String),
    /// `#[env(skip)]`
    Skip,
}

impl FieldAttrs {
    /// Extract the `#[env(...)]` attribute of a field.
    ///
    /// Other attributes are ignored. More than one `#[env]` is an error.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::None;

        for attr in env_attrs(&field.attrs) {
            if attrs != Self::None {
                return Err(syn::Error::new_spanned(attr, "duplicate env attribute"));
            }
            attrs = attr.parse_args_with(|input: ParseStream| {
                if input.peek(LitStr) {
                    let tag: LitStr = input.parse()?;
                    return Ok(Self::Tag(tag.value()));
                }
                let ident: Ident = input.parse()?;
                if ident == "skip" {
                    return Ok(Self::Skip);
                }
                Err(syn::Error::new(
                    ident.span(),
                    "expected a \"KEY=default\" string or `skip`",
                ))
            })?;
        }

        Ok(attrs)
    }
}

/// Struct-level `#[env(...)]` options.
#[derive(Debug, Default)]
pub struct StructAttrs {
    /// Prepended to every key of the struct's fields
    pub prefix: Option<String>,
    /// Splits the key from the default, `=` when unset
    pub separator: Option<char>,
    /// The struct implements `Set` itself
    pub settable: bool,
}

impl StructAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in env_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                // prefix = "..."
                if meta.path.is_ident("prefix") {
                    let prefix: LitStr = meta.value()?.parse()?;
                    out.prefix = Some(prefix.value());
                    return Ok(());
                }

                // separator = ','
                if meta.path.is_ident("separator") {
                    let separator: LitChar = meta.value()?.parse()?;
                    out.separator = Some(separator.value());
                    return Ok(());
                }

                if meta.path.is_ident("settable") {
                    out.settable = true;
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level env attribute"))
            })?;
        }

        Ok(out)
    }
}

fn env_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("env"))
}
