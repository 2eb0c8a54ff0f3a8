//! Parsing of `#[env("KEY=default")]` annotations

/// Separator used when a struct does not override it with `#[env(separator = ...)]`.
pub const DEFAULT_SEPARATOR: char = '=';

/// A parsed field annotation.
///
/// An empty `key` means the field is not configured from the environment.
/// `default: None` and `default: Some("")` are distinct: the former leaves the
/// field untouched when the key is absent, the latter sets it to an empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Lookup key
    pub key: &'a str,
    /// Value used when the key is absent from the source
    pub default: Option<&'a str>,
}

impl<'a> Tag<'a> {
    /// Split an annotation at the first `separator`.
    ///
    /// Later separators are kept verbatim in the default, so defaults such as
    /// `"a=b"` or URLs with query strings survive intact.
    pub fn parse(raw: &'a str, separator: char) -> Self {
        match raw.split_once(separator) {
            Some((key, default)) => Self {
                key,
                default: Some(default),
            },
            None => Self {
                key: raw,
                default: None,
            },
        }
    }

    /// Whether the annotation names a key at all.
    pub fn is_skipped(&self) -> bool {
        self.key.is_empty()
    }
}
