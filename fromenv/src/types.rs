//! Field types with a string setter that are not part of std

use crate::value::Set;
use std::fmt;
use std::str::FromStr;

/// An absolute URL, or nothing.
///
/// The default value is empty, so the type can be used for fields that are
/// only set when a key or default is present, including `Option<Url>`.
/// Relative references are rejected.
///
/// ```rust
/// use fromenv::{FromEnv, Options, Url};
///
/// #[derive(FromEnv, Default)]
/// struct Config {
///     #[env("UPSTREAM=http://localhost:8080/api")]
///     pub upstream: Url,
/// }
///
/// let mut config = Config::default();
/// Options::new().defaults_only().unmarshal(&mut config).unwrap();
/// assert_eq!(config.upstream.get().unwrap().port(), Some(8080));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Url(Option<url::Url>);

impl Url {
    /// The parsed URL, if one was set.
    pub fn get(&self) -> Option<&url::Url> {
        self.0.as_ref()
    }

    /// Whether no URL has been set.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Take the parsed URL out of the wrapper.
    pub fn into_inner(self) -> Option<url::Url> {
        self.0
    }
}

impl From<url::Url> for Url {
    fn from(url: url::Url) -> Self {
        Self(Some(url))
    }
}

impl FromStr for Url {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        url::Url::parse(s).map(Self::from)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(url) => url.fmt(f),
            None => Ok(()),
        }
    }
}

impl Set for Url {
    fn set(&mut self, raw: &str) -> anyhow::Result<()> {
        *self = raw.parse()?;
        Ok(())
    }
}

crate::settable!(Url);
