//! Value sources: where a lookup key is resolved to a raw string

use std::collections::HashMap;
use std::env;

/// Resolves a lookup key to a raw string.
///
/// `Ok(None)` means the key is absent; the field then falls back to its
/// annotation default, or is left untouched. `Err` aborts the whole walk.
///
/// Any `Fn(&str) -> anyhow::Result<Option<String>>` is a source.
pub trait Source {
    /// Look up `key`.
    fn lookup(&self, key: &str) -> anyhow::Result<Option<String>>;
}

/// The process environment. This is the default source.
///
/// A variable whose value is not valid unicode is reported as a lookup error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Env;

impl Source for Env {
    fn lookup(&self, key: &str) -> anyhow::Result<Option<String>> {
        match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e @ env::VarError::NotUnicode(_)) => Err(e.into()),
        }
    }
}

/// A source that never has a value, so only annotation defaults apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsOnly;

impl Source for DefaultsOnly {
    fn lookup(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

impl Source for HashMap<String, String> {
    fn lookup(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.get(key).cloned())
    }
}

impl<F> Source for F
where
    F: Fn(&str) -> anyhow::Result<Option<String>>,
{
    fn lookup(&self, key: &str) -> anyhow::Result<Option<String>> {
        self(key)
    }
}
