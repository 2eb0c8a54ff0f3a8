//! The `unmarshal` entry points and their configuration

use crate::coerce::Registry;
use crate::error::Error;
use crate::source::{DefaultsOnly, Env, Source};
use crate::value::Value;
use crate::walk::Walker;
use std::any::{type_name, Any};
use std::collections::{HashMap, VecDeque};

/// Configuration of one or more `unmarshal` calls.
///
/// Options are applied in the order given; for the source, the last one wins.
/// Registering a second coercion for the same type replaces the first.
///
/// ```rust
/// use fromenv::{FromEnv, Options};
///
/// #[derive(FromEnv, Default)]
/// struct Config {
///     #[env("PORT=8080")]
///     pub port: u16,
/// }
///
/// let mut config = Config::default();
/// Options::new()
///     .map([("PORT", "9090")])
///     .unmarshal(&mut config)
///     .unwrap();
/// assert_eq!(config.port, 9090);
/// ```
pub struct Options {
    source: Box<dyn Source>,
    registry: Registry,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source: Box::new(Env),
            registry: Registry::default(),
        }
    }
}

impl Options {
    /// Options reading from the process environment, with no custom coercions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from the process environment.
    pub fn env(self) -> Self {
        self.source(Env)
    }

    /// Read from a fixed set of key/value pairs.
    pub fn map<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.source(map)
    }

    /// Never find a key, so only annotation defaults are applied.
    pub fn defaults_only(self) -> Self {
        self.source(DefaultsOnly)
    }

    /// Resolve keys with `f`. An error returned by `f` aborts the walk.
    pub fn lookup<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Option<String>> + 'static,
    {
        self.source(f)
    }

    /// Resolve keys with any [`Source`].
    pub fn source<S: Source + 'static>(mut self, source: S) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Coerce fields of type `T` with `f`.
    ///
    /// The function applies to fields declared as `T`, `Option<T>` or
    /// `Box<T>`, and takes precedence over both [`Set`](crate::Set) and the
    /// builtin parsers. It receives the field storage, already allocated.
    pub fn set_func<T, F>(mut self, f: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, &str) -> anyhow::Result<()> + 'static,
    {
        self.registry.register(f);
        self
    }

    /// Populate the annotated fields of every struct reachable from `root`.
    ///
    /// `root` must be a `FromEnv` struct, or an allocated `Option`, `Box` or
    /// `Rc<RefCell<_>>` of one. The first failure aborts the walk; fields
    /// processed before it keep their new values.
    pub fn unmarshal<T: Value>(&self, root: &mut T) -> Result<(), Error> {
        let mut roots = VecDeque::new();
        root.children(&mut roots);
        let root_node = match (roots.pop_front(), roots.is_empty()) {
            (Some(node), true) => node,
            _ => {
                return Err(Error::InvalidInput {
                    type_name: type_name::<T>(),
                })
            }
        };

        tracing::debug!(
            root = type_name::<T>(),
            custom_coercions = self.registry.len(),
            "unmarshal"
        );
        Walker::new(self.source.as_ref(), &self.registry)
            .walk(root_node)
            .inspect_err(|err| tracing::debug!(error = %err, "unmarshal aborted"))
    }
}

/// Populate `root` from the process environment with no custom coercions.
///
/// Shorthand for `Options::new().unmarshal(root)`.
pub fn unmarshal<T: Value>(root: &mut T) -> Result<(), Error> {
    Options::new().unmarshal(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FromEnv;

    #[derive(FromEnv, Default)]
    struct Inner {
        #[env("INNER")]
        pub value: String,
    }

    #[test]
    fn test_rejects_non_struct_root() {
        let mut value = 0u32;
        let err = Options::new().defaults_only().unmarshal(&mut value).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { type_name: "u32" }));
    }

    #[test]
    fn test_rejects_unallocated_root() {
        let mut root: Option<Inner> = None;
        let err = Options::new().defaults_only().unmarshal(&mut root).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(root.is_none());
    }

    #[test]
    fn test_accepts_allocated_indirections() {
        let options = Options::new().map([("INNER", "x")]);

        let mut root = Some(Inner::default());
        options.unmarshal(&mut root).unwrap();
        assert_eq!(root.unwrap().value, "x");

        let mut root = Box::new(Inner::default());
        options.unmarshal(&mut root).unwrap();
        assert_eq!(root.value, "x");
    }

    #[test]
    fn test_last_source_wins() {
        let mut root = Inner::default();
        Options::new()
            .map([("INNER", "from-map")])
            .lookup(|_| Ok(Some("from-lookup".to_string())))
            .unmarshal(&mut root)
            .unwrap();
        assert_eq!(root.value, "from-lookup");
    }

    #[test]
    fn test_last_registration_wins() {
        let mut root = Inner::default();
        Options::new()
            .map([("INNER", "raw")])
            .set_func(|s: &mut String, _| {
                *s = "first".to_string();
                Ok(())
            })
            .set_func(|s: &mut String, raw| {
                *s = format!("second:{raw}");
                Ok(())
            })
            .unmarshal(&mut root)
            .unwrap();
        assert_eq!(root.value, "second:raw");
    }
}
