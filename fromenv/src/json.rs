//! JSON coercion for fields without a string parser

use serde::de::DeserializeOwned;

/// Coercion function that parses the raw string as JSON.
///
/// Register it for the field types that need it:
///
/// ```rust
/// use fromenv::{FromEnv, Options};
///
/// #[derive(FromEnv, Default)]
/// struct Config {
///     #[env(r#"HOSTS=["a", "b"]"#)]
///     pub hosts: Vec<String>,
/// }
///
/// let mut config = Config::default();
/// Options::new()
///     .defaults_only()
///     .set_func(fromenv::json::<Vec<String>>)
///     .unmarshal(&mut config)
///     .unwrap();
/// assert_eq!(config.hosts, ["a", "b"]);
/// ```
pub fn json<T: DeserializeOwned>(target: &mut T, raw: &str) -> anyhow::Result<()> {
    *target = serde_json::from_str(raw)?;
    Ok(())
}
