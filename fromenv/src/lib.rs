//! Populate annotated struct fields from environment variables
//!
//! `fromenv` walks a struct, every struct nested in it, and every struct
//! reachable through shared `Rc<RefCell<_>>` links, and sets each annotated
//! field from a lookup key, falling back to a default written in the
//! annotation.
//!
//! # Features
//!
//! - **Declarative**: annotate fields with `#[derive(FromEnv)]` and `#[env(...)]`
//! - **Nested structs**: inline, boxed, optional (allocated on demand) and shared
//! - **Cycle safe**: every struct instance is visited once
//! - **Pluggable sources**: environment, a fixed map, defaults only, or any closure
//! - **Custom coercions**: per type, taking precedence over everything else
//!
//! # Example
//!
//! ```rust
//! use fromenv::FromEnv;
//!
//! #[derive(Debug, Default, FromEnv)]
//! pub struct Config {
//!     #[env("APP_HOST=localhost")]
//!     pub host: String,
//!
//!     #[env("APP_PORT=8080")]
//!     pub port: u16,
//!
//!     // Untouched unless APP_TOKEN is set
//!     #[env("APP_TOKEN")]
//!     pub token: Option<String>,
//! }
//!
//! # fn main() -> Result<(), fromenv::Error> {
//! #     std::env::set_var("APP_PORT", "9090");
//! #     std::env::remove_var("APP_TOKEN");
//! let mut config = Config::default();
//! fromenv::unmarshal(&mut config)?;
//! #     assert_eq!(config.host, "localhost");
//! #     assert_eq!(config.port, 9090);
//! #     assert_eq!(config.token, None);
//! #     Ok(())
//! # }
//! ```
//!
//! # Annotations
//!
//! ## `#[env("KEY")]` and `#[env("KEY=default")]`
//!
//! The annotation is split at the first separator. A key found in the source
//! wins over the default, even when its value is empty. An empty default
//! (`"KEY="`) is a default, so the field is set to an empty value. Without a
//! default an absent key leaves the field as it was.
//!
//! An empty key (`""` or `"=value"`) disables the field.
//!
//! ## `#[env(skip)]`
//!
//! Ignore the field entirely, including any struct it contains. Use it for
//! `pub` fields of types that do not implement [`Value`].
//!
//! ## `#[env(prefix = "APP_", separator = ',')]`
//!
//! On the struct: `prefix` is prepended to every key of the struct's own
//! fields, `separator` replaces `=`.
//!
//! ```rust
//! # use fromenv::{FromEnv, Options};
//! #[derive(Default, FromEnv)]
//! #[env(prefix = "DB_", separator = ',')]
//! pub struct Database {
//!     // Looks up DB_URL
//!     #[env("URL,postgres://localhost/app?sslmode=disable")]
//!     pub url: String,
//! }
//! # let mut db = Database::default();
//! # Options::new().defaults_only().unmarshal(&mut db).unwrap();
//! # assert_eq!(db.url, "postgres://localhost/app?sslmode=disable");
//! ```
//!
//! ## `#[env(settable)]`
//!
//! On the struct: the struct also implements [`Set`], so it can be annotated
//! as a field of another struct. Its own fields are walked as well.
//!
//! # Coercion
//!
//! The first of these that applies to the field type is used:
//!
//! 1. A function registered with [`Options::set_func`]
//! 2. The type's [`Set`] impl, for types declared with [`settable!`]
//! 3. The builtin parsers for `String`, `bool`, integers and floats
//!
//! Annotated fields of any other type fail with [`Error::Unsupported`].
//! Annotated fields that are not `pub` fail with [`Error::Unsettable`].
//!
//! Integers accept an optional sign and the `0x`, `0o`, `0b` and leading `0`
//! radix prefixes. Booleans accept `1 t T TRUE true True` and
//! `0 f F FALSE false False`.

// Lets derived code inside this crate name it as `::fromenv`.
extern crate self as fromenv;

mod coerce;
mod error;
#[cfg(feature = "json")]
mod json;
mod options;
mod source;
mod tag;
mod types;
mod value;
mod walk;

pub use error::{CoerceError, Error, Location};
#[cfg(feature = "json")]
pub use json::json;
pub use options::{unmarshal, Options};
pub use source::{DefaultsOnly, Env, Source};
pub use tag::{Tag, DEFAULT_SEPARATOR};
pub use types::Url;
#[doc(hidden)]
pub use value::AsAny;
pub use value::{Field, Kind, Node, Primitive, Set, Shape, SharedNode, Slot, Struct, TagStyle, Value};

pub use fromenv_derive::FromEnv;
