//! Error types for populating structs from the environment

use std::fmt;

/// Identifies the struct field an error is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Name of the struct that declares the field
    pub struct_name: &'static str,
    /// Name of the field
    pub field: &'static str,
    /// Rust type name of the field, as reported by `std::any::type_name`
    pub type_name: &'static str,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field {} ({}) in struct {}",
            self.field, self.type_name, self.struct_name
        )
    }
}

/// Errors returned by [`unmarshal`](crate::unmarshal) and
/// [`Options::unmarshal`](crate::Options::unmarshal).
///
/// Every error aborts the walk at the field where it occurred. Fields set
/// before that point keep their new values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The root is not a struct, or is an empty optional reference to one.
    #[error("expected a struct or a non-empty reference to one, got {type_name}")]
    InvalidInput {
        /// Rust type name of the rejected root
        type_name: &'static str,
    },

    /// The active value source failed to look up a key.
    #[error("lookup of '{key}' failed: {source}: {location}")]
    Lookup {
        /// Key being looked up
        key: String,
        /// Field the key belongs to
        location: Location,
        /// Error reported by the value source
        source: anyhow::Error,
    },

    /// An annotation was found on a field that is not `pub`.
    #[error("unsettable field: {location}")]
    Unsettable {
        /// Offending field
        location: Location,
    },

    /// An annotation was found on a field whose type has no coercion strategy.
    #[error("unsupported type: {location}")]
    Unsupported {
        /// Offending field
        location: Location,
    },

    /// The resolved string could not be converted into the field's type.
    #[error("failed to configure from '{key}': {source}: {location}")]
    Coerce {
        /// Key the raw value was resolved for
        key: String,
        /// Field being set
        location: Location,
        /// Underlying conversion failure
        source: CoerceError,
    },

    /// A shared structure was mutably borrowed by the caller during the walk.
    #[error("shared struct {type_name} is already borrowed")]
    Borrowed {
        /// Rust type name of the borrowed struct
        type_name: &'static str,
    },
}

impl Error {
    /// Field the error is attributed to, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Lookup { location, .. }
            | Self::Unsettable { location }
            | Self::Unsupported { location }
            | Self::Coerce { location, .. } => Some(location),
            Self::InvalidInput { .. } | Self::Borrowed { .. } => None,
        }
    }
}

/// Failure to convert a raw string into a field's type.
#[derive(Debug, thiserror::Error)]
pub enum CoerceError {
    /// Malformed integer literal, or a literal too large for 128 bits.
    #[error("parsing {raw:?}: {source}")]
    Int {
        /// The raw string
        raw: String,
        /// Error from the integer parser
        source: std::num::ParseIntError,
    },

    /// Well-formed number that does not fit the field's type.
    #[error("parsing {raw:?}: value out of range for {type_name}")]
    OutOfRange {
        /// The raw string
        raw: String,
        /// Target numeric type
        type_name: &'static str,
    },

    /// Malformed floating point literal.
    #[error("parsing {raw:?}: {source}")]
    Float {
        /// The raw string
        raw: String,
        /// Error from the float parser
        source: std::num::ParseFloatError,
    },

    /// Not one of the accepted boolean literals.
    #[error("parsing {raw:?}: invalid boolean literal")]
    Bool {
        /// The raw string
        raw: String,
    },

    /// A registered coercion function or a [`Set`](crate::Set) impl failed.
    #[error(transparent)]
    Custom(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location {
            struct_name: "Config",
            field: "port",
            type_name: "u16",
        }
    }

    #[test]
    fn test_location_display() {
        assert_eq!(location().to_string(), "field port (u16) in struct Config");
    }

    #[test]
    fn test_lookup_error_mentions_key_and_field() {
        let err = Error::Lookup {
            key: "PORT".to_string(),
            location: location(),
            source: anyhow::anyhow!("vault unreachable"),
        };
        assert_eq!(
            err.to_string(),
            "lookup of 'PORT' failed: vault unreachable: field port (u16) in struct Config"
        );
    }

    #[test]
    fn test_coerce_error_mentions_raw_value() {
        let err = Error::Coerce {
            key: "PORT".to_string(),
            location: location(),
            source: CoerceError::OutOfRange {
                raw: "70000".to_string(),
                type_name: "u16",
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("'PORT'"));
        assert!(msg.contains("\"70000\""));
        assert!(msg.contains("out of range for u16"));
        assert!(msg.ends_with("field port (u16) in struct Config"));
    }

    #[test]
    fn test_location_accessor() {
        let err = Error::Unsettable {
            location: location(),
        };
        assert_eq!(err.location(), Some(&location()));

        let err = Error::InvalidInput { type_name: "i32" };
        assert!(err.location().is_none());
    }

    #[test]
    fn test_custom_is_transparent() {
        let err = CoerceError::Custom(anyhow::anyhow!("bad duration"));
        assert_eq!(err.to_string(), "bad duration");
    }
}
