//! Integration tests for field resolution and error reporting

use fromenv::{CoerceError, Error, FromEnv, Options};
use std::time::Duration;

#[derive(Debug, Default, FromEnv)]
struct Plain {
    pub name: String,
    pub count: i32,
    flag: bool,
}

#[derive(Debug, Default, FromEnv)]
struct Defaults {
    #[env("NAME=anonymous")]
    pub name: String,

    #[env("PORT=8080")]
    pub port: u16,

    #[env("RATIO=0.5")]
    pub ratio: f64,

    #[env("DEBUG=true")]
    pub debug: bool,

    #[env("EMPTY=")]
    pub empty: String,

    #[env("NO_DEFAULT")]
    pub no_default: i64,
}

impl Defaults {
    fn with_priors() -> Self {
        Self {
            name: "prior".to_string(),
            port: 1,
            ratio: 1.0,
            debug: false,
            empty: "prior".to_string(),
            no_default: 42,
        }
    }
}

#[derive(Debug, Default, FromEnv)]
struct Numbers {
    #[env("SMALL")]
    pub small: i8,

    #[env("COUNT")]
    pub count: u32,

    #[env("FLAG")]
    pub flag: bool,

    #[env("RATIO")]
    pub ratio: f32,
}

#[derive(Debug, Default, FromEnv)]
#[env(separator = ',')]
struct Comma {
    #[env("nokey,def-val,with-sep")]
    pub value: String,

    #[env("other=literal")]
    pub other: String,
}

#[derive(Debug, Default, FromEnv)]
#[env(prefix = "APP_")]
struct Prefixed {
    #[env("HOST=localhost")]
    pub host: String,

    pub inner: Unprefixed,
}

#[derive(Debug, Default, FromEnv)]
struct Unprefixed {
    #[env("HOST")]
    pub host: String,
}

#[derive(Debug, Default, FromEnv)]
struct EmptyKeys {
    #[env("")]
    pub blank: String,

    #[env("=fallback")]
    pub keyless: String,

    #[env("")]
    hidden: String,
}

#[derive(Debug, Default, FromEnv)]
struct Private {
    #[env("VISIBLE=yes")]
    pub visible: String,

    #[env("SECRET=x")]
    secret: String,
}

#[derive(Debug, Default, FromEnv)]
struct Timeouts {
    #[env("TIMEOUT=5s")]
    pub timeout: Duration,
}

#[derive(Debug, Default, FromEnv)]
struct AnnotatedStruct {
    #[env("INNER")]
    pub inner: Unprefixed,
}

fn failing_lookup(key: &str) -> anyhow::Result<Option<String>> {
    anyhow::bail!("lookup of {key} should not happen")
}

#[test]
fn test_no_annotations_mutates_nothing() {
    let mut plain = Plain {
        name: "kept".to_string(),
        count: 3,
        flag: true,
    };
    Options::new()
        .map([("name", "changed"), ("NAME", "changed"), ("COUNT", "9")])
        .unmarshal(&mut plain)
        .unwrap();

    assert_eq!(plain.name, "kept");
    assert_eq!(plain.count, 3);
    assert!(plain.flag);
}

#[test]
fn test_defaults_apply_when_absent() {
    let mut config = Defaults::with_priors();
    Options::new()
        .map::<_, &str, &str>([])
        .unmarshal(&mut config)
        .unwrap();

    assert_eq!(config.name, "anonymous");
    assert_eq!(config.port, 8080);
    assert_eq!(config.ratio, 0.5);
    assert!(config.debug);
    assert_eq!(config.empty, "");
    assert_eq!(config.no_default, 42);
}

#[test]
fn test_source_wins_over_default() {
    let mut config = Defaults::with_priors();
    Options::new()
        .map([
            ("NAME", ""),
            ("PORT", "9090"),
            ("RATIO", "1e-3"),
            ("DEBUG", "F"),
            ("EMPTY", "filled"),
            ("NO_DEFAULT", "-7"),
        ])
        .unmarshal(&mut config)
        .unwrap();

    assert_eq!(config.name, "");
    assert_eq!(config.port, 9090);
    assert_eq!(config.ratio, 0.001);
    assert!(!config.debug);
    assert_eq!(config.empty, "filled");
    assert_eq!(config.no_default, -7);
}

#[test]
fn test_defaults_only_ignores_earlier_map() {
    let mut config = Defaults::with_priors();
    Options::new()
        .map([("PORT", "9090"), ("NO_DEFAULT", "1")])
        .defaults_only()
        .unmarshal(&mut config)
        .unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.name, "anonymous");
    assert_eq!(config.no_default, 42);
}

#[test]
fn test_only_first_separator_splits() {
    let mut comma = Comma::default();
    Options::new().defaults_only().unmarshal(&mut comma).unwrap();
    assert_eq!(comma.value, "def-val,with-sep");
    assert_eq!(comma.other, "");

    let mut comma = Comma::default();
    Options::new()
        .map([("nokey", "v"), ("other=literal", "found")])
        .unmarshal(&mut comma)
        .unwrap();
    assert_eq!(comma.value, "v");
    assert_eq!(comma.other, "found");
}

#[test]
fn test_prefix_applies_to_own_fields_only() {
    let mut config = Prefixed::default();
    Options::new()
        .map([("APP_HOST", "outer"), ("HOST", "inner")])
        .unmarshal(&mut config)
        .unwrap();

    assert_eq!(config.host, "outer");
    assert_eq!(config.inner.host, "inner");
}

#[test]
fn test_empty_keys_are_ignored() {
    let mut config = EmptyKeys::default();
    Options::new()
        .lookup(failing_lookup)
        .unmarshal(&mut config)
        .unwrap();

    assert_eq!(config.blank, "");
    assert_eq!(config.keyless, "");
    assert_eq!(config.hidden, "");
}

#[test]
fn test_unsettable_field() {
    let mut config = Private::default();
    let err = Options::new()
        .defaults_only()
        .unmarshal(&mut config)
        .unwrap_err();

    let Error::Unsettable { location } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(location.struct_name, "Private");
    assert_eq!(location.field, "secret");
    assert_eq!(
        err.to_string(),
        "unsettable field: field secret (alloc::string::String) in struct Private"
    );
    // Fields before the failure keep their values
    assert_eq!(config.visible, "yes");
    assert_eq!(config.secret, "");
}

#[test]
fn test_structural_errors_precede_lookup() {
    let err = Options::new()
        .lookup(failing_lookup)
        .unmarshal(&mut Timeouts::default())
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }), "{err}");

    let err = Options::new()
        .lookup(|key: &str| match key {
            "VISIBLE" => Ok(None),
            _ => failing_lookup(key),
        })
        .unmarshal(&mut Private::default())
        .unwrap_err();
    assert!(matches!(err, Error::Unsettable { .. }), "{err}");
}

#[test]
fn test_unsupported_types() {
    let err = Options::new()
        .defaults_only()
        .unmarshal(&mut Timeouts::default())
        .unwrap_err();
    assert_eq!(
        err.location().map(|l| l.field),
        Some("timeout"),
        "{err}"
    );
    assert!(err.to_string().starts_with("unsupported type: field timeout"));

    let err = Options::new()
        .map([("INNER", "x")])
        .unmarshal(&mut AnnotatedStruct::default())
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }), "{err}");
}

#[test]
fn test_lookup_error_is_wrapped() {
    let mut numbers = Numbers::default();
    let err = Options::new()
        .lookup(|key: &str| -> anyhow::Result<Option<String>> {
            if key == "COUNT" {
                anyhow::bail!("vault unavailable");
            }
            Ok(Some("1".to_string()))
        })
        .unmarshal(&mut numbers)
        .unwrap_err();

    assert!(matches!(&err, Error::Lookup { key, .. } if key == "COUNT"));
    assert_eq!(
        err.to_string(),
        "lookup of 'COUNT' failed: vault unavailable: field count (u32) in struct Numbers"
    );
    assert_eq!(numbers.small, 1);
    assert!(!numbers.flag);
}

#[test]
fn test_malformed_integer() {
    let mut numbers = Numbers::default();
    let err = Options::new()
        .map([("COUNT", "abc")])
        .unmarshal(&mut numbers)
        .unwrap_err();

    let Error::Coerce { key, source, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(key, "COUNT");
    assert!(matches!(source, CoerceError::Int { raw, .. } if raw == "abc"));
    assert_eq!(
        err.to_string(),
        "failed to configure from 'COUNT': parsing \"abc\": invalid digit found in string: field count (u32) in struct Numbers"
    );
}

#[test]
fn test_out_of_range_keeps_prior_value() {
    for raw in ["128", "-129", "0x80"] {
        let mut numbers = Numbers {
            small: 5,
            ..Default::default()
        };
        let err = Options::new()
            .map([("SMALL", raw)])
            .unmarshal(&mut numbers)
            .unwrap_err();

        assert!(
            matches!(
                &err,
                Error::Coerce {
                    source: CoerceError::OutOfRange { type_name: "i8", .. },
                    ..
                }
            ),
            "{raw}: {err}"
        );
        assert!(err.to_string().contains("out of range"));
        assert_eq!(numbers.small, 5);
    }
}

#[test]
fn test_integer_literals() {
    for (raw, expected) in [("0x7f", 127), ("017", 15), ("-0b101", -5), ("+0o10", 8), ("0", 0), ("1_0", 10), ("0x_1f", 31)] {
        let mut numbers = Numbers::default();
        Options::new()
            .map([("SMALL", raw)])
            .unmarshal(&mut numbers)
            .unwrap();
        assert_eq!(numbers.small, expected, "{raw}");
    }
}

#[test]
fn test_float_overflow_is_out_of_range() {
    let mut defaults = Defaults::with_priors();
    let err = Options::new()
        .map([("RATIO", "1e400")])
        .unmarshal(&mut defaults)
        .unwrap_err();
    assert!(
        matches!(&err, Error::Coerce { source: CoerceError::OutOfRange { type_name: "f64", .. }, .. }),
        "{err}"
    );
    assert_eq!(defaults.ratio, 1.0);

    let mut numbers = Numbers::default();
    let err = Options::new()
        .map([("RATIO", "1e50")])
        .unmarshal(&mut numbers)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to configure from 'RATIO': parsing \"1e50\": value out of range for f32: field ratio (f32) in struct Numbers"
    );
    assert_eq!(numbers.ratio, 0.0);

    Options::new()
        .map([("RATIO", "-inf")])
        .unmarshal(&mut numbers)
        .unwrap();
    assert_eq!(numbers.ratio, f32::NEG_INFINITY);
}

#[test]
fn test_malformed_bool_and_float() {
    let err = Options::new()
        .map([("FLAG", "yes")])
        .unmarshal(&mut Numbers::default())
        .unwrap_err();
    assert!(
        matches!(&err, Error::Coerce { source: CoerceError::Bool { raw }, .. } if raw == "yes"),
        "{err}"
    );

    let err = Options::new()
        .map([("RATIO", "half")])
        .unmarshal(&mut Numbers::default())
        .unwrap_err();
    assert!(
        matches!(&err, Error::Coerce { source: CoerceError::Float { .. }, .. }),
        "{err}"
    );
}

#[test]
fn test_invalid_roots() {
    let err = fromenv::unmarshal(&mut 5u8).unwrap_err();
    assert_eq!(
        err.to_string(),
        "expected a struct or a non-empty reference to one, got u8"
    );

    let mut none: Option<Defaults> = None;
    let err = Options::new().defaults_only().unmarshal(&mut none).unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));
    assert!(none.is_none());
}
