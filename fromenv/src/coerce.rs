//! Converting a resolved string into a field's type

use crate::error::CoerceError;
use crate::value::{Kind, Primitive, Shape, Value};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::num::IntErrorKind;

type CoerceFn = Box<dyn Fn(&mut dyn Any, &str) -> anyhow::Result<()>>;

/// Coercion strategy chosen for a field, before any lookup happens.
pub(crate) enum Strategy<'r> {
    /// A function registered for exactly the target type
    Custom(&'r CoerceFn),
    /// The target's own [`Set`](crate::Set) impl
    Settable,
    /// One of the builtin parsers
    Primitive,
}

/// Coercion functions registered per target type.
#[derive(Default)]
pub(crate) struct Registry {
    custom: HashMap<TypeId, CoerceFn>,
}

impl Registry {
    /// Register `f` for `T`, replacing any earlier registration.
    pub(crate) fn register<T, F>(&mut self, f: F)
    where
        T: Any,
        F: Fn(&mut T, &str) -> anyhow::Result<()> + 'static,
    {
        let erased = move |target: &mut dyn Any, raw: &str| match target.downcast_mut::<T>() {
            Some(target) => f(target, raw),
            None => anyhow::bail!(
                "coercion registered for {} applied to another type",
                type_name::<T>()
            ),
        };
        self.custom.insert(TypeId::of::<T>(), Box::new(erased));
    }

    /// Custom, then settable, then builtin. `None` means unsupported.
    pub(crate) fn strategy(&self, shape: &Shape) -> Option<Strategy<'_>> {
        if let Some(f) = self.custom.get(&shape.type_id) {
            return Some(Strategy::Custom(f));
        }
        match shape.kind {
            Kind::Settable => Some(Strategy::Settable),
            kind if kind.is_primitive() => Some(Strategy::Primitive),
            _ => None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.custom.len()
    }
}

/// Write `raw` into `value`, allocating optional storage first.
///
/// On failure the previous value is kept.
pub(crate) fn coerce(
    strategy: &Strategy<'_>,
    value: &mut dyn Value,
    raw: &str,
) -> Result<(), CoerceError> {
    let target = value.target();
    match strategy {
        Strategy::Custom(f) => f(target.as_any_mut(), raw).map_err(CoerceError::Custom),
        Strategy::Settable => match target.settable() {
            Some(settable) => settable.set(raw).map_err(CoerceError::Custom),
            None => Err(CoerceError::Custom(anyhow::anyhow!(
                "value has no string setter"
            ))),
        },
        Strategy::Primitive => match target.primitive() {
            Some(primitive) => set_primitive(primitive, raw),
            None => Err(CoerceError::Custom(anyhow::anyhow!(
                "value has no builtin parser"
            ))),
        },
    }
}

fn set_primitive(primitive: Primitive<'_>, raw: &str) -> Result<(), CoerceError> {
    match primitive {
        Primitive::String(v) => *v = raw.to_string(),
        Primitive::Bool(v) => *v = parse_bool(raw)?,
        Primitive::I8(v) => *v = parse_signed(raw)?,
        Primitive::I16(v) => *v = parse_signed(raw)?,
        Primitive::I32(v) => *v = parse_signed(raw)?,
        Primitive::I64(v) => *v = parse_signed(raw)?,
        Primitive::I128(v) => *v = parse_signed(raw)?,
        Primitive::Isize(v) => *v = parse_signed(raw)?,
        Primitive::U8(v) => *v = parse_unsigned(raw)?,
        Primitive::U16(v) => *v = parse_unsigned(raw)?,
        Primitive::U32(v) => *v = parse_unsigned(raw)?,
        Primitive::U64(v) => *v = parse_unsigned(raw)?,
        Primitive::U128(v) => *v = parse_unsigned(raw)?,
        Primitive::Usize(v) => *v = parse_unsigned(raw)?,
        Primitive::F32(v) => *v = parse_float(raw)?,
        Primitive::F64(v) => *v = parse_float(raw)?,
    }
    Ok(())
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub(crate) fn parse_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoerceError::Bool {
            raw: raw.to_string(),
        }),
    }
}

/// Split off a radix prefix: `0x`, `0o`, `0b`, or a bare leading `0` (octal).
fn split_radix(digits: &str) -> (u32, &str) {
    let bytes = digits.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return (10, digits);
    }
    match bytes[1] {
        b'x' | b'X' => (16, &digits[2..]),
        b'o' | b'O' => (8, &digits[2..]),
        b'b' | b'B' => (2, &digits[2..]),
        _ => (8, &digits[1..]),
    }
}

fn int_error(raw: &str, source: std::num::ParseIntError) -> CoerceError {
    CoerceError::Int {
        raw: raw.to_string(),
        source,
    }
}

fn out_of_range<T>(raw: &str) -> CoerceError {
    CoerceError::OutOfRange {
        raw: raw.to_string(),
        type_name: type_name::<T>(),
    }
}

/// `_` may only separate two digits, or follow a radix prefix.
fn separators_ok(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_alphanumeric()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_alphanumeric))
    })
}

fn parse_wide_unsigned(raw: &str, digits: &str) -> Result<u128, CoerceError> {
    let valid = separators_ok(digits);
    let (radix, digits) = split_radix(digits);
    let stripped: String;
    // from_str_radix accepts a leading '+', which is not valid here; a lone
    // "+" or "_" makes it fail with InvalidDigit
    let digits = if !valid {
        "_"
    } else if digits.starts_with('+') {
        "+"
    } else if digits.contains('_') {
        stripped = digits.replace('_', "");
        &stripped
    } else {
        digits
    };
    u128::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => CoerceError::OutOfRange {
            raw: raw.to_string(),
            type_name: "u128",
        },
        _ => int_error(raw, e),
    })
}

/// Parse a signed integer of any width, with an optional radix prefix.
pub(crate) fn parse_signed<T: TryFrom<i128>>(raw: &str) -> Result<T, CoerceError> {
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let magnitude = parse_wide_unsigned(raw, digits).map_err(|e| match e {
        CoerceError::OutOfRange { .. } => out_of_range::<T>(raw),
        e => e,
    })?;
    let wide = if negative {
        0i128.checked_sub_unsigned(magnitude)
    } else {
        i128::try_from(magnitude).ok()
    };
    wide.and_then(|wide| T::try_from(wide).ok())
        .ok_or_else(|| out_of_range::<T>(raw))
}

/// Parse an unsigned integer of any width, with an optional radix prefix.
///
/// Any sign is a syntax error, not an out of range value.
pub(crate) fn parse_unsigned<T: TryFrom<u128>>(raw: &str) -> Result<T, CoerceError> {
    let wide = parse_wide_unsigned(raw, raw).map_err(|e| match e {
        CoerceError::OutOfRange { .. } => out_of_range::<T>(raw),
        e => e,
    })?;
    T::try_from(wide).map_err(|_| out_of_range::<T>(raw))
}

fn is_infinity_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Parse a float. A finite literal too large for `T` is out of range rather
/// than rounded to infinity.
pub(crate) fn parse_float<T>(raw: &str) -> Result<T, CoerceError>
where
    T: std::str::FromStr<Err = std::num::ParseFloatError> + Into<f64> + Copy,
{
    let value: T = raw.parse().map_err(|source| CoerceError::Float {
        raw: raw.to_string(),
        source,
    })?;
    if value.into().is_infinite() && !is_infinity_literal(raw) {
        return Err(out_of_range::<T>(raw));
    }
    Ok(value)
}
