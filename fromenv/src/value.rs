//! The schema `#[derive(FromEnv)]` generates, and the field types it understands
//!
//! A derived struct implements [`Struct`], which enumerates its fields as
//! [`Field`] descriptors, and [`Value`], which lets it appear as a field of
//! another struct. Every other field type implements [`Value`] directly.

use crate::tag::DEFAULT_SEPARATOR;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

/// Coarse classification of a field type, used to pick a coercion strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Bool,
    Int,
    Uint,
    Float,
    /// Implements [`Set`]
    Settable,
    /// Derives `FromEnv`
    Struct,
    /// Only a registered coercion function can set it
    Opaque,
}

impl Kind {
    /// Whether a builtin parser exists for this kind.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::String | Self::Bool | Self::Int | Self::Uint | Self::Float
        )
    }
}

/// Static description of the storage a raw string is coerced into.
///
/// For `Option<T>` and `Box<T>` this describes `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub type_id: TypeId,
    pub kind: Kind,
}

impl Shape {
    pub fn of<T: Any>(kind: Kind) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            kind,
        }
    }
}

/// A type that can parse a string into itself.
///
/// Types implementing `Set` take part in coercion once they are registered as
/// values with [`settable!`](crate::settable).
pub trait Set {
    /// Replace `self` with the value parsed from `raw`.
    fn set(&mut self, raw: &str) -> anyhow::Result<()>;
}

/// Mutable view of a field with a builtin parser.
#[derive(Debug)]
pub enum Primitive<'a> {
    String(&'a mut String),
    Bool(&'a mut bool),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    I128(&'a mut i128),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    U128(&'a mut u128),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
}

#[doc(hidden)]
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A type that may appear as a field of a `FromEnv` struct.
pub trait Value: AsAny {
    /// Description of the coercion target.
    fn shape() -> Shape
    where
        Self: Sized;

    /// The storage a resolved string is written to.
    ///
    /// Optional storage is allocated here, so this is only called once a
    /// value has been resolved. Storage that is already allocated is reused,
    /// which also mutates any other holder of it.
    fn target(&mut self) -> &mut dyn Value;

    /// The generic string setter, if the type has one.
    fn settable(&mut self) -> Option<&mut dyn Set> {
        None
    }

    /// The builtin parser view, if the type is a primitive.
    fn primitive(&mut self) -> Option<Primitive<'_>> {
        None
    }

    /// Queue the structs reachable through this value.
    fn children<'a>(&'a mut self, _queue: &mut VecDeque<Node<'a>>) {}
}

/// How annotations of a struct are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagStyle {
    /// Splits the key from the default
    pub separator: char,
    /// Prepended to every non-empty key
    pub prefix: &'static str,
}

impl Default for TagStyle {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            prefix: "",
        }
    }
}

/// A struct whose fields can be walked. Implemented by `#[derive(FromEnv)]`.
pub trait Struct: Value {
    /// Declared name, used in error messages.
    fn struct_name(&self) -> &'static str;

    fn tag_style(&self) -> TagStyle {
        TagStyle::default()
    }

    /// Fields in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;
}

/// Descriptor of one field, created fresh for each visit.
pub struct Field<'a> {
    pub name: &'static str,
    pub type_name: &'static str,
    /// Raw annotation, if any
    pub tag: Option<&'static str>,
    pub slot: Slot<'a>,
}

pub enum Slot<'a> {
    Writable {
        shape: Shape,
        value: &'a mut dyn Value,
    },
    /// The field is not `pub`
    Unsettable,
}

impl<'a> Field<'a> {
    pub fn writable<T: Value>(
        name: &'static str,
        tag: Option<&'static str>,
        value: &'a mut T,
    ) -> Self {
        Self {
            name,
            type_name: type_name::<T>(),
            tag,
            slot: Slot::Writable {
                shape: T::shape(),
                value,
            },
        }
    }

    pub fn unsettable<T>(name: &'static str, tag: &'static str) -> Self {
        Self {
            name,
            type_name: type_name::<T>(),
            tag: Some(tag),
            slot: Slot::Unsettable,
        }
    }
}

/// A struct waiting to be visited.
pub enum Node<'a> {
    /// Owned by (or borrowed from) the value that queued it
    Inline(&'a mut (dyn Struct + 'static)),
    /// Behind an `Rc<RefCell<_>>`; may be aliased or part of a cycle
    Shared(SharedNode),
}

#[derive(Clone)]
pub struct SharedNode {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) cell: Rc<RefCell<dyn Struct>>,
}

/// Identity of a struct instance: its type and address.
///
/// The type tells apart a struct and a nested struct stored at offset zero.
pub(crate) fn identity(s: &dyn Struct) -> (TypeId, usize) {
    (
        Any::type_id(s.as_any()),
        s as *const dyn Struct as *const () as usize,
    )
}

impl SharedNode {
    pub(crate) fn identity(&self) -> (TypeId, usize) {
        (
            self.type_id,
            RefCell::as_ptr(&self.cell) as *const () as usize,
        )
    }
}

/// Implements [`Value`] for a type implementing [`Set`], so that annotated
/// fields of that type are coerced through [`Set::set`].
///
/// ```rust
/// use fromenv::{settable, Set};
///
/// #[derive(Default)]
/// struct Level(u8);
///
/// impl Set for Level {
///     fn set(&mut self, raw: &str) -> anyhow::Result<()> {
///         self.0 = match raw {
///             "low" => 1,
///             "high" => 9,
///             other => anyhow::bail!("unknown level {other}"),
///         };
///         Ok(())
///     }
/// }
///
/// settable!(Level);
/// ```
#[macro_export]
macro_rules! settable {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Value for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::of::<Self>($crate::Kind::Settable)
            }

            fn target(&mut self) -> &mut dyn $crate::Value {
                self
            }

            fn settable(&mut self) -> ::core::option::Option<&mut dyn $crate::Set> {
                ::core::option::Option::Some(self)
            }
        }
    )+};
}

/// Implements [`Value`] for a type with no parser of its own.
///
/// Annotated fields of the type can only be set through a coercion
/// registered with [`Options::set_func`](crate::Options::set_func); without
/// one they are reported as unsupported.
#[macro_export]
macro_rules! opaque {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Value for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::of::<Self>($crate::Kind::Opaque)
            }

            fn target(&mut self) -> &mut dyn $crate::Value {
                self
            }
        }
    )+};
}

macro_rules! primitive {
    ($($ty:ty => $kind:ident, $variant:ident;)+) => {$(
        impl Value for $ty {
            fn shape() -> Shape {
                Shape::of::<Self>(Kind::$kind)
            }

            fn target(&mut self) -> &mut dyn Value {
                self
            }

            fn primitive(&mut self) -> Option<Primitive<'_>> {
                Some(Primitive::$variant(self))
            }
        }
    )+};
}

primitive! {
    String => String, String;
    bool => Bool, Bool;
    i8 => Int, I8;
    i16 => Int, I16;
    i32 => Int, I32;
    i64 => Int, I64;
    i128 => Int, I128;
    isize => Int, Isize;
    u8 => Uint, U8;
    u16 => Uint, U16;
    u32 => Uint, U32;
    u64 => Uint, U64;
    u128 => Uint, U128;
    usize => Uint, Usize;
    f32 => Float, F32;
    f64 => Float, F64;
}

macro_rules! set_from_str {
    ($($ty:ty),+) => {$(
        impl Set for $ty {
            fn set(&mut self, raw: &str) -> anyhow::Result<()> {
                *self = raw.parse()?;
                Ok(())
            }
        }
    )+};
}

set_from_str!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, PathBuf);
settable!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, PathBuf);
opaque!(Duration);

impl<T: 'static> Value for Vec<T> {
    fn shape() -> Shape {
        Shape::of::<Self>(Kind::Opaque)
    }

    fn target(&mut self) -> &mut dyn Value {
        self
    }
}

impl<T: Value + Default> Value for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn target(&mut self) -> &mut dyn Value {
        self.get_or_insert_with(T::default).target()
    }

    fn children<'a>(&'a mut self, queue: &mut VecDeque<Node<'a>>) {
        if let Some(value) = self {
            value.children(queue);
        }
    }
}

impl<T: Value> Value for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn target(&mut self) -> &mut dyn Value {
        (**self).target()
    }

    fn settable(&mut self) -> Option<&mut dyn Set> {
        (**self).settable()
    }

    fn primitive(&mut self) -> Option<Primitive<'_>> {
        (**self).primitive()
    }

    fn children<'a>(&'a mut self, queue: &mut VecDeque<Node<'a>>) {
        (**self).children(queue);
    }
}

impl<T: Struct> Value for Rc<RefCell<T>> {
    fn shape() -> Shape {
        Shape::of::<Self>(Kind::Opaque)
    }

    fn target(&mut self) -> &mut dyn Value {
        self
    }

    fn children<'a>(&'a mut self, queue: &mut VecDeque<Node<'a>>) {
        let cell: Rc<RefCell<dyn Struct>> = self.clone();
        queue.push_back(Node::Shared(SharedNode {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            cell,
        }));
    }
}
