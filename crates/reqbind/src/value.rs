//! Dynamic field values and the closed set of bindable value kinds.
//!
//! Records never expose their fields reflectively. Instead every bindable
//! field type implements [`FieldType`], which names its [`ValueKind`] and
//! converts to and from the dynamic [`Value`] carried through the decoder.

use bytes::Bytes;
use http::{HeaderMap, Uri};
use std::any::{type_name, Any};
use std::fmt;

use crate::error::BoxError;
use crate::form::FormValues;
use crate::request::RequestHead;

/// Width of a signed integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    Isize,
}

/// Width of an unsigned integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UintWidth {
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    Usize,
}

/// Width of a floating-point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    /// `f32`
    F32,
    /// `f64`
    F64,
}

/// Type-erased text codec entry points for a [`TextCodec`] type.
#[derive(Debug, Clone, Copy)]
pub struct TextHooks {
    /// Name of the implementing type
    pub type_name: &'static str,
    /// Parses text into a [`Value::Custom`]
    pub parse: fn(&str) -> Result<Value, BoxError>,
    /// Writes a [`Value::Custom`] back to text
    pub write: fn(&Value) -> Result<String, BoxError>,
}

/// The kind of a bindable field.
///
/// Any field type outside this set is [`ValueKind::Unsupported`]; the schema
/// compiler rejects such a field unless it is bound by JSON only.
#[derive(Debug, Clone)]
pub enum ValueKind {
    /// `String`
    Str,
    /// `bool`
    Bool,
    /// Signed integer
    Int(IntWidth),
    /// Unsigned integer
    Uint(UintWidth),
    /// Floating point
    Float(FloatWidth),
    /// Sequence of the inner kind
    Seq(Box<ValueKind>),
    /// Optional holder of the inner kind
    Optional(Box<ValueKind>),
    /// Type with its own textual codec
    Text(TextHooks),
    /// `bytes::Bytes`
    Bytes,
    /// `serde_json::Value`
    Json,
    /// Whole header map of the request
    Headers,
    /// Request URL
    Url,
    /// Parsed query values of the request
    Query,
    /// Request head
    Request,
    /// Any other type, by name
    Unsupported(&'static str),
}

impl ValueKind {
    /// Builds the kind for a type with a textual codec.
    pub fn text<T: TextCodec + Send + 'static>() -> Self {
        Self::Text(TextHooks {
            type_name: type_name::<T>(),
            parse: parse_text_erased::<T>,
            write: write_text_erased::<T>,
        })
    }

    /// Returns `true` for sequence kinds.
    pub fn is_seq(&self) -> bool {
        matches!(self, Self::Seq(_))
    }

    /// Returns `true` for a sequence of unsigned bytes.
    pub fn is_byte_seq(&self) -> bool {
        matches!(self, Self::Seq(item) if matches!(**item, Self::Uint(UintWidth::U8)))
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => f.write_str("String"),
            Self::Bool => f.write_str("bool"),
            Self::Int(width) => f.write_str(match width {
                IntWidth::I8 => "i8",
                IntWidth::I16 => "i16",
                IntWidth::I32 => "i32",
                IntWidth::I64 => "i64",
                IntWidth::Isize => "isize",
            }),
            Self::Uint(width) => f.write_str(match width {
                UintWidth::U8 => "u8",
                UintWidth::U16 => "u16",
                UintWidth::U32 => "u32",
                UintWidth::U64 => "u64",
                UintWidth::Usize => "usize",
            }),
            Self::Float(FloatWidth::F32) => f.write_str("f32"),
            Self::Float(FloatWidth::F64) => f.write_str("f64"),
            Self::Seq(item) => write!(f, "Vec<{item}>"),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Text(hooks) => f.write_str(hooks.type_name),
            Self::Bytes => f.write_str("Bytes"),
            Self::Json => f.write_str("serde_json::Value"),
            Self::Headers => f.write_str("HeaderMap"),
            Self::Url => f.write_str("Uri"),
            Self::Query => f.write_str("FormValues"),
            Self::Request => f.write_str("RequestHead"),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}

/// A dynamically typed field value.
pub enum Value {
    /// Absent optional value
    Null,
    /// Text
    Str(String),
    /// Boolean
    Bool(bool),
    /// Signed integer of any width
    Int(i64),
    /// Unsigned integer of any width
    Uint(u64),
    /// Float of any width
    Float(f64),
    /// Sequence items
    Seq(Vec<Value>),
    /// Raw bytes
    Bytes(Bytes),
    /// Generic JSON document
    Json(serde_json::Value),
    /// Request header map
    Headers(HeaderMap),
    /// Request URI
    Url(Uri),
    /// Parsed query values
    Query(FormValues),
    /// Request head
    Request(RequestHead),
    /// Value of a [`TextCodec`] type
    Custom(Box<dyn Any + Send>),
}

impl Value {
    /// Wraps a value of a custom type.
    pub fn custom<T: Any + Send>(value: T) -> Self {
        Self::Custom(Box::new(value))
    }

    /// Unwraps a value of a custom type.
    pub fn into_custom<T: Any>(self) -> Option<T> {
        match self {
            Self::Custom(boxed) => boxed.downcast::<T>().ok().map(|value| *value),
            _ => None,
        }
    }

    /// Borrows a value of a custom type.
    pub fn as_custom<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(boxed) => boxed.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Seq(_) => "sequence",
            Self::Bytes(_) => "bytes",
            Self::Json(_) => "json",
            Self::Headers(_) => "headers",
            Self::Url(_) => "url",
            Self::Query(_) => "query values",
            Self::Request(_) => "request",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Seq(v) => f.debug_tuple("Seq").field(v).finish(),
            Self::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Self::Headers(v) => f.debug_tuple("Headers").field(v).finish(),
            Self::Url(v) => f.debug_tuple("Url").field(v).finish(),
            Self::Query(v) => f.debug_tuple("Query").field(v).finish(),
            Self::Request(v) => f.debug_tuple("Request").field(v).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A type with its own textual representation.
///
/// Implementing this and invoking [`text_field!`](crate::text_field) makes
/// the type bindable. A textual codec takes priority over the built-in kinds.
///
/// # Example
///
/// ```rust
/// use reqbind::TextCodec;
///
/// #[derive(Clone)]
/// struct Upper(String);
///
/// impl TextCodec for Upper {
///     type Error = std::convert::Infallible;
///
///     fn parse_text(text: &str) -> Result<Self, Self::Error> {
///         Ok(Upper(text.to_uppercase()))
///     }
///
///     fn write_text(&self) -> Result<String, Self::Error> {
///         Ok(self.0.clone())
///     }
/// }
///
/// reqbind::text_field!(Upper);
/// ```
pub trait TextCodec: Sized {
    /// Error raised by either direction.
    type Error: Into<BoxError>;

    /// Parses the type from text.
    fn parse_text(text: &str) -> Result<Self, Self::Error>;

    /// Writes the type as text.
    fn write_text(&self) -> Result<String, Self::Error>;
}

fn parse_text_erased<T: TextCodec + Send + 'static>(text: &str) -> Result<Value, BoxError> {
    T::parse_text(text).map(Value::custom).map_err(Into::into)
}

fn write_text_erased<T: TextCodec + 'static>(value: &Value) -> Result<String, BoxError> {
    match value.as_custom::<T>() {
        Some(inner) => inner.write_text().map_err(Into::into),
        None => Err(format!(
            "expected a value of {}, got {}",
            type_name::<T>(),
            value.describe()
        )
        .into()),
    }
}

/// A type that can be the target of a bound field.
pub trait FieldType: Sized + 'static {
    /// Kind used to pick the codec for this type.
    fn kind() -> ValueKind;

    /// Converts a decoded value into the field type.
    ///
    /// Returns `None` when the value does not fit the type.
    fn from_value(value: Value) -> Option<Self>;

    /// Reads the field as a dynamic value.
    fn to_value(&self) -> Value;
}

impl FieldType for String {
    fn kind() -> ValueKind {
        ValueKind::Str
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl FieldType for bool {
    fn kind() -> ValueKind {
        ValueKind::Bool
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! int_field {
    ($($ty:ty => $width:ident),+ $(,)?) => {$(
        impl FieldType for $ty {
            fn kind() -> ValueKind {
                ValueKind::Int(IntWidth::$width)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Int(v) => <$ty>::try_from(v).ok(),
                    _ => None,
                }
            }

            #[allow(clippy::cast_lossless, clippy::cast_possible_wrap)]
            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }
        }
    )+};
}

macro_rules! uint_field {
    ($($ty:ty => $width:ident),+ $(,)?) => {$(
        impl FieldType for $ty {
            fn kind() -> ValueKind {
                ValueKind::Uint(UintWidth::$width)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Uint(v) => <$ty>::try_from(v).ok(),
                    _ => None,
                }
            }

            #[allow(clippy::cast_lossless)]
            fn to_value(&self) -> Value {
                Value::Uint(*self as u64)
            }
        }
    )+};
}

int_field!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
uint_field!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);

impl FieldType for f32 {
    fn kind() -> ValueKind {
        ValueKind::Float(FloatWidth::F32)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v as f32),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FieldType for f64 {
    fn kind() -> ValueKind {
        ValueKind::Float(FloatWidth::F64)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn kind() -> ValueKind {
        ValueKind::Seq(Box::new(T::kind()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            // Raw bodies land in Vec<u8> as bytes.
            Value::Bytes(bytes) => bytes
                .iter()
                .map(|b| T::from_value(Value::Uint(u64::from(*b))))
                .collect(),
            Value::Null => Some(Vec::new()),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(FieldType::to_value).collect())
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn kind() -> ValueKind {
        ValueKind::Optional(Box::new(T::kind()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldType::to_value)
    }
}

impl FieldType for Bytes {
    fn kind() -> ValueKind {
        ValueKind::Bytes
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl FieldType for serde_json::Value {
    fn kind() -> ValueKind {
        ValueKind::Json
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Json(v) => Some(v),
            Value::Null => Some(Self::Null),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }
}

impl FieldType for HeaderMap {
    fn kind() -> ValueKind {
        ValueKind::Headers
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Headers(h) => Some(h),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Headers(self.clone())
    }
}

impl FieldType for Uri {
    fn kind() -> ValueKind {
        ValueKind::Url
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Url(u) => Some(u),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Url(self.clone())
    }
}

impl FieldType for FormValues {
    fn kind() -> ValueKind {
        ValueKind::Query
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Query(q) => Some(q),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Query(self.clone())
    }
}

impl FieldType for RequestHead {
    fn kind() -> ValueKind {
        ValueKind::Request
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Request(r) => Some(r),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Request(self.clone())
    }
}

/// Makes [`TextCodec`] types bindable.
///
/// The types must also be `Clone + Send + 'static`.
#[macro_export]
macro_rules! text_field {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::FieldType for $ty {
            fn kind() -> $crate::ValueKind {
                $crate::ValueKind::text::<$ty>()
            }

            fn from_value(value: $crate::Value) -> ::std::option::Option<Self> {
                value.into_custom::<$ty>()
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::custom(::std::clone::Clone::clone(self))
            }
        }
    )+};
}

/// Declares types that have no string codec.
///
/// Such fields compile only when bound through JSON alone or skipped.
#[macro_export]
macro_rules! opaque_field {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::FieldType for $ty {
            fn kind() -> $crate::ValueKind {
                $crate::ValueKind::Unsupported(::std::any::type_name::<$ty>())
            }

            fn from_value(_value: $crate::Value) -> ::std::option::Option<Self> {
                ::std::option::Option::None
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Null
            }
        }
    )+};
}
