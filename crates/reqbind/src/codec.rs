//! Codec registry: string parsers and stringifiers per value kind.
//!
//! Resolution is an exhaustive match over [`ValueKind`]. Sequences and
//! optionals recurse into their element kind. Text-codec kinds dispatch to
//! the type's own hooks ahead of any built-in handling.

use std::num::{ParseFloatError, ParseIntError};
use std::sync::Arc;

use crate::error::BoxError;
use crate::value::{FloatWidth, IntWidth, UintWidth, Value, ValueKind};

/// Parses one string into a [`Value`].
pub type Parser = Arc<dyn Fn(&str) -> Result<Value, CodecError> + Send + Sync>;

/// Writes one [`Value`] as a string.
pub type Stringifier = Arc<dyn Fn(&Value) -> Result<String, CodecError> + Send + Sync>;

/// Errors raised by parsers and stringifiers.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Text outside the boolean grammar
    #[error("invalid bool value {0:?}")]
    InvalidBool(String),

    /// Integer text that does not fit the field's width
    #[error(transparent)]
    Int(#[from] ParseIntError),

    /// Text that is not a float
    #[error(transparent)]
    Float(#[from] ParseFloatError),

    /// Failure reported by a [`TextCodec`](crate::TextCodec) type
    #[error(transparent)]
    Text(BoxError),

    /// Value handed to a stringifier does not match its kind
    #[error("cannot write {found} value as {expected}")]
    Mismatch {
        /// Kind the stringifier writes
        expected: String,
        /// Shape of the value it was given
        found: &'static str,
    },
}

/// Options that shape sequence parsing and writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StringOptions {
    /// Item separator; `None` splits on whitespace runs and joins with a space
    pub separator: Option<char>,
}

impl StringOptions {
    /// Options with an explicit item separator.
    pub fn with_separator(separator: char) -> Self {
        Self {
            separator: Some(separator),
        }
    }

    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self.separator {
            None => text.split_whitespace().collect(),
            Some(sep) => text
                .split(sep)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }

    fn join_separator(&self) -> char {
        self.separator.unwrap_or(' ')
    }
}

/// Parses a boolean from its text form.
///
/// Accepts `1 t T TRUE true True y Y yes YES Yes on ON On` as true and the
/// matching negative set as false.
pub fn parse_bool(text: &str) -> Result<bool, CodecError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" | "y" | "Y" | "yes" | "YES" | "Yes" | "on"
        | "ON" | "On" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" | "n" | "N" | "no" | "NO" | "No"
        | "off" | "OFF" | "Off" => Ok(false),
        other => Err(CodecError::InvalidBool(other.to_owned())),
    }
}

/// Parses a boolean, falling back to `default` for text outside the grammar.
pub fn parse_bool_or(text: &str, default: bool) -> bool {
    parse_bool(text).unwrap_or(default)
}

fn parse_int(width: IntWidth, text: &str) -> Result<i64, ParseIntError> {
    match width {
        IntWidth::I8 => text.parse::<i8>().map(i64::from),
        IntWidth::I16 => text.parse::<i16>().map(i64::from),
        IntWidth::I32 => text.parse::<i32>().map(i64::from),
        IntWidth::I64 => text.parse::<i64>(),
        #[allow(clippy::cast_possible_wrap)]
        IntWidth::Isize => text.parse::<isize>().map(|v| v as i64),
    }
}

fn parse_uint(width: UintWidth, text: &str) -> Result<u64, ParseIntError> {
    match width {
        UintWidth::U8 => text.parse::<u8>().map(u64::from),
        UintWidth::U16 => text.parse::<u16>().map(u64::from),
        UintWidth::U32 => text.parse::<u32>().map(u64::from),
        UintWidth::U64 => text.parse::<u64>(),
        UintWidth::Usize => text.parse::<usize>().map(|v| v as u64),
    }
}

fn parse_float(width: FloatWidth, text: &str) -> Result<f64, ParseFloatError> {
    match width {
        FloatWidth::F32 => text.parse::<f32>().map(f64::from),
        FloatWidth::F64 => text.parse::<f64>(),
    }
}

/// Resolves a string parser for a value kind.
///
/// Returns `None` for kinds with no text representation. Empty input
/// yields the kind's zero value for scalars, an empty sequence for
/// sequences and `Null` for optionals.
pub fn resolve_parser(kind: &ValueKind, opts: StringOptions) -> Option<Parser> {
    let parser: Parser = match kind {
        ValueKind::Text(hooks) => {
            let parse = hooks.parse;
            Arc::new(move |text| parse(text).map_err(CodecError::Text))
        }
        ValueKind::Str => Arc::new(|text| Ok(Value::Str(text.to_owned()))),
        ValueKind::Bool => Arc::new(|text| {
            if text.is_empty() {
                return Ok(Value::Bool(false));
            }
            parse_bool(text).map(Value::Bool)
        }),
        ValueKind::Int(width) => {
            let width = *width;
            Arc::new(move |text| {
                if text.is_empty() {
                    return Ok(Value::Int(0));
                }
                Ok(Value::Int(parse_int(width, text)?))
            })
        }
        ValueKind::Uint(width) => {
            let width = *width;
            Arc::new(move |text| {
                if text.is_empty() {
                    return Ok(Value::Uint(0));
                }
                Ok(Value::Uint(parse_uint(width, text)?))
            })
        }
        ValueKind::Float(width) => {
            let width = *width;
            Arc::new(move |text| {
                if text.is_empty() {
                    return Ok(Value::Float(0.0));
                }
                Ok(Value::Float(parse_float(width, text)?))
            })
        }
        ValueKind::Seq(item) => {
            let item = resolve_parser(item, StringOptions::default())?;
            Arc::new(move |text| {
                opts.split(text)
                    .into_iter()
                    .map(|part| item(part))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Seq)
            })
        }
        ValueKind::Optional(inner) => {
            let inner = resolve_parser(inner, opts)?;
            Arc::new(move |text| {
                if text.is_empty() {
                    return Ok(Value::Null);
                }
                inner(text)
            })
        }
        ValueKind::Bytes
        | ValueKind::Json
        | ValueKind::Headers
        | ValueKind::Url
        | ValueKind::Query
        | ValueKind::Request
        | ValueKind::Unsupported(_) => return None,
    };
    Some(parser)
}

fn mismatch(kind: &ValueKind, found: &Value) -> CodecError {
    CodecError::Mismatch {
        expected: kind.to_string(),
        found: found.describe(),
    }
}

/// Resolves a stringifier for a value kind.
///
/// Returns `None` for kinds with no text representation.
pub fn resolve_stringifier(kind: &ValueKind, opts: StringOptions) -> Option<Stringifier> {
    let owned = kind.clone();
    let stringifier: Stringifier = match kind {
        ValueKind::Text(hooks) => {
            let write = hooks.write;
            Arc::new(move |value| write(value).map_err(CodecError::Text))
        }
        ValueKind::Str => Arc::new(move |value| match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(mismatch(&owned, other)),
        }),
        ValueKind::Bool => Arc::new(move |value| match value {
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(mismatch(&owned, other)),
        }),
        ValueKind::Int(_) => Arc::new(move |value| match value {
            Value::Int(v) => Ok(v.to_string()),
            other => Err(mismatch(&owned, other)),
        }),
        ValueKind::Uint(_) => Arc::new(move |value| match value {
            Value::Uint(v) => Ok(v.to_string()),
            other => Err(mismatch(&owned, other)),
        }),
        ValueKind::Float(width) => {
            let width = *width;
            Arc::new(move |value| match (value, width) {
                // Shortest representation that parses back at the field's width.
                (Value::Float(v), FloatWidth::F32) => Ok((*v as f32).to_string()),
                (Value::Float(v), FloatWidth::F64) => Ok(v.to_string()),
                (other, _) => Err(mismatch(&owned, other)),
            })
        }
        ValueKind::Seq(item) => {
            let item = resolve_stringifier(item, StringOptions::default())?;
            let sep = opts.join_separator().to_string();
            Arc::new(move |value| match value {
                Value::Seq(items) => Ok(items
                    .iter()
                    .map(|v| item(v))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(&sep)),
                Value::Null => Ok(String::new()),
                other => Err(mismatch(&owned, other)),
            })
        }
        ValueKind::Optional(inner) => {
            let inner = resolve_stringifier(inner, opts)?;
            Arc::new(move |value| match value {
                Value::Null => Ok(String::new()),
                other => inner(other),
            })
        }
        ValueKind::Bytes
        | ValueKind::Json
        | ValueKind::Headers
        | ValueKind::Url
        | ValueKind::Query
        | ValueKind::Request
        | ValueKind::Unsupported(_) => return None,
    };
    Some(stringifier)
}
