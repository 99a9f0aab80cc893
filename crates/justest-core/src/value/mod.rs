//! Dynamic actual values.
//!
//! Matchers operate on [`Value`], a closed set of kinds mirroring what a
//! reconciler test typically asserts over: scalars, text, collections,
//! errors, and the indirections (pointer, channel, function) that the
//! extractors resolve.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{JustestError, Result, usage_panic};

pub mod channel;
pub mod func;
pub mod pointer;

pub use channel::{Channel, ChannelSender};
pub use func::{BoxError, Func, IntoFunc};
pub use pointer::{Buffer, Pointer};

/// Runtime kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// Untyped nil. Also the default slot of a value extractor.
    Invalid,
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    Uint,
    /// Floating point.
    Float,
    /// UTF-8 text.
    String,
    /// Raw bytes.
    Bytes,
    /// Fixed-size sequence.
    Array,
    /// Growable sequence.
    Slice,
    /// String-keyed mapping.
    Map,
    /// Error value.
    Error,
    /// Shared mutable cell.
    Pointer,
    /// Channel receiver.
    Chan,
    /// Callable.
    Func,
}

impl Kind {
    /// Returns true for kinds that have a typed null.
    #[must_use]
    pub const fn is_nullable(self) -> bool {
        matches!(
            self,
            Self::Chan | Self::Func | Self::Error | Self::Map | Self::Pointer | Self::Slice | Self::Bytes
        )
    }

    /// Returns true for the signed, unsigned and floating point kinds.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Float)
    }

    /// Lowercase kind name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Array => "array",
            Self::Slice => "slice",
            Self::Map => "map",
            Self::Error => "error",
            Self::Pointer => "pointer",
            Self::Chan => "chan",
            Self::Func => "func",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error built from a plain message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct MessageError(pub String);

/// An actual value under test.
#[derive(Clone)]
pub enum Value {
    /// Untyped nil.
    Nil,
    /// Typed null of a nullable kind.
    Null(Kind),
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point.
    Float(f64),
    /// Text.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Fixed-size sequence.
    Array(Vec<Value>),
    /// Growable sequence.
    Slice(Vec<Value>),
    /// String-keyed mapping, ordered by key.
    Map(BTreeMap<String, Value>),
    /// Error value.
    Error(Arc<dyn StdError + Send + Sync>),
    /// Shared mutable cell.
    Pointer(Pointer),
    /// Channel receiver.
    Chan(Channel),
    /// Callable.
    Func(Func),
}

impl Value {
    /// Typed null of `kind`.
    ///
    /// # Panics
    /// Panics if `kind` has no null.
    #[track_caller]
    #[must_use]
    pub fn null(kind: Kind) -> Self {
        if !kind.is_nullable() {
            usage_panic(format!("kind {kind} has no null value"));
        }
        Self::Null(kind)
    }

    /// Wraps an error.
    pub fn error(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Error(Arc::new(err))
    }

    /// Builds an error value from a message.
    pub fn error_msg(msg: impl Into<String>) -> Self {
        Self::error(MessageError(msg.into()))
    }

    /// Wraps a value in a fresh pointer.
    pub fn pointer(value: impl Into<Self>) -> Self {
        Self::Pointer(Pointer::new(value.into()))
    }

    /// Wraps a callable; see [`IntoFunc`] for the accepted shapes.
    pub fn func<M>(f: impl IntoFunc<M>) -> Self {
        Self::Func(Func::new(f))
    }

    /// Builds a slice from anything convertible.
    pub fn slice<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::Slice(items.into_iter().map(Into::into).collect())
    }

    /// Builds a map from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Converts any serializable domain object. Structs become maps, and
    /// sequences become slices.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn from_serialize<S: Serialize + ?Sized>(value: &S) -> Result<Self> {
        Ok(Self::from_json(serde_json::to_value(value)?))
    }

    /// Converts a JSON document.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Nil,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Uint(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Self::Str(s),
            Json::Array(items) => Self::Slice(items.into_iter().map(Self::from_json).collect()),
            Json::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts back to JSON. Errors become their message; pointers are
    /// dereferenced.
    ///
    /// # Errors
    /// Returns an error for channels, functions and non-finite floats.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        use serde_json::Value as Json;
        Ok(match self {
            Self::Nil | Self::Null(_) => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Uint(u) => Json::from(*u),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .ok_or_else(|| JustestError::extract(format!("{f} has no JSON form")))?,
            Self::Str(s) => Json::String(s.clone()),
            Self::Bytes(b) => Json::from(b.clone()),
            Self::Array(items) | Self::Slice(items) => {
                Json::Array(items.iter().map(Self::to_json).collect::<Result<_>>()?)
            }
            Self::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), v.to_json()?)))
                    .collect::<Result<_>>()?,
            ),
            Self::Error(e) => Json::String(e.to_string()),
            Self::Pointer(p) => p.load().to_json()?,
            Self::Chan(_) | Self::Func(_) => {
                return Err(JustestError::extract(format!("{self:?}")));
            }
        })
    }

    /// Returns the runtime kind. Typed nulls report their declared kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Nil => Kind::Invalid,
            Self::Null(kind) => *kind,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Uint(_) => Kind::Uint,
            Self::Float(_) => Kind::Float,
            Self::Str(_) => Kind::String,
            Self::Bytes(_) => Kind::Bytes,
            Self::Array(_) => Kind::Array,
            Self::Slice(_) => Kind::Slice,
            Self::Map(_) => Kind::Map,
            Self::Error(_) => Kind::Error,
            Self::Pointer(_) => Kind::Pointer,
            Self::Chan(_) => Kind::Chan,
            Self::Func(_) => Kind::Func,
        }
    }

    /// Returns true for untyped nil and typed nulls.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil | Self::Null(_))
    }

    /// Returns true for a non-null error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Length of text, bytes, collections and buffered channel content.
    /// Typed nulls have length zero.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Null(kind) if matches!(kind, Kind::Map | Kind::Slice | Kind::Bytes | Kind::Chan) => {
                Some(0)
            }
            Self::Str(s) => Some(s.len()),
            Self::Bytes(b) => Some(b.len()),
            Self::Array(items) | Self::Slice(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            Self::Chan(ch) => Some(ch.len()),
            _ => None,
        }
    }

    /// Signed view of an integer value.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Uint(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Floating point view of any numeric value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Uint(u) => Some(*u as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text view of strings and UTF-8 bytes.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            _ => None,
        }
    }

    /// Message of an error value.
    #[must_use]
    pub fn as_error(&self) -> Option<&(dyn StdError + Send + Sync)> {
        match self {
            Self::Error(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Null(a), Self::Null(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Uint(a), Self::Uint(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Array(a), Self::Array(b)) | (Self::Slice(a), Self::Slice(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a.to_string() == b.to_string(),
            (Self::Pointer(a), Self::Pointer(b)) => a.ptr_eq(b) || a.load() == b.load(),
            (Self::Chan(a), Self::Chan(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Null(kind) => write!(f, "{kind}(nil)"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Self::Array(items) | Self::Slice(items) => f.debug_list().entries(items).finish(),
            Self::Map(entries) => f.debug_map().entries(entries).finish(),
            Self::Error(e) => write!(f, "error({:?})", e.to_string()),
            Self::Pointer(p) => write!(f, "&{:?}", p.load()),
            Self::Chan(ch) => write!(f, "chan(len={})", ch.len()),
            Self::Func(_) => f.write_str("func"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Error(e) => write!(f, "{e}"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Nil
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(n: $ty) -> Self {
                Self::Int(n as i64)
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(n: $ty) -> Self {
                Self::Uint(n as u64)
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Self::Float(f64::from(x))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Slice(items)
    }
}

impl<const N: usize> From<[Value; N]> for Value {
    fn from(items: [Value; N]) -> Self {
        Self::Array(items.into())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self::Map(entries)
    }
}

impl From<Pointer> for Value {
    fn from(p: Pointer) -> Self {
        Self::Pointer(p)
    }
}

impl From<Channel> for Value {
    fn from(ch: Channel) -> Self {
        Self::Chan(ch)
    }
}

impl From<Func> for Value {
    fn from(f: Func) -> Self {
        Self::Func(f)
    }
}

impl From<&Buffer> for Value {
    fn from(b: &Buffer) -> Self {
        Self::Pointer(b.pointer())
    }
}

impl From<std::io::Error> for Value {
    fn from(e: std::io::Error) -> Self {
        Self::error(e)
    }
}

impl From<JustestError> for Value {
    fn from(e: JustestError) -> Self {
        Self::error(e)
    }
}

impl<V: Into<Self>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map_or(Self::Nil, Into::into)
    }
}
