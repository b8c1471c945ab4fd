//! The dynamic [`Value`] every descriptor-driven field holds.

use crate::object::Object;

/// A decoded (or to-be-encoded) TL value.
///
/// `True` presence flags surface as `Bool(true)`; boxed `Bool` fields as
/// `Bool(_)`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `int128`
    Int128([u8; 16]),
    /// `int256`
    Int256([u8; 32]),
    /// `double`
    Double(f64),
    /// `Bool` or `true`
    Bool(bool),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `string`
    String(String),
    /// `Vector<T>` or `vector<T>`
    Vector(Vec<Value>),
    /// Any object, boxed or bare.
    Object(Box<Object>),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Int128(_) => "int128",
            Self::Int256(_) => "int256",
            Self::Double(_) => "double",
            Self::Bool(_) => "Bool",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Vector(_) => "vector",
            Self::Object(_) => "object",
        }
    }

    /// Build a vector from anything convertible into values.
    pub fn vector<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Vector(items.into_iter().map(Into::into).collect())
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self { Self::Int(v) => Some(v), _ => None }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self { Self::Long(v) => Some(v), _ => None }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self { Self::Double(v) => Some(v), _ => None }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self { Self::Bool(v) => Some(v), _ => None }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self { Self::Bytes(v) => Some(v), _ => None }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self { Self::String(v) => Some(v), _ => None }
    }

    pub fn as_vector(&self) -> Option<&[Value]> {
        match self { Self::Vector(v) => Some(v), _ => None }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self { Self::Object(v) => Some(v), _ => None }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self { Self::Int(v) }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self { Self::Long(v) }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self { Self::Double(v) }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self { Self::Int128(v) }
}

impl From<[u8; 32]> for Value {
    fn from(v: [u8; 32]) -> Self { Self::Int256(v) }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self { Self::Bytes(v) }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self { Self::Bytes(v.to_vec()) }
}

impl From<String> for Value {
    fn from(v: String) -> Self { Self::String(v) }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self { Self::String(v.to_owned()) }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self { Self::Vector(v) }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self { Self::Object(Box::new(v)) }
}
