//! Descriptor-backed objects and their validating builder.

use thiserror::Error;

use crate::codec;
use crate::descriptor::{Codec, Field, TypeDescriptor};
use crate::serialize::{MAX_BYTES_LEN, Serializable};
use crate::value::Value;

/// Reasons [`Builder::build`] refuses to produce an [`Object`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The descriptor has no field with this name.
    #[error("`{ty}` has no field named `{field}`")]
    UnknownField {
        /// Constructor name.
        ty: &'static str,
        /// The name that was passed in.
        field: String,
    },
    /// A required field was never set.
    #[error("`{ty}.{field}` is required but was not set")]
    MissingField {
        /// Constructor name.
        ty: &'static str,
        /// Field name.
        field: &'static str,
    },
    /// The value doesn't fit the field's codec.
    #[error("`{ty}.{field}` expects {expected}, got {found}")]
    TypeMismatch {
        /// Constructor name.
        ty: &'static str,
        /// Field name.
        field: &'static str,
        /// The codec, as written in the schema.
        expected: String,
        /// The value variant that was given.
        found: &'static str,
    },
    /// Fields guarded by the same bit were not all set or all unset.
    #[error("`{ty}`: fields sharing flag bit {bit} must be set together")]
    InconsistentFlags {
        /// Constructor name.
        ty: &'static str,
        /// The shared bit.
        bit: u8,
    },
    /// A byte string too long for the wire.
    #[error("`{ty}.{field}`: {len} bytes exceed the wire limit of {MAX_BYTES_LEN}")]
    PayloadTooLarge {
        /// Constructor name.
        ty: &'static str,
        /// Field name.
        field: &'static str,
        /// Offending length.
        len: usize,
    },
    /// A bare field holds an object built from a different constructor.
    #[error("`{ty}.{field}` expects a bare {expected:#010x}, got `{found}`")]
    BareMismatch {
        /// Constructor name.
        ty: &'static str,
        /// Field name.
        field: &'static str,
        /// Required constructor id.
        expected: u32,
        /// Constructor name of the given object.
        found: &'static str,
    },
}

/// An instance of a TL constructor (or a function call), described by a
/// static [`TypeDescriptor`].
///
/// Objects are immutable. They are built with [`Object::builder`] or
/// produced by decoding, so every object can be encoded without further
/// checks.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    descriptor: &'static TypeDescriptor,
    values: Vec<Option<Value>>,
}

impl Object {
    /// Start building an object of the given type.
    pub fn builder(descriptor: &'static TypeDescriptor) -> Builder {
        Builder {
            descriptor,
            values: vec![None; descriptor.fields.len()],
            error: None,
        }
    }

    /// Start a builder pre-filled with this object's fields.
    pub fn into_builder(self) -> Builder {
        Builder { descriptor: self.descriptor, values: self.values, error: None }
    }

    pub(crate) fn from_decoded(descriptor: &'static TypeDescriptor, values: Vec<Option<Value>>) -> Self {
        Self { descriptor, values }
    }

    /// The descriptor this object was built from.
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// Constructor id.
    pub fn id(&self) -> u32 {
        self.descriptor.id
    }

    /// Full TL name of the constructor.
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// The value of field `name`, `None` when absent or unknown.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.descriptor.field_index(name)?;
        self.values[index].as_ref()
    }

    /// Whether field `name` is present. For `true` flags, whether it's set.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every declared field with its value, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static Field, Option<&Value>)> + '_ {
        self.descriptor.fields.iter().zip(self.values.iter().map(Option::as_ref))
    }

    /// Write the fields without the leading constructor id, as a bare value.
    pub fn serialize_bare(&self, buf: &mut impl Extend<u8>) {
        codec::write_fields(self.descriptor, &self.values, buf);
    }
}

impl Serializable for Object {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.id().serialize(buf);
        self.serialize_bare(buf);
    }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Collects field values for an [`Object`]; validation happens in
/// [`Builder::build`].
#[derive(Clone, Debug)]
pub struct Builder {
    descriptor: &'static TypeDescriptor,
    values: Vec<Option<Value>>,
    error: Option<BuildError>,
}

impl Builder {
    /// Set field `name`.
    ///
    /// For `true` presence flags, `false` leaves the flag unset.
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Some(index) = self.slot(name) {
            let value = value.into();
            let unset = self.descriptor.fields[index].codec == Codec::True && value == Value::Bool(false);
            self.values[index] = if unset { None } else { Some(value) };
        }
        self
    }

    /// Set field `name` if `value` is `Some`, clear it otherwise.
    pub fn set_opt<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(name, v),
            None => self.unset(name),
        }
    }

    /// Clear field `name`.
    pub fn unset(mut self, name: &str) -> Self {
        if let Some(index) = self.slot(name) {
            self.values[index] = None;
        }
        self
    }

    fn slot(&mut self, name: &str) -> Option<usize> {
        let index = self.descriptor.field_index(name);
        if index.is_none() && self.error.is_none() {
            self.error = Some(BuildError::UnknownField {
                ty: self.descriptor.name,
                field: name.to_owned(),
            });
        }
        index
    }

    /// Validate and produce the object.
    pub fn build(self) -> Result<Object, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let ty = self.descriptor.name;
        for (field, value) in self.descriptor.fields.iter().zip(&self.values) {
            match value {
                None if !field.is_optional() => {
                    return Err(BuildError::MissingField { ty, field: field.name });
                }
                None => {}
                Some(value) => check(&field.codec, value).map_err(|p| p.into_error(ty, field))?,
            }
        }
        check_shared_bits(self.descriptor, &self.values)?;

        Ok(Object { descriptor: self.descriptor, values: self.values })
    }
}

fn check_shared_bits(descriptor: &'static TypeDescriptor, values: &[Option<Value>]) -> Result<(), BuildError> {
    let mut declared = 0u32;
    let mut present = 0u32;
    let mut absent = 0u32;
    for (field, value) in descriptor.fields.iter().zip(values) {
        declared |= field.mask();
        if value.is_some() {
            present |= field.mask();
        } else {
            absent |= field.mask();
        }
    }

    let mixed = present & absent & declared;
    if mixed != 0 {
        return Err(BuildError::InconsistentFlags {
            ty: descriptor.name,
            bit: mixed.trailing_zeros() as u8,
        });
    }
    Ok(())
}

enum Problem {
    Type { expected: Codec, found: &'static str },
    TooLarge(usize),
    Bare { expected: u32, found: &'static str },
}

impl Problem {
    fn into_error(self, ty: &'static str, field: &Field) -> BuildError {
        let field = field.name;
        match self {
            Self::Type { expected, found } => BuildError::TypeMismatch { ty, field, expected: expected.to_string(), found },
            Self::TooLarge(len) => BuildError::PayloadTooLarge { ty, field, len },
            Self::Bare { expected, found } => BuildError::BareMismatch { ty, field, expected, found },
        }
    }
}

fn check(codec: &Codec, value: &Value) -> Result<(), Problem> {
    let fits_prefix = |len: usize| if len > MAX_BYTES_LEN { Err(Problem::TooLarge(len)) } else { Ok(()) };

    match (codec, value) {
        (Codec::Int, Value::Int(_))
        | (Codec::Long, Value::Long(_))
        | (Codec::Int128, Value::Int128(_))
        | (Codec::Int256, Value::Int256(_))
        | (Codec::Double, Value::Double(_))
        | (Codec::Bool, Value::Bool(_))
        | (Codec::True, Value::Bool(true))
        | (Codec::Object, Value::Object(_) | Value::Bool(_)) => Ok(()),
        (Codec::Bytes, Value::Bytes(b)) => fits_prefix(b.len()),
        (Codec::String, Value::String(s)) => fits_prefix(s.len()),
        (Codec::Bare(id), Value::Object(obj)) if obj.id() == *id => Ok(()),
        (Codec::Bare(id), Value::Object(obj)) => Err(Problem::Bare { expected: *id, found: obj.name() }),
        (Codec::Vector(elem) | Codec::BareVector(elem), Value::Vector(items)) => {
            items.iter().try_for_each(|item| check(elem, item))
        }
        (expected, found) => Err(Problem::Type { expected: *expected, found: found.kind_name() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Kind;

    static PAIR: TypeDescriptor = TypeDescriptor {
        id: 0x10,
        name: "pair",
        ty: "Pair",
        kind: Kind::Constructor,
        flags: true,
        fields: &[
            Field::optional("silent", 0, Codec::True),
            Field::required("a", Codec::Int),
            Field::optional("b", 2, Codec::String),
            Field::optional("c", 2, Codec::Bool),
        ],
    };

    #[test]
    fn true_false_means_unset() {
        let obj = Object::builder(&PAIR).set("a", 1).set("silent", false).build().unwrap();
        assert!(!obj.is_set("silent"));
        let obj = obj.into_builder().set("silent", true).build().unwrap();
        assert_eq!(obj.get("silent"), Some(&Value::Bool(true)));
    }

    #[test]
    fn first_unknown_field_is_reported() {
        let err = Object::builder(&PAIR).set("x", 1).set("y", 2).build().unwrap_err();
        assert_eq!(err, BuildError::UnknownField { ty: "pair", field: "x".into() });
    }

    #[test]
    fn shared_bit_must_be_consistent() {
        let err = Object::builder(&PAIR).set("a", 1).set("b", "x").build().unwrap_err();
        assert_eq!(err, BuildError::InconsistentFlags { ty: "pair", bit: 2 });

        let ok = Object::builder(&PAIR).set("a", 1).set("b", "x").set("c", false).build();
        assert!(ok.is_ok());
    }

    #[test]
    fn mismatch_names_the_codec() {
        let err = Object::builder(&PAIR).set("a", 1i64).build().unwrap_err();
        assert_eq!(
            err,
            BuildError::TypeMismatch { ty: "pair", field: "a", expected: "int".into(), found: "long" }
        );
    }
}
