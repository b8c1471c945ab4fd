//! Static per-type codec tables.
//!
//! Every constructor and function in the bundled schema is described by one
//! `static` [`TypeDescriptor`], emitted by `tlwire-gen` at build time. The
//! engine in [`crate::codec`] reads and writes any object from its descriptor
//! alone.

use std::fmt;

/// How a single field travels on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Codec {
    /// `int`: 4 bytes LE.
    Int,
    /// `long`: 8 bytes LE.
    Long,
    /// `int128`: 16 opaque bytes.
    Int128,
    /// `int256`: 32 opaque bytes.
    Int256,
    /// `double`: 8 bytes IEEE-754 LE.
    Double,
    /// `Bool`: `boolTrue` or `boolFalse`.
    Bool,
    /// `bytes`: length-prefixed, padded.
    Bytes,
    /// `string`: like `bytes`, UTF-8.
    String,
    /// `true`: presence flag, nothing on the wire.
    True,
    /// Any boxed object, read through the registry.
    Object,
    /// A specific constructor written without its id.
    Bare(u32),
    /// Boxed `Vector<T>`.
    Vector(&'static Codec),
    /// Bare `vector<T>`, without the marker.
    BareVector(&'static Codec),
}

impl Codec {
    /// The fewest bytes a value of this codec occupies.
    ///
    /// Bare objects report `0` since their size depends on a descriptor
    /// looked up at runtime.
    pub const fn min_wire_size(&self) -> usize {
        match self {
            Self::Int | Self::Bool | Self::Object => 4,
            Self::Long | Self::Double => 8,
            Self::Int128 => 16,
            Self::Int256 => 32,
            Self::Bytes | Self::String => 4,
            Self::True | Self::Bare(_) => 0,
            Self::Vector(_) => 8,
            Self::BareVector(_) => 4,
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Int128 => f.write_str("int128"),
            Self::Int256 => f.write_str("int256"),
            Self::Double => f.write_str("double"),
            Self::Bool => f.write_str("Bool"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::True => f.write_str("true"),
            Self::Object => f.write_str("Object"),
            Self::Bare(id) => write!(f, "%{id:#010x}"),
            Self::Vector(elem) => write!(f, "Vector<{elem}>"),
            Self::BareVector(elem) => write!(f, "vector<{elem}>"),
        }
    }
}

/// One declared parameter of a constructor or function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    /// Parameter name as written in the schema.
    pub name: &'static str,
    /// Flag bit guarding this field, `None` for required fields.
    pub flag: Option<u8>,
    /// Wire representation.
    pub codec: Codec,
}

impl Field {
    /// A field that is always present.
    pub const fn required(name: &'static str, codec: Codec) -> Self {
        Self { name, flag: None, codec }
    }

    /// A field present only when bit `bit` of the flags word is set.
    pub const fn optional(name: &'static str, bit: u8, codec: Codec) -> Self {
        assert!(bit < 32, "flag bit out of range");
        Self { name, flag: Some(bit), codec }
    }

    /// Whether a flag bit guards this field.
    pub const fn is_optional(&self) -> bool {
        self.flag.is_some()
    }

    /// This field's bit in the flags word, `0` when required.
    pub const fn mask(&self) -> u32 {
        match self.flag {
            Some(bit) => 1 << bit,
            None => 0,
        }
    }
}

/// Whether a descriptor builds a value or calls a method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A constructor of a boxed type.
    Constructor,
    /// An RPC function.
    Function,
}

/// Everything the engine needs to encode or decode one concrete type.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// Constructor id.
    pub id: u32,
    /// Full TL name, namespace included (`auth.sentCode`).
    pub name: &'static str,
    /// The boxed type this constructor builds, or the function's result type.
    pub ty: &'static str,
    /// Constructor or function.
    pub kind: Kind,
    /// Whether the definition declares a flags word, used or not.
    pub flags: bool,
    /// Fields in declaration order, without the flags word.
    pub fields: &'static [Field],
}

impl TypeDescriptor {
    /// Whether a flags word precedes the fields on the wire.
    pub fn has_flags(&self) -> bool {
        self.flags
    }

    /// All bits this descriptor declares.
    pub fn declared_flags(&self) -> u32 {
        self.fields.iter().fold(0, |mask, f| mask | f.mask())
    }

    /// Position of the field named `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// The field named `name`.
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The fewest bytes the fields occupy, constructor id excluded.
    pub fn min_wire_size(&self) -> usize {
        let flags = if self.has_flags() { 4 } else { 0 };
        flags
            + self
                .fields
                .iter()
                .filter(|f| !f.is_optional())
                .map(|f| f.codec.min_wire_size())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: TypeDescriptor = TypeDescriptor {
        id: 0x1,
        name: "sample",
        ty: "Sample",
        kind: Kind::Constructor,
        flags: true,
        fields: &[
            Field::required("id", Codec::Long),
            Field::optional("a", 0, Codec::True),
            Field::optional("b", 3, Codec::String),
            Field::required("tags", Codec::Vector(&Codec::Int)),
        ],
    };

    #[test]
    fn flags_summary() {
        assert!(SAMPLE.has_flags());
        assert_eq!(SAMPLE.declared_flags(), 0b1001);
        assert_eq!(SAMPLE.field_index("b"), Some(2));
        assert!(SAMPLE.field("missing").is_none());
    }

    #[test]
    fn min_size_skips_optional_fields() {
        assert_eq!(SAMPLE.min_wire_size(), 4 + 8 + 8);
    }

    #[test]
    fn codec_display() {
        assert_eq!(Codec::Vector(&Codec::Long).to_string(), "Vector<long>");
        assert_eq!(Codec::BareVector(&Codec::Bare(0x5bb8e511)).to_string(), "vector<%0x5bb8e511>");
    }
}
