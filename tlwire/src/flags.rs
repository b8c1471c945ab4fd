//! The flags word that leads every object with optional fields.

use crate::descriptor::TypeDescriptor;
use crate::value::Value;

/// Presence bitmask: bit `i` set ⇔ the field(s) declared `flags.i?` are
/// present.
///
/// Lives for a single encode or decode call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlagsWord(u32);

impl FlagsWord {
    /// No bit set.
    pub const EMPTY: Self = Self(0);

    /// Wrap a raw word read from the wire.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw word.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether `bit` is set.
    pub const fn contains(self, bit: u8) -> bool {
        bit < 32 && self.0 & (1 << bit) != 0
    }

    /// The word for a set of field values, in descriptor order.
    pub fn for_values(descriptor: &TypeDescriptor, values: &[Option<Value>]) -> Self {
        let bits = descriptor
            .fields
            .iter()
            .zip(values)
            .filter(|(_, value)| value.is_some())
            .fold(0, |bits, (field, _)| bits | field.mask());
        Self(bits)
    }

    /// Bits set here that `descriptor` never declares.
    pub fn unknown(self, descriptor: &TypeDescriptor) -> u32 {
        self.0 & !descriptor.declared_flags()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Codec, Field, Kind};

    static FLAGGED: TypeDescriptor = TypeDescriptor {
        id: 0x20,
        name: "flagged",
        ty: "Flagged",
        kind: Kind::Constructor,
        flags: true,
        fields: &[
            Field::required("id", Codec::Int),
            Field::optional("x", 1, Codec::Int),
            Field::optional("y", 5, Codec::True),
        ],
    };

    #[test]
    fn required_fields_never_set_bits() {
        let values = [Some(Value::Int(1)), None, Some(Value::Bool(true))];
        assert_eq!(FlagsWord::for_values(&FLAGGED, &values).bits(), 1 << 5);
    }

    #[test]
    fn undeclared_bits() {
        let word = FlagsWord::from_bits(0b10_0010 | 1 << 31);
        assert!(word.contains(1) && word.contains(5));
        assert!(!word.contains(40));
        assert_eq!(word.unknown(&FLAGGED), 1 << 31);
    }
}
