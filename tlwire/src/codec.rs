//! The descriptor-driven engine: one reader and one writer for every type.

use crate::deserialize::{Buffer, Deserializable, Error, Result};
use crate::descriptor::{Codec, TypeDescriptor};
use crate::flags::FlagsWord;
use crate::object::Object;
use crate::registry::Registry;
use crate::serialize::Serializable;
use crate::value::Value;
use crate::VECTOR_ID;

// ─── Encode ──────────────────────────────────────────────────────────────────

/// Write `values` (one slot per field of `descriptor`), without the id.
pub(crate) fn write_fields(descriptor: &TypeDescriptor, values: &[Option<Value>], buf: &mut impl Extend<u8>) {
    if descriptor.has_flags() {
        FlagsWord::for_values(descriptor, values).bits().serialize(buf);
    }
    for (field, value) in descriptor.fields.iter().zip(values) {
        if let Some(value) = value {
            write_value(&field.codec, value, buf);
        }
    }
}

/// Write a single value the way `codec` lays it out.
///
/// The value decides the primitive; the codec only picks boxed or bare
/// representations and skips `true` flags.
pub fn write_value(codec: &Codec, value: &Value, buf: &mut impl Extend<u8>) {
    match value {
        Value::Int(v) => v.serialize(buf),
        Value::Long(v) => v.serialize(buf),
        Value::Int128(v) => v.serialize(buf),
        Value::Int256(v) => v.serialize(buf),
        Value::Double(v) => v.serialize(buf),
        Value::Bool(_) if *codec == Codec::True => {}
        Value::Bool(v) => v.serialize(buf),
        Value::Bytes(v) => v.as_slice().serialize(buf),
        Value::String(v) => v.as_bytes().serialize(buf),
        Value::Vector(items) => match codec {
            Codec::BareVector(elem) => encode_bare_vector(items, elem, buf),
            Codec::Vector(elem) => encode_vector(items, elem, buf),
            _ => encode_vector(items, &Codec::Object, buf),
        },
        Value::Object(obj) => match codec {
            Codec::Bare(_) => obj.serialize_bare(buf),
            _ => obj.serialize(buf),
        },
    }
}

/// Boxed vector: marker, count, then every element.
pub fn encode_vector(items: &[Value], elem: &Codec, buf: &mut impl Extend<u8>) {
    VECTOR_ID.serialize(buf);
    encode_bare_vector(items, elem, buf);
}

/// Bare vector: count, then every element.
pub fn encode_bare_vector(items: &[Value], elem: &Codec, buf: &mut impl Extend<u8>) {
    (items.len() as i32).serialize(buf);
    for item in items {
        write_value(elem, item, buf);
    }
}

// ─── Decode ──────────────────────────────────────────────────────────────────

/// Read the fields of `descriptor` (the id has already been consumed).
pub(crate) fn read_fields(descriptor: &'static TypeDescriptor, buf: Buffer, registry: &Registry) -> Result<Object> {
    buf.enter()?;
    let result = read_fields_inner(descriptor, buf, registry);
    buf.leave();
    result
}

fn read_fields_inner(descriptor: &'static TypeDescriptor, buf: Buffer, registry: &Registry) -> Result<Object> {
    let flags = if descriptor.has_flags() {
        FlagsWord::from_bits(u32::deserialize(buf)?)
    } else {
        FlagsWord::EMPTY
    };

    let unknown = flags.unknown(descriptor);
    if unknown != 0 {
        log::trace!("ignoring undeclared flag bits {unknown:#010x} on {}", descriptor.name);
    }

    let mut values = Vec::with_capacity(descriptor.fields.len());
    for field in descriptor.fields {
        let present = field.flag.is_none_or(|bit| flags.contains(bit));
        let value = match field.codec {
            _ if !present => None,
            Codec::True => Some(Value::Bool(true)),
            ref codec => Some(read_value(codec, buf, registry)?),
        };
        values.push(value);
    }

    Ok(Object::from_decoded(descriptor, values))
}

/// Read a single value laid out as `codec`.
pub fn read_value(codec: &Codec, buf: Buffer, registry: &Registry) -> Result<Value> {
    Ok(match codec {
        Codec::Int => Value::Int(i32::deserialize(buf)?),
        Codec::Long => Value::Long(i64::deserialize(buf)?),
        Codec::Int128 => Value::Int128(<[u8; 16]>::deserialize(buf)?),
        Codec::Int256 => Value::Int256(<[u8; 32]>::deserialize(buf)?),
        Codec::Double => Value::Double(f64::deserialize(buf)?),
        Codec::Bool => Value::Bool(bool::deserialize(buf)?),
        Codec::Bytes => Value::Bytes(Vec::<u8>::deserialize(buf)?),
        Codec::String => Value::String(String::deserialize(buf)?),
        Codec::True => Value::Bool(true),
        Codec::Object => registry.read(buf)?,
        Codec::Bare(id) => Value::Object(Box::new(read_fields(registry.resolve(*id)?, buf, registry)?)),
        Codec::Vector(elem) => Value::Vector(decode_vector(buf, elem, registry)?),
        Codec::BareVector(elem) => Value::Vector(decode_bare_vector(buf, elem, registry)?),
    })
}

/// Boxed vector: validate the marker, then read a bare vector.
pub fn decode_vector(buf: Buffer, elem: &Codec, registry: &Registry) -> Result<Vec<Value>> {
    let found = u32::deserialize(buf)?;
    if found != VECTOR_ID {
        return Err(Error::UnexpectedMarker { expected: VECTOR_ID, found });
    }
    decode_bare_vector(buf, elem, registry)
}

/// Bare vector: count, then exactly that many elements.
pub fn decode_bare_vector(buf: Buffer, elem: &Codec, registry: &Registry) -> Result<Vec<Value>> {
    let count = buf.read_count(element_size(elem, registry)?)?;
    let mut items = Vec::with_capacity(buf.capacity_for(count));
    for _ in 0..count {
        items.push(read_value(elem, buf, registry)?);
    }
    Ok(items)
}

/// Fewest bytes one element can take; bare constructors are looked up.
fn element_size(elem: &Codec, registry: &Registry) -> Result<usize> {
    match elem {
        Codec::Bare(id) => Ok(registry.resolve(*id)?.min_wire_size()),
        other => Ok(other.min_wire_size()),
    }
}
