//! Constructor id → descriptor table and polymorphic dispatch.
//!
//! A [`Registry`] is filled once while the schema loads and only read
//! afterwards. [`global()`] holds the process-wide instance seeded from the
//! bundled [`SCHEMA`](crate::SCHEMA).

use std::collections::HashMap;
use std::sync::OnceLock;

use thiserror::Error;

use crate::codec;
use crate::deserialize::{Buffer, Cursor, Deserializable, Error, Limits, Result};
use crate::descriptor::TypeDescriptor;
use crate::object::Object;
use crate::serialize::Serializable;
use crate::value::Value;
use crate::{BOOL_FALSE_ID, BOOL_TRUE_ID, VECTOR_ID};

/// Ids the codec handles natively; they can never be registered.
const RESERVED: [(u32, &str); 3] = [
    (BOOL_TRUE_ID, "boolTrue"),
    (BOOL_FALSE_ID, "boolFalse"),
    (VECTOR_ID, "vector"),
];

/// Two different descriptors claimed the same constructor id.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("constructor id {id:#010x} is already bound to `{existing}`, cannot bind `{new}`")]
pub struct ConflictError {
    /// The contested id.
    pub id: u32,
    /// Name already holding the id.
    pub existing: &'static str,
    /// Name that tried to take it.
    pub new: &'static str,
}

/// Maps constructor ids to the descriptors that decode them.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    by_id: HashMap<u32, &'static TypeDescriptor>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every descriptor of the bundled schema.
    pub fn with_schema() -> std::result::Result<Self, ConflictError> {
        let mut registry = Self::new();
        registry.extend(crate::SCHEMA.iter().copied())?;
        Ok(registry)
    }

    /// Bind `descriptor.id` to `descriptor`.
    ///
    /// Registering the same descriptor twice is a no-op; binding an id that
    /// is reserved or already held by a different descriptor fails.
    pub fn register(&mut self, descriptor: &'static TypeDescriptor) -> std::result::Result<(), ConflictError> {
        let id = descriptor.id;
        if let Some(&(_, existing)) = RESERVED.iter().find(|(reserved, _)| *reserved == id) {
            let err = ConflictError { id, existing, new: descriptor.name };
            log::warn!("{err}");
            return Err(err);
        }

        match self.by_id.get(&id) {
            Some(existing) if *existing == descriptor => Ok(()),
            Some(existing) => {
                let err = ConflictError { id, existing: existing.name, new: descriptor.name };
                log::warn!("{err}");
                Err(err)
            }
            None => {
                self.by_id.insert(id, descriptor);
                Ok(())
            }
        }
    }

    /// Register several descriptors, stopping at the first conflict.
    pub fn extend<I>(&mut self, descriptors: I) -> std::result::Result<(), ConflictError>
    where
        I: IntoIterator<Item = &'static TypeDescriptor>,
    {
        descriptors.into_iter().try_for_each(|d| self.register(d))
    }

    /// The descriptor bound to `id`.
    pub fn resolve(&self, id: u32) -> Result<&'static TypeDescriptor> {
        self.get(id).ok_or(Error::UnknownConstructor { id })
    }

    /// The descriptor bound to `id`, if any.
    pub fn get(&self, id: u32) -> Option<&'static TypeDescriptor> {
        self.by_id.get(&id).copied()
    }

    /// Whether `id` has a descriptor. Builtins are never registered.
    pub fn contains(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    /// TL name for `id`, builtins included. For diagnostics.
    pub fn name_for_id(&self, id: u32) -> Option<&'static str> {
        RESERVED
            .iter()
            .find(|(reserved, _)| *reserved == id)
            .map(|&(_, name)| name)
            .or_else(|| self.get(id).map(|d| d.name))
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Every registered descriptor, in no particular order.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static TypeDescriptor> + '_ {
        self.by_id.values().copied()
    }

    /// Read one boxed value: the id, then whatever it announces.
    ///
    /// Nothing past the id is consumed when the id is unknown.
    pub fn read(&self, buf: Buffer) -> Result<Value> {
        match u32::deserialize(buf)? {
            BOOL_TRUE_ID => Ok(Value::Bool(true)),
            BOOL_FALSE_ID => Ok(Value::Bool(false)),
            id => {
                let descriptor = self.resolve(id)?;
                codec::read_fields(descriptor, buf, self).map(|obj| Value::Object(Box::new(obj)))
            }
        }
    }

    /// Like [`Registry::read`], but only objects are accepted.
    pub fn read_object(&self, buf: Buffer) -> Result<Object> {
        let id = u32::deserialize(buf)?;
        codec::read_fields(self.resolve(id)?, buf, self)
    }

    /// Decode exactly one boxed value from `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        self.decode_with_limits(bytes, Limits::default())
    }

    /// [`Registry::decode`] with custom bounds.
    pub fn decode_with_limits(&self, bytes: &[u8], limits: Limits) -> Result<Value> {
        let mut cursor = Cursor::with_limits(bytes, limits);
        let value = self.read(&mut cursor)?;
        cursor.finish()?;
        Ok(value)
    }
}

// ─── Process-wide registry ───────────────────────────────────────────────────

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry.
///
/// Built from the bundled schema on first use unless [`install`] ran first.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(|| {
        let mut registry = Registry::new();
        for &descriptor in crate::SCHEMA {
            // Conflicts were already logged; the first binding wins.
            let _ = registry.register(descriptor);
        }
        log::debug!("loaded {} TL descriptors for layer {}", registry.len(), crate::LAYER);
        registry
    })
}

/// Put `registry` in place as the process-wide instance.
///
/// Only possible before the first call to [`global()`]; otherwise the
/// registry is handed back.
pub fn install(registry: Registry) -> std::result::Result<(), Registry> {
    log::debug!("installing a registry with {} descriptors", registry.len());
    GLOBAL.set(registry)
}

/// Read one boxed value through the process-wide registry.
pub fn generic_read(buf: Buffer) -> Result<Value> {
    global().read(buf)
}

/// Write `object` boxed: its constructor id, then its fields.
pub fn generic_write(object: &Object, buf: &mut impl Extend<u8>) {
    object.serialize(buf);
}

impl Deserializable for Object {
    const MIN_WIRE_SIZE: usize = 4;

    fn deserialize(buf: Buffer) -> Result<Self> {
        global().read_object(buf)
    }
}

impl Deserializable for Value {
    const MIN_WIRE_SIZE: usize = 4;

    fn deserialize(buf: Buffer) -> Result<Self> {
        global().read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Codec, Field, Kind};

    static A: TypeDescriptor = TypeDescriptor {
        id: 0xabc,
        name: "a",
        ty: "A",
        kind: Kind::Constructor,
        flags: false,
        fields: &[Field::required("x", Codec::Int)],
    };

    #[test]
    fn read_leaves_unknown_payload_alone() {
        let registry = Registry::new();
        let mut cursor = Cursor::from_slice(&[1, 0, 0, 0, 9, 9, 9, 9]);
        assert_eq!(registry.read(&mut cursor), Err(Error::UnknownConstructor { id: 1 }));
        assert_eq!(cursor.pos(), 4);
    }

    #[test]
    fn builtin_names() {
        let mut registry = Registry::new();
        registry.register(&A).unwrap();
        assert_eq!(registry.name_for_id(VECTOR_ID), Some("vector"));
        assert_eq!(registry.name_for_id(0xabc), Some("a"));
        assert_eq!(registry.name_for_id(0xdef), None);
    }
}
