//! Descriptor-driven codec for Telegram's TL binary serialization.
//!
//! Every constructor and function of the bundled schema (`tl/*.tl`) is
//! compiled at build time into a static [`TypeDescriptor`]. A single engine
//! encodes and decodes any of them, and a [`Registry`] maps constructor ids
//! back to descriptors so fields typed as "any object" can be decoded.
//!
//! # Overview
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`types`]       | Constructor descriptors                                   |
//! | [`functions`]   | RPC function descriptors                                  |
//! | [`serialize`]   | [`Serializable`] and primitive encoders                   |
//! | [`deserialize`] | [`Deserializable`], [`Cursor`], decode errors and limits  |
//! | [`object`]      | [`Object`] and its validating builder                     |
//! | [`registry`]    | id → descriptor table, `generic_read` / `generic_write`   |
//!
//! # Building and encoding
//!
//! ```rust,no_run
//! use tlwire::{Object, Serializable, functions, registry};
//!
//! let ping = Object::builder(&functions::PING)
//!     .set("ping_id", 42i64)
//!     .build()
//!     .unwrap();
//!
//! let bytes = ping.to_bytes();
//! // Send `bytes` over an MTProto connection…
//! # let _ = registry::global();
//! ```
//!
//! # Decoding
//!
//! ```rust,no_run
//! use tlwire::registry;
//!
//! # let bytes: &[u8] = &[];
//! let value = registry::global().decode(bytes)?;
//! if let Some(obj) = value.as_object() {
//!     println!("got {}", obj.name());
//! }
//! # Ok::<(), tlwire::deserialize::Error>(())
//! ```
//!
//! # Updating to a new layer
//!
//! 1. Edit the schema files in `tl/` and bump their `// LAYER N` header.
//! 2. Rebuild; the build script regenerates every descriptor.

#![deny(unsafe_code)]

pub mod codec;
pub mod descriptor;
pub mod deserialize;
pub mod flags;
pub mod object;
pub mod registry;
pub mod serialize;
pub mod value;
mod generated;

pub use descriptor::{Codec, Field, Kind, TypeDescriptor};
pub use deserialize::{Cursor, Deserializable, Limits};
pub use flags::FlagsWord;
pub use generated::{LAYER, SCHEMA, functions, types};
#[cfg(feature = "name-for-id")]
pub use generated::name_for_id;
pub use object::{BuildError, Builder, Object};
pub use registry::{Registry, generic_read, generic_write};
pub use serialize::Serializable;
pub use value::Value;

/// `boolTrue#997275b5`
pub const BOOL_TRUE_ID: u32 = 0x997275b5;
/// `boolFalse#bc799737`
pub const BOOL_FALSE_ID: u32 = 0xbc799737;
/// Constructor id leading every boxed `Vector<T>`.
pub const VECTOR_ID: u32 = 0x1cb5c415;

/// Bare vector — `vector` (lowercase) as opposed to the boxed `Vector`.
///
/// Used in rare cases where Telegram sends a length-prefixed list without
/// the usual `0x1cb5c415` constructor ID header.
#[derive(Clone, Debug, PartialEq)]
pub struct RawVec<T>(pub Vec<T>);

/// Longest byte string that takes the one-byte length prefix.
pub(crate) const SHORT_LEN_MAX: usize = 253;
/// First byte of the four-byte length prefix.
pub(crate) const LONG_LEN_MARKER: u8 = 0xfe;
/// Length prefix byte that no encoder writes.
pub(crate) const RESERVED_LEN_MARKER: u8 = 0xff;

/// Zero bytes needed after `len` bytes to reach a multiple of four.
pub(crate) const fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Prefix and padding sizes framing a `len`-byte TL string.
///
/// Both the encoder and the decoder size strings through this, so a
/// decoded string always re-encodes to the bytes it came from.
pub(crate) const fn bytes_framing(len: usize) -> (usize, usize) {
    let header = if len <= SHORT_LEN_MAX { 1 } else { 4 };
    (header, padding_for(header + len))
}
