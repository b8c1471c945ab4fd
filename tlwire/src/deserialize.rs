//! The [`Deserializable`] trait, [`Cursor`] buffer, and primitive impls.
//!
//! Every read is bounds-checked against the remaining input; lengths and
//! element counts coming off the wire are validated before anything is
//! allocated for them.

use thiserror::Error;

use crate::{
    BOOL_FALSE_ID, BOOL_TRUE_ID, LONG_LEN_MARKER, RESERVED_LEN_MARKER, SHORT_LEN_MAX, VECTOR_ID, bytes_framing,
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a length prefix or element count was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LengthError {
    /// A vector count below zero.
    #[error("negative element count {0}")]
    Negative(i32),
    /// A vector count above [`Limits::max_vector_len`].
    #[error("element count {count} exceeds the limit of {limit}")]
    TooMany {
        /// The count read from the wire.
        count: usize,
        /// The configured bound.
        limit: usize,
    },
    /// A byte string shorter than 254 bytes written with the `0xfe` prefix.
    #[error("length {0} written with the long prefix")]
    NonCanonical(usize),
    /// A byte string starting with the reserved `0xff` prefix.
    #[error("reserved length prefix 0xff")]
    ReservedPrefix,
    /// Bytes left over after a complete message.
    #[error("{0} trailing bytes after the message")]
    Trailing(usize),
}

/// Why a payload's content was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// A `string` that isn't UTF-8.
    #[error("string is not valid UTF-8 (valid up to byte {valid_up_to})")]
    Utf8 {
        /// Length of the longest valid prefix.
        valid_up_to: usize,
    },
    /// Alignment padding that isn't all zeros.
    #[error("non-zero padding byte")]
    NonZeroPadding,
}

/// Errors that can occur during deserialization.
///
/// Every variant aborts the message being decoded; no partially decoded value
/// is ever handed out.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Fewer bytes remain than the next field requires.
    #[error("unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    TruncatedStream {
        /// Bytes the field needed.
        needed: usize,
        /// Bytes that were left.
        remaining: usize,
    },
    /// A constructor ID that the registry (or the expected family) doesn't know.
    ///
    /// Usually means the peer speaks a different layer rather than that the
    /// stream is corrupt; see [`Error::is_schema_mismatch`].
    #[error("unknown constructor id: {id:#010x}")]
    UnknownConstructor {
        /// The ID read from the wire.
        id: u32,
    },
    /// A fixed marker, such as the vector header, had the wrong value.
    #[error("unexpected marker {found:#010x}, expected {expected:#010x}")]
    UnexpectedMarker {
        /// The only acceptable value.
        expected: u32,
        /// What was read instead.
        found: u32,
    },
    /// A length or count was negative, non-canonical or out of bounds.
    #[error("invalid length: {0}")]
    InvalidLength(#[from] LengthError),
    /// A payload's bytes violate its encoding.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(#[from] EncodingError),
    /// Objects nested deeper than [`Limits::max_depth`].
    #[error("objects nested deeper than {limit} levels")]
    NestingTooDeep {
        /// The configured bound.
        limit: usize,
    },
}

impl Error {
    /// `true` when the failure points at schema/layer skew rather than at a
    /// malformed stream.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::UnknownConstructor { .. })
    }
}

/// Specialized `Result` for deserialization.
pub type Result<T> = std::result::Result<T, Error>;

// ─── Limits ──────────────────────────────────────────────────────────────────

/// Bounds applied while decoding untrusted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of objects inside objects.
    pub max_depth: usize,
    /// Maximum element count accepted for a single vector.
    pub max_vector_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_vector_len: 1 << 24,
        }
    }
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// A zero-copy cursor over an in-memory byte slice.
///
/// Avoids `std::io::Cursor` and its wide error surface; reads past the end
/// report exactly how many bytes were missing.
#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
    limits: Limits,
}

impl<'a> Cursor<'a> {
    /// Create a cursor positioned at the start of `buf`, with default [`Limits`].
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self::with_limits(buf, Limits::default())
    }

    /// Create a cursor enforcing custom [`Limits`].
    pub fn with_limits(buf: &'a [u8], limits: Limits) -> Self {
        Self { buf, pos: 0, depth: 0, limits }
    }

    /// Current byte offset.
    pub fn pos(&self) -> usize { self.pos }

    /// Remaining bytes.
    pub fn remaining(&self) -> usize { self.buf.len() - self.pos }

    /// The limits this cursor enforces.
    pub fn limits(&self) -> Limits { self.limits }

    /// Fail with [`Error::TruncatedStream`] unless `needed` bytes remain.
    pub fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(Error::TruncatedStream { needed, remaining });
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_slice(1)?[0])
    }

    /// Borrow the next `len` bytes without copying.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read exactly `out.len()` bytes.
    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        out.copy_from_slice(self.read_slice(out.len())?);
        Ok(())
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    /// Read a length-prefixed, padded TL byte string, borrowing the payload.
    ///
    /// Only the canonical form is accepted: the short prefix for lengths up
    /// to 253, the `0xfe` prefix from 254 on, and all-zero padding.
    pub fn read_tl_bytes(&mut self) -> Result<&'a [u8]> {
        let len = match self.read_byte()? {
            LONG_LEN_MARKER => {
                let [a, b, c] = self.read_array::<3>()?;
                let len = usize::from(a) | usize::from(b) << 8 | usize::from(c) << 16;
                if len <= SHORT_LEN_MAX {
                    return Err(LengthError::NonCanonical(len).into());
                }
                len
            }
            RESERVED_LEN_MARKER => return Err(LengthError::ReservedPrefix.into()),
            short => usize::from(short),
        };

        let (_, padding) = bytes_framing(len);
        self.ensure(len + padding)?;

        let data = self.read_slice(len)?;
        if self.read_slice(padding)?.iter().any(|&b| b != 0) {
            return Err(EncodingError::NonZeroPadding.into());
        }
        Ok(data)
    }

    /// Read a vector element count and check it against the limits and
    /// against the bytes left, given that every element takes at least
    /// `min_element_size` bytes.
    ///
    /// Elements are charged at least one byte each, so a count never
    /// exceeds the bytes left even when an element could be empty.
    /// Runs before anything is allocated for the elements.
    pub fn read_count(&mut self, min_element_size: usize) -> Result<usize> {
        let raw = i32::deserialize(self)?;
        let count = usize::try_from(raw).map_err(|_| LengthError::Negative(raw))?;

        let limit = self.limits.max_vector_len;
        if count > limit {
            return Err(LengthError::TooMany { count, limit }.into());
        }

        let needed = count.checked_mul(min_element_size.max(1)).ok_or(LengthError::TooMany { count, limit })?;
        self.ensure(needed)?;
        Ok(count)
    }

    /// Capacity to reserve for `count` elements: never more than the bytes left.
    pub(crate) fn capacity_for(&self, count: usize) -> usize {
        count.min(self.remaining())
    }

    /// Succeed only if the whole buffer has been consumed.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(LengthError::Trailing(n).into()),
        }
    }

    pub(crate) fn enter(&mut self) -> Result<()> {
        if self.depth >= self.limits.max_depth {
            return Err(Error::NestingTooDeep { limit: self.limits.max_depth });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Alias used throughout the crate: `crate::deserialize::Buffer<'_, '_>`.
pub type Buffer<'a, 'b> = &'a mut Cursor<'b>;

// ─── Deserializable ──────────────────────────────────────────────────────────

/// Deserialize a value from TL binary format.
pub trait Deserializable: Sized {
    /// The fewest bytes any encoding of `Self` occupies. Bounds vector counts
    /// before allocation; `0` when unknown.
    const MIN_WIRE_SIZE: usize = 0;

    /// Read `Self` from `buf`, advancing its position.
    fn deserialize(buf: Buffer) -> Result<Self>;

    /// Convenience: deserialize one complete value from a byte slice.
    ///
    /// Trailing bytes are an error.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::from_slice(bytes);
        let value = Self::deserialize(&mut cursor)?;
        cursor.finish()?;
        Ok(value)
    }
}

// ─── Primitives ───────────────────────────────────────────────────────────────

impl Deserializable for bool {
    const MIN_WIRE_SIZE: usize = 4;

    fn deserialize(buf: Buffer) -> Result<Self> {
        match u32::deserialize(buf)? {
            BOOL_TRUE_ID => Ok(true),
            BOOL_FALSE_ID => Ok(false),
            id => Err(Error::UnknownConstructor { id }),
        }
    }
}

impl Deserializable for i32 {
    const MIN_WIRE_SIZE: usize = 4;

    fn deserialize(buf: Buffer) -> Result<Self> {
        Ok(i32::from_le_bytes(buf.read_array()?))
    }
}

impl Deserializable for u32 {
    const MIN_WIRE_SIZE: usize = 4;

    fn deserialize(buf: Buffer) -> Result<Self> {
        Ok(u32::from_le_bytes(buf.read_array()?))
    }
}

impl Deserializable for i64 {
    const MIN_WIRE_SIZE: usize = 8;

    fn deserialize(buf: Buffer) -> Result<Self> {
        Ok(i64::from_le_bytes(buf.read_array()?))
    }
}

impl Deserializable for f64 {
    const MIN_WIRE_SIZE: usize = 8;

    fn deserialize(buf: Buffer) -> Result<Self> {
        Ok(f64::from_le_bytes(buf.read_array()?))
    }
}

impl Deserializable for [u8; 16] {
    const MIN_WIRE_SIZE: usize = 16;

    fn deserialize(buf: Buffer) -> Result<Self> {
        buf.read_array()
    }
}

impl Deserializable for [u8; 32] {
    const MIN_WIRE_SIZE: usize = 32;

    fn deserialize(buf: Buffer) -> Result<Self> {
        buf.read_array()
    }
}

// ─── Bytes / String ───────────────────────────────────────────────────────────

impl Deserializable for Vec<u8> {
    const MIN_WIRE_SIZE: usize = 4;

    fn deserialize(buf: Buffer) -> Result<Self> {
        Ok(buf.read_tl_bytes()?.to_vec())
    }
}

impl Deserializable for String {
    const MIN_WIRE_SIZE: usize = 4;

    fn deserialize(buf: Buffer) -> Result<Self> {
        let bytes = buf.read_tl_bytes()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| EncodingError::Utf8 { valid_up_to: e.valid_up_to() }.into())
    }
}

// ─── Vectors ─────────────────────────────────────────────────────────────────

fn read_elements<T: Deserializable>(buf: Buffer) -> Result<Vec<T>> {
    let count = buf.read_count(T::MIN_WIRE_SIZE)?;
    let mut out = Vec::with_capacity(buf.capacity_for(count));
    for _ in 0..count {
        out.push(T::deserialize(buf)?);
    }
    Ok(out)
}

impl<T: Deserializable> Deserializable for Vec<T> {
    const MIN_WIRE_SIZE: usize = 8;

    fn deserialize(buf: Buffer) -> Result<Self> {
        let found = u32::deserialize(buf)?;
        if found != VECTOR_ID {
            return Err(Error::UnexpectedMarker { expected: VECTOR_ID, found });
        }
        read_elements(buf)
    }
}

impl<T: Deserializable> Deserializable for crate::RawVec<T> {
    const MIN_WIRE_SIZE: usize = 4;

    fn deserialize(buf: Buffer) -> Result<Self> {
        read_elements(buf).map(crate::RawVec)
    }
}
