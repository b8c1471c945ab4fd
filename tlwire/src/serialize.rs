//! The [`Serializable`] trait and its implementations for primitive TL types.
//!
//! Encoding follows [MTProto Binary Serialization].
//!
//! [MTProto Binary Serialization]: https://core.telegram.org/mtproto/serialize

use crate::{BOOL_FALSE_ID, BOOL_TRUE_ID, LONG_LEN_MARKER, VECTOR_ID, bytes_framing};

/// Largest byte string the 3-byte length prefix can describe.
pub const MAX_BYTES_LEN: usize = 0x00ff_ffff;

/// Serialize `self` into TL binary format.
pub trait Serializable {
    /// Appends the serialized form of `self` to `buf`.
    fn serialize(&self, buf: &mut impl Extend<u8>);

    /// Convenience: allocate a fresh `Vec<u8>` and serialize into it.
    fn to_bytes(&self) -> Vec<u8> {
        let mut v = Vec::new();
        self.serialize(&mut v);
        v
    }
}

// ─── bool ────────────────────────────────────────────────────────────────────

/// `true`  → `boolTrue#997275b5`
/// `false` → `boolFalse#bc799737`
impl Serializable for bool {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let id = if *self { BOOL_TRUE_ID } else { BOOL_FALSE_ID };
        id.serialize(buf);
    }
}

// ─── integers ────────────────────────────────────────────────────────────────

impl Serializable for i32 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.to_le_bytes());
    }
}

impl Serializable for u32 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.to_le_bytes());
    }
}

impl Serializable for i64 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.to_le_bytes());
    }
}

impl Serializable for f64 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.to_le_bytes());
    }
}

impl Serializable for [u8; 16] {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.iter().copied());
    }
}

impl Serializable for [u8; 32] {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.iter().copied());
    }
}

// ─── strings / bytes ─────────────────────────────────────────────────────────

/// TL string encoding: a length prefix, the data, then zero padding up to a
/// multiple of four. Up to 253 bytes the prefix is the length itself;
/// longer strings get `0xfe` followed by the length as 3 LE bytes.
///
/// # Panics
///
/// If the slice is longer than [`MAX_BYTES_LEN`]. Values built through
/// [`crate::Object::builder`] are checked up front instead.
impl Serializable for &[u8] {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let len = self.len();
        assert!(len <= MAX_BYTES_LEN, "{len} bytes do not fit a TL length prefix");

        let (header, padding) = bytes_framing(len);
        if header == 1 {
            buf.extend([len as u8]);
        } else {
            let [a, b, c, _] = (len as u32).to_le_bytes();
            buf.extend([LONG_LEN_MARKER, a, b, c]);
        }
        buf.extend(self.iter().copied());
        buf.extend(std::iter::repeat_n(0u8, padding));
    }
}

impl Serializable for Vec<u8> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_slice().serialize(buf);
    }
}

impl Serializable for &str {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_bytes().serialize(buf);
    }
}

impl Serializable for String {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_bytes().serialize(buf);
    }
}

// ─── vectors ─────────────────────────────────────────────────────────────────

/// Boxed `Vector<T>` — prefixed with constructor ID `0x1cb5c415`.
impl<T: Serializable> Serializable for Vec<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        VECTOR_ID.serialize(buf);
        (self.len() as i32).serialize(buf);
        for item in self { item.serialize(buf); }
    }
}

/// Bare `vector<T>` — just a count followed by items, no constructor ID.
impl<T: Serializable> Serializable for crate::RawVec<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (self.0.len() as i32).serialize(buf);
        for item in &self.0 { item.serialize(buf); }
    }
}

// ─── Option ──────────────────────────────────────────────────────────────────

/// Optional parameters are handled by flags; when `Some`, serialize the value.
/// When `None`, nothing is written (the flags word already encodes absence).
impl<T: Serializable> Serializable for Option<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        if let Some(v) = self { v.serialize(buf); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_prefixes() {
        let short = [7u8; 253].as_slice().to_bytes();
        assert_eq!(short[0], 253);
        assert_eq!(short.len(), 256);

        let long = [7u8; 254].as_slice().to_bytes();
        assert_eq!(&long[..4], &[0xfe, 254, 0, 0]);
        assert_eq!(long.len(), 260);
    }

    #[test]
    fn decoder_reads_back_every_framing() {
        for len in [0, 1, 252, 253, 254, 255, 256, 1000] {
            let data = vec![0x5a; len];
            let bytes = data.as_slice().to_bytes();
            let mut cursor = crate::Cursor::from_slice(&bytes);
            assert_eq!(cursor.read_tl_bytes().unwrap(), data.as_slice(), "len {len}");
            assert_eq!(cursor.remaining(), 0, "len {len}");
        }
    }

    #[test]
    fn padding_is_zero() {
        let out = "abcde".to_bytes();
        assert_eq!(out, [5, b'a', b'b', b'c', b'd', b'e', 0, 0]);
    }

    #[test]
    #[should_panic]
    fn oversize_slice_panics() {
        let huge = vec![0u8; MAX_BYTES_LEN + 1];
        huge.as_slice().to_bytes();
    }
}
