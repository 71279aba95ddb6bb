//! Byte View Module
//!
//! Immutable byte buffer handed out by the cache.

use std::fmt;

use bytes::Bytes;

use crate::cache::Value;

// == Byte View ==
/// An immutable view of cached bytes.
///
/// Cloning is cheap: the underlying buffer is reference counted and never
/// mutated after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Creates a view over the given bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the number of bytes held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a copy of the data; callers may mutate it freely.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Borrows the data without copying.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the shared buffer, e.g. to use as an HTTP body.
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl Value for ByteView {
    fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<Bytes> for ByteView {
    fn from(value: Bytes) -> Self {
        Self::new(value)
    }
}

impl From<&'static str> for ByteView {
    fn from(value: &'static str) -> Self {
        Self::new(Bytes::from_static(value.as_bytes()))
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_slice_is_a_copy() {
        let view = ByteView::from(b"630".to_vec());

        let mut copy = view.byte_slice();
        copy[0] = b'9';

        assert_eq!(view.as_bytes(), b"630");
        assert_eq!(copy, b"930");
    }

    #[test]
    fn test_len_and_display() {
        let view = ByteView::from("julsj");
        assert_eq!(view.len(), 5);
        assert!(!view.is_empty());
        assert_eq!(view.to_string(), "julsj");
        assert!(ByteView::default().is_empty());
    }
}
