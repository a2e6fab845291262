use crate::file::io::{read_scalar_at, Scalar};

/// A fixed-layout inline aggregate.
///
/// Generated struct types are byte-array newtypes holding the exact little-endian wire image,
/// padding included. Accessors decode members at compile-time-known offsets; copying a struct in
/// or out of a buffer is a plain byte copy.
pub trait Struct: Copy {
    /// Size in bytes, padding included.
    const SIZE: usize;

    /// Alignment, the largest alignment of any member.
    const ALIGNMENT: usize;

    /// Builds a value from exactly [`Struct::SIZE`] bytes.
    ///
    /// # Panics
    /// Panics if `bytes` has a different length.
    fn from_bytes(bytes: &[u8]) -> Self;

    /// The wire image of the value.
    fn bytes(&self) -> &[u8];
}

/// Borrowed view of a struct's bytes inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructView<'a> {
    bytes: &'a [u8],
}

impl<'a> StructView<'a> {
    /// Creates a view of the `size` bytes at `loc`.
    ///
    /// # Panics
    /// Panics if the range leaves the buffer.
    #[must_use]
    pub fn new(buf: &'a [u8], loc: usize, size: usize) -> Self {
        StructView {
            bytes: &buf[loc..loc + size],
        }
    }

    /// Reads the member at byte `offset`.
    ///
    /// # Panics
    /// Panics if the member extends past the struct.
    #[must_use]
    pub fn get<T: Scalar>(&self, offset: usize) -> T {
        read_scalar_at(self.bytes, offset)
    }

    /// Borrows the nested struct of `size` bytes at byte `offset`.
    #[must_use]
    pub fn get_struct(&self, offset: usize, size: usize) -> StructView<'a> {
        StructView::new(self.bytes, offset, size)
    }

    /// The struct's bytes.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Copies the bytes into an owned struct value.
    #[must_use]
    pub fn to_struct<S: Struct>(&self) -> S {
        S::from_bytes(self.bytes)
    }
}
