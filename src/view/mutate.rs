//! In-place mutation of fixed-size values that are already present.
//!
//! Mutation never changes the size or layout of a buffer: absent fields stay absent, strings and
//! vectors keep their length. Every setter writes exactly the bytes of the value it replaces.

use std::marker::PhantomData;

use crate::{
    file::io::{emplace_scalar, read_scalar_at, Scalar},
    view::{StructView, Table},
    wire::{UOffsetT, SIZE_UOFFSET},
};

/// Mutable view of a table.
#[derive(Debug)]
pub struct TableMut<'a> {
    buf: &'a mut [u8],
    loc: usize,
}

impl<'a> TableMut<'a> {
    /// Creates a mutable view of the table at `loc`.
    pub fn new(buf: &'a mut [u8], loc: usize) -> Self {
        TableMut { buf, loc }
    }

    /// Position of the table in the buffer.
    #[must_use]
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Read-only view of the same table.
    #[must_use]
    pub fn as_table(&self) -> Table<'_> {
        Table::new(self.buf, self.loc)
    }

    fn field_loc(&self, slot: u16) -> Option<usize> {
        match self.as_table().field_offset(slot) {
            0 => None,
            offset => Some(self.loc + usize::from(offset)),
        }
    }

    fn follow_offset(&self, slot: u16) -> Option<usize> {
        let loc = self.field_loc(slot)?;
        Some(loc + read_scalar_at::<UOffsetT>(self.buf, loc) as usize)
    }

    /// Overwrites the scalar in `slot`.
    ///
    /// Returns `false` and leaves the buffer untouched if the field is absent.
    pub fn set<T: Scalar>(&mut self, slot: u16, value: T) -> bool {
        match self.field_loc(slot) {
            Some(loc) => {
                emplace_scalar(self.buf, loc, value);
                true
            }
            None => false,
        }
    }

    /// Mutable view of the `size` bytes of the struct in `slot`.
    pub fn struct_mut(&mut self, slot: u16, size: usize) -> Option<StructViewMut<'_>> {
        let loc = self.field_loc(slot)?;
        Some(StructViewMut::new(self.buf, loc, size))
    }

    /// Mutable view of the scalar vector in `slot`.
    pub fn vector_mut<T: Scalar>(&mut self, slot: u16) -> Option<VectorMut<'_, T>> {
        let loc = self.follow_offset(slot)?;
        Some(VectorMut::new(self.buf, loc))
    }

    /// Mutable view of the sub-table in `slot`.
    pub fn table_mut(&mut self, slot: u16) -> Option<TableMut<'_>> {
        let loc = self.follow_offset(slot)?;
        Some(TableMut::new(self.buf, loc))
    }
}

/// Mutable view of a vector of scalars.
#[derive(Debug)]
pub struct VectorMut<'a, T> {
    buf: &'a mut [u8],
    loc: usize,
    phantom: PhantomData<T>,
}

impl<'a, T: Scalar> VectorMut<'a, T> {
    /// Creates a mutable view of the vector whose length prefix is at `loc`.
    pub fn new(buf: &'a mut [u8], loc: usize) -> Self {
        VectorMut {
            buf,
            loc,
            phantom: PhantomData,
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        read_scalar_at::<UOffsetT>(self.buf, self.loc) as usize
    }

    /// Whether the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads element `idx`, or `None` past the end.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<T> {
        (idx < self.len()).then(|| read_scalar_at(self.buf, self.element_loc(idx)))
    }

    /// Overwrites element `idx`. Returns `false` past the end.
    pub fn set(&mut self, idx: usize, value: T) -> bool {
        if idx >= self.len() {
            return false;
        }
        let loc = self.element_loc(idx);
        emplace_scalar(self.buf, loc, value);
        true
    }

    fn element_loc(&self, idx: usize) -> usize {
        self.loc + SIZE_UOFFSET + idx * T::SIZE
    }
}

/// Mutable view of a struct's bytes inside a buffer.
#[derive(Debug)]
pub struct StructViewMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> StructViewMut<'a> {
    /// Creates a mutable view of the `size` bytes at `loc`.
    ///
    /// # Panics
    /// Panics if the range leaves the buffer.
    pub fn new(buf: &'a mut [u8], loc: usize, size: usize) -> Self {
        StructViewMut {
            bytes: &mut buf[loc..loc + size],
        }
    }

    /// Read-only view of the same struct.
    #[must_use]
    pub fn as_view(&self) -> StructView<'_> {
        StructView::new(self.bytes, 0, self.bytes.len())
    }

    /// Reads the member at byte `offset`.
    #[must_use]
    pub fn get<T: Scalar>(&self, offset: usize) -> T {
        read_scalar_at(self.bytes, offset)
    }

    /// Overwrites the member at byte `offset`.
    ///
    /// # Panics
    /// Panics if the member extends past the struct.
    pub fn set<T: Scalar>(&mut self, offset: usize, value: T) {
        emplace_scalar(self.bytes, offset, value);
    }

    /// Mutable view of the nested struct of `size` bytes at byte `offset`.
    pub fn struct_mut(&mut self, offset: usize, size: usize) -> StructViewMut<'_> {
        StructViewMut::new(self.bytes, offset, size)
    }
}

/// Returns a mutable view of the root table without verifying the buffer.
///
/// # Panics
/// Panics if the buffer is shorter than a root offset.
pub fn root_mut_unchecked(buf: &mut [u8]) -> TableMut<'_> {
    let loc = read_scalar_at::<UOffsetT>(buf, 0) as usize;
    TableMut::new(buf, loc)
}
