//! Values the builder can write inline, and the offsets it hands out.

use std::marker::PhantomData;

use crate::{
    file::io::{emplace_scalar, Scalar},
    view::ForwardsUOffset,
    wire::{UOffsetT, SIZE_UOFFSET},
};

/// A value that can be written inline into the builder's arena.
///
/// `push` receives the exact destination slice (of [`Push::SIZE`] bytes) and the number of bytes
/// that were already written behind it, which is what offsets need to compute their distance to
/// the target.
///
/// Generated struct types implement this by copying their byte representation.
pub trait Push: Sized {
    /// The type readers see in place of `Self`, e.g. a forward offset for a [`WIPOffset`].
    type Output;

    /// Number of bytes written.
    const SIZE: usize;

    /// Alignment of the written value.
    const ALIGNMENT: usize;

    /// Writes `self` into `dst`.
    fn push(&self, dst: &mut [u8], written_len: usize);
}

macro_rules! impl_push_for_scalar {
    ($($ty:ty),*) => {
        $(
            impl Push for $ty {
                type Output = $ty;

                const SIZE: usize = <$ty as Scalar>::SIZE;
                const ALIGNMENT: usize = <$ty as Scalar>::SIZE;

                fn push(&self, dst: &mut [u8], _written_len: usize) {
                    emplace_scalar(dst, 0, *self);
                }
            }
        )*
    };
}

impl_push_for_scalar!(bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Marker for a table between `start_table` and `end_table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableUnfinished;

/// Marker for a finished table of unknown type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFinished;

/// Marker for a finished table used as a union value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnionWIPOffset;

/// Marker for a vector written from raw element bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawVector;

/// Offset to an object already written by a [`crate::Builder`].
///
/// The value counts bytes from the end of the arena, which stays stable while the arena grows
/// towards the front. `T` only records what the offset points to.
pub struct WIPOffset<T>(UOffsetT, PhantomData<fn() -> T>);

impl<T> WIPOffset<T> {
    /// Wraps a raw from-the-end position.
    #[must_use]
    pub fn new(offset: UOffsetT) -> WIPOffset<T> {
        WIPOffset(offset, PhantomData)
    }

    /// Returns the raw from-the-end position.
    #[must_use]
    pub fn value(&self) -> UOffsetT {
        self.0
    }

    /// Forgets the pointee type so the offset can be stored as a union value.
    #[must_use]
    pub fn as_union_value(&self) -> WIPOffset<UnionWIPOffset> {
        WIPOffset::new(self.0)
    }
}

impl<T> Clone for WIPOffset<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WIPOffset<T> {}

impl<T> PartialEq for WIPOffset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for WIPOffset<T> {}

impl<T> std::fmt::Debug for WIPOffset<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WIPOffset({})", self.0)
    }
}

impl<T> Push for WIPOffset<T> {
    type Output = ForwardsUOffset<T>;

    const SIZE: usize = SIZE_UOFFSET;
    const ALIGNMENT: usize = SIZE_UOFFSET;

    fn push(&self, dst: &mut [u8], written_len: usize) {
        // The offset lands `written_len + 4` bytes from the end; its target `self.0` bytes.
        let distance = (SIZE_UOFFSET + written_len) as UOffsetT - self.0;
        emplace_scalar::<UOffsetT>(dst, 0, distance);
    }
}
