//! Zero-copy typed access to finished buffers.
//!
//! A view is a borrowed buffer plus a position. Nothing is decoded up front; every accessor reads
//! the bytes it needs when called. Lifetimes tie each view to the buffer it reads from, so a view
//! can never outlive its bytes.
//!
//! # Key Components
//!
//! - [`Follow`] - Decodes a value of some wire type at a position
//! - [`ForwardsUOffset`] - Follows a stored offset before decoding `T`
//! - [`Table`] / [`VTable`] - Tables and their field lookup
//! - [`Vector`] - Length-prefixed sequences of inline values or offsets
//! - [`Struct`] / [`StructView`] - Fixed-layout inline aggregates
//! - [`TableMut`] / [`VectorMut`] / [`StructViewMut`] - In-place mutation of present scalars
//!
//! # Safety of unverified reads
//!
//! Views are plain safe Rust over `&[u8]`. Reading an unverified buffer can panic or return
//! garbage, but it cannot read outside the slice. Run the verifier once per received buffer
//! before handing views out.

mod mutate;
mod structs;
mod table;
mod vector;

pub use mutate::{root_mut_unchecked, StructViewMut, TableMut, VectorMut};
pub use structs::{Struct, StructView};
pub use table::{Table, VTable};
pub use vector::{Vector, VectorIter};

use std::marker::PhantomData;

use crate::{
    file::io::read_scalar_at,
    wire::{UOffsetT, SIZE_UOFFSET},
};

/// Decodes a value of a wire type stored at a buffer position.
///
/// `Self` names the wire type; [`Follow::Inner`] is what callers get back. For scalars both are
/// the same, for offset-addressed objects `Inner` is a view borrowing the buffer.
pub trait Follow<'a> {
    /// The decoded value.
    type Inner;

    /// Bytes this type occupies where it is stored inline, e.g. as a vector element. Objects
    /// that are only ever reached through an offset report the size of that offset.
    const INLINE_SIZE: usize;

    /// Decodes the value at `loc`.
    fn follow(buf: &'a [u8], loc: usize) -> Self::Inner;
}

macro_rules! impl_follow_for_scalar {
    ($($ty:ty),*) => {
        $(
            impl<'a> Follow<'a> for $ty {
                type Inner = $ty;

                const INLINE_SIZE: usize = std::mem::size_of::<$ty>();

                fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
                    read_scalar_at::<$ty>(buf, loc)
                }
            }
        )*
    };
}

impl_follow_for_scalar!(bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Wire type of an unsigned offset to a `T` stored elsewhere in the buffer.
pub struct ForwardsUOffset<T>(PhantomData<T>);

impl<'a, T: Follow<'a>> Follow<'a> for ForwardsUOffset<T> {
    type Inner = T::Inner;

    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        let offset = read_scalar_at::<UOffsetT>(buf, loc) as usize;
        T::follow(buf, loc + offset)
    }
}

impl<'a> Follow<'a> for &'a [u8] {
    type Inner = &'a [u8];

    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        let len = read_scalar_at::<UOffsetT>(buf, loc) as usize;
        let start = loc + SIZE_UOFFSET;
        &buf[start..start + len]
    }
}

/// Strings that are not valid UTF-8 read as `""`. The verifier rejects them, so this only
/// happens on unverified buffers.
impl<'a> Follow<'a> for &'a str {
    type Inner = &'a str;

    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        std::str::from_utf8(<&'a [u8]>::follow(buf, loc)).unwrap_or("")
    }
}

/// Returns the root object of `buf` without verifying it.
///
/// # Panics
/// May panic on a buffer that was not verified.
#[must_use]
pub fn root_unchecked<'a, T: Follow<'a>>(buf: &'a [u8]) -> T::Inner {
    ForwardsUOffset::<T>::follow(buf, 0)
}
