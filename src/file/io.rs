//! Little-endian scalar reading and writing.
//!
//! Every multi-byte value in a buffer is stored little-endian, independent of the host. This
//! module is the single place where bytes turn into numbers and back; the builder, the verifier
//! and the views all go through it, so a big-endian host performs its byte swaps here and
//! nowhere else.
//!
//! # Key Components
//!
//! - [`Scalar`] - Trait for fixed-size values that can be stored inline
//! - [`read_le`] / [`read_le_at`] - Bounds-checked reads returning [`crate::Result`]
//! - [`write_le`] / [`write_le_at`] - Bounds-checked writes returning [`crate::Result`]
//! - [`read_scalar_at`] / [`emplace_scalar`] - Unchecked-by-contract variants used on verified
//!   buffers and inside the builder's own arena; these panic instead of reading out of range
//!
//! # Examples
//!
//! ```rust
//! use tabwire::file::io::{read_le_at, write_le_at};
//!
//! let mut data = [0u8; 6];
//! let mut offset = 0;
//! write_le_at(&mut data, &mut offset, 0x0201_u16)?;
//! write_le_at(&mut data, &mut offset, -2_i32)?;
//! assert_eq!(data, [0x01, 0x02, 0xFE, 0xFF, 0xFF, 0xFF]);
//!
//! let mut offset = 0;
//! assert_eq!(read_le_at::<u16>(&data, &mut offset)?, 0x0201);
//! assert_eq!(read_le_at::<i32>(&data, &mut offset)?, -2);
//! # Ok::<(), tabwire::Error>(())
//! ```

use crate::Result;

/// A fixed-size value that is stored inline, little-endian.
///
/// Implemented for all integer types, `f32`, `f64` and `bool`. Floats round-trip bit for bit,
/// including NaN payloads, because conversion goes through `to_le_bytes`/`from_le_bytes` and
/// never through arithmetic.
pub trait Scalar: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Byte array holding the encoded value.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]> + AsRef<[u8]>;

    /// Size of the encoded value, which is also its natural alignment.
    const SIZE: usize;

    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Decode from little-endian bytes.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Encode to little-endian bytes.
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                const SIZE: usize = std::mem::size_of::<$ty>();
                const NAME: &'static str = stringify!($ty);

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Scalar for bool {
    type Bytes = [u8; 1];

    const SIZE: usize = 1;
    const NAME: &'static str = "bool";

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        bytes[0] != 0
    }

    fn to_le_bytes(self) -> Self::Bytes {
        [u8::from(self)]
    }
}

/// Safely reads a value of type `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le<T: Scalar>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` at `offset` and advances the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes or the offset
/// arithmetic would overflow.
pub fn read_le_at<T: Scalar>(data: &[u8], offset: &mut usize) -> Result<T> {
    let Some(end) = offset.checked_add(T::SIZE) else {
        return Err(out_of_bounds_error!());
    };
    let Some(slice) = data.get(*offset..end) else {
        return Err(out_of_bounds_error!());
    };
    let Ok(read) = <T::Bytes as TryFrom<&[u8]>>::try_from(slice) else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Safely writes `value` to the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn write_le<T: Scalar>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_le_at(data, &mut offset, value)
}

/// Safely writes `value` at `offset` and advances the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes or the offset
/// arithmetic would overflow.
pub fn write_le_at<T: Scalar>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let Some(end) = offset.checked_add(T::SIZE) else {
        return Err(out_of_bounds_error!());
    };
    let Some(slice) = data.get_mut(*offset..end) else {
        return Err(out_of_bounds_error!());
    };

    slice.copy_from_slice(value.to_le_bytes().as_ref());
    *offset = end;
    Ok(())
}

/// Reads a `T` at `loc` from a buffer that is known to be valid.
///
/// Used by the view layer on verified buffers and by the builder on its own arena.
///
/// # Panics
/// Panics if `loc + size_of::<T>()` exceeds the buffer, which can only happen on a buffer
/// that was not verified.
#[must_use]
pub fn read_scalar_at<T: Scalar>(buf: &[u8], loc: usize) -> T {
    let mut offset = loc;
    match read_le_at(buf, &mut offset) {
        Ok(value) => value,
        Err(_) => panic!(
            "{} read at {loc} exceeds buffer of {} bytes",
            T::NAME,
            buf.len()
        ),
    }
}

/// Writes `value` at `loc` into a buffer that is known to have room for it.
///
/// # Panics
/// Panics if `loc + size_of::<T>()` exceeds the buffer.
pub fn emplace_scalar<T: Scalar>(buf: &mut [u8], loc: usize, value: T) {
    let len = buf.len();
    let mut offset = loc;
    if write_le_at(buf, &mut offset, value).is_err() {
        panic!("{} write at {loc} exceeds buffer of {len} bytes", T::NAME);
    }
}
