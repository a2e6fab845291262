use crate::{
    file::io::Scalar,
    verifier::Verifier,
    view::{Follow, ForwardsUOffset, Table, Vector},
    wire::SIZE_UOFFSET,
    Result,
};

/// A wire type the verifier knows how to check.
///
/// Generated tables implement this by visiting each of their fields; generated structs by
/// checking their range and alignment.
pub trait Verifiable {
    /// Alignment required where the value is stored inline.
    const ALIGNMENT: usize = 1;

    /// Whether a range check of the inline bytes is all a vector element of this type needs.
    const TRIVIAL: bool = false;

    /// Checks the value stored at `pos`.
    ///
    /// # Errors
    /// Returns the first defect found.
    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()>;
}

macro_rules! impl_verifiable_for_scalar {
    ($($ty:ty),*) => {
        $(
            impl Verifiable for $ty {
                const ALIGNMENT: usize = <$ty as Scalar>::SIZE;
                const TRIVIAL: bool = true;

                fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
                    v.in_buffer::<$ty>(pos)
                }
            }
        )*
    };
}

impl_verifiable_for_scalar!(bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl<T: Verifiable> Verifiable for ForwardsUOffset<T> {
    const ALIGNMENT: usize = SIZE_UOFFSET;

    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
        let target = v.follow_offset(pos)?;
        T::run_verifier(v, target)
    }
}

impl Verifiable for &str {
    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
        v.verify_string(pos)
    }
}

impl Verifiable for &[u8] {
    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
        v.verify_vector_range(pos, 1, 1).map(|_| ())
    }
}

impl<'a, T: Follow<'a> + Verifiable + 'a> Verifiable for Vector<'a, T> {
    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
        let (start, len) = v.verify_vector_range(pos, T::INLINE_SIZE, T::ALIGNMENT)?;
        if T::TRIVIAL {
            return Ok(());
        }
        for idx in 0..len {
            T::run_verifier(v, start + idx * T::INLINE_SIZE)
                .map_err(|err| err.in_field(format!("[{idx}]")))?;
        }
        Ok(())
    }
}

/// A table of unknown type: only the table and its vtable are checked.
impl Verifiable for Table<'_> {
    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
        v.visit_table(pos)?.finish();
        Ok(())
    }
}
