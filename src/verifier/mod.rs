//! Bounded, read-only validation of untrusted buffers.
//!
//! Views trust the bytes they read. The [`Verifier`] establishes that trust once per received
//! buffer: it walks every object reachable from the root, checks each range, offset and
//! alignment before using it, and fails on the first defect with a reason. It never mutates the
//! buffer and its result depends only on the bytes and the [`VerifierConfig`].
//!
//! # Checks
//!
//! - the root offset and every followed offset stay inside the buffer and are non-zero
//! - a table's vtable lies inside the buffer, is 2-aligned, and declares an even size of at
//!   least 4 bytes that fits; the table's declared inline size fits
//! - every accessed field fits inside the buffer
//! - vector lengths cannot overflow and their elements stay in range
//! - strings are zero terminated and valid UTF-8
//! - union discriminants name a declared variant and both union halves are present together
//! - required fields are present
//! - nesting depth, table count and total checked bytes stay within budget
//!
//! # Examples
//!
//! ```rust
//! use tabwire::{Builder, Error, Table, verify_root};
//!
//! let mut builder = Builder::new();
//! let start = builder.start_table();
//! builder.add_field::<u16>(0, 5, 0)?;
//! let root = builder.end_table(start)?;
//! let mut data = builder.finish(root, None)?;
//! verify_root::<Table>(&data)?;
//!
//! // Point the root offset past the end of the buffer.
//! data[0] = 0xF0;
//! assert!(matches!(verify_root::<Table>(&data), Err(Error::RangeOutOfBounds { .. })));
//! # Ok::<(), tabwire::Error>(())
//! ```

mod config;
mod verifiable;

pub use config::{
    VerifierConfig, DEFAULT_MAX_APPARENT_SIZE, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TABLES,
};
pub use verifiable::Verifiable;

use log::debug;
use rayon::prelude::*;

use crate::{
    file::io::{read_scalar_at, Scalar},
    view::{root_mut_unchecked, root_unchecked, Follow, ForwardsUOffset, TableMut},
    wire::{
        buffer_has_identifier, field_index_to_offset, get_identifier, SOffsetT, UOffsetT,
        VOffsetT, SIZE_UOFFSET, SIZE_VOFFSET,
    },
    Error, Result,
};

/// Walks a buffer and checks every range before it is read.
#[derive(Debug)]
pub struct Verifier<'cfg, 'buf> {
    buf: &'buf [u8],
    config: &'cfg VerifierConfig,
    depth: usize,
    num_tables: usize,
    apparent_size: usize,
}

impl<'cfg, 'buf> Verifier<'cfg, 'buf> {
    /// Creates a verifier for `buf`.
    #[must_use]
    pub fn new(config: &'cfg VerifierConfig, buf: &'buf [u8]) -> Self {
        Verifier {
            buf,
            config,
            depth: 0,
            num_tables: 0,
            apparent_size: 0,
        }
    }

    /// The buffer under verification.
    #[must_use]
    pub fn buf(&self) -> &'buf [u8] {
        self.buf
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &'cfg VerifierConfig {
        self.config
    }

    /// Current table nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of tables visited so far.
    #[must_use]
    pub fn num_tables(&self) -> usize {
        self.num_tables
    }

    /// Sum of all byte ranges checked so far.
    #[must_use]
    pub fn apparent_size(&self) -> usize {
        self.apparent_size
    }

    /// Checks that `pos` is a multiple of `alignment`, unless alignment checks are disabled.
    ///
    /// # Errors
    /// Returns [`Error::Unaligned`].
    pub fn is_aligned(&self, pos: usize, alignment: usize, type_name: &'static str) -> Result<()> {
        if !self.config.check_alignment || alignment <= 1 || pos % alignment == 0 {
            return Ok(());
        }
        Err(Error::Unaligned {
            position: pos,
            alignment,
            type_name,
        })
    }

    /// Checks that `[pos, pos + size)` lies inside the buffer and charges it to the budget.
    ///
    /// # Errors
    /// Returns [`Error::RangeOutOfBounds`] or [`Error::ApparentSizeTooLarge`].
    pub fn range_in_buffer(&mut self, pos: usize, size: usize) -> Result<()> {
        match pos.checked_add(size) {
            Some(end) if end <= self.buf.len() => {}
            _ => return Err(Error::RangeOutOfBounds { position: pos, size }),
        }

        self.apparent_size = self.apparent_size.saturating_add(size);
        if self.apparent_size > self.config.max_apparent_size {
            return Err(Error::ApparentSizeTooLarge(self.config.max_apparent_size));
        }
        Ok(())
    }

    /// Checks that a `T` at `pos` is aligned and inside the buffer.
    ///
    /// # Errors
    /// Returns [`Error::Unaligned`], [`Error::RangeOutOfBounds`] or
    /// [`Error::ApparentSizeTooLarge`].
    pub fn in_buffer<T: Scalar>(&mut self, pos: usize) -> Result<()> {
        self.is_aligned(pos, T::SIZE, T::NAME)?;
        self.range_in_buffer(pos, T::SIZE)
    }

    /// Checks and reads a `T` at `pos`.
    ///
    /// # Errors
    /// See [`Verifier::in_buffer`].
    pub fn read<T: Scalar>(&mut self, pos: usize) -> Result<T> {
        self.in_buffer::<T>(pos)?;
        Ok(read_scalar_at::<T>(self.buf, pos))
    }

    /// Checks and reads the unsigned offset at `pos`.
    ///
    /// # Errors
    /// Returns [`Error::NullOffset`] for a zero offset, otherwise see [`Verifier::in_buffer`].
    pub fn get_uoffset(&mut self, pos: usize) -> Result<usize> {
        match self.read::<UOffsetT>(pos)? {
            0 => Err(Error::NullOffset { position: pos }),
            offset => Ok(offset as usize),
        }
    }

    /// Checks the unsigned offset at `pos` and returns the position it points to.
    ///
    /// # Errors
    /// See [`Verifier::get_uoffset`]; returns [`Error::RangeOutOfBounds`] if the target
    /// position overflows.
    pub fn follow_offset(&mut self, pos: usize) -> Result<usize> {
        let offset = self.get_uoffset(pos)?;
        pos.checked_add(offset).ok_or(Error::RangeOutOfBounds {
            position: pos,
            size: offset,
        })
    }

    fn deref_soffset(&mut self, pos: usize) -> Result<usize> {
        let soffset = self.read::<SOffsetT>(pos)?;
        usize::try_from(pos as i64 - i64::from(soffset))
            .ok()
            .filter(|&vtable| vtable < self.buf.len())
            .ok_or(Error::SignedOffsetOutOfBounds {
                soffset,
                position: pos,
            })
    }

    /// Enters the table at `pos`, checking its vtable and charging depth and table budgets.
    ///
    /// The returned [`TableVerifier`] checks the individual fields; call
    /// [`TableVerifier::finish`] to leave the table again.
    ///
    /// # Errors
    /// Returns [`Error::RecursionLimit`], [`Error::TooManyTables`],
    /// [`Error::SignedOffsetOutOfBounds`], [`Error::VTableMalformed`] or a range error.
    pub fn visit_table<'ver>(
        &'ver mut self,
        pos: usize,
    ) -> Result<TableVerifier<'ver, 'cfg, 'buf>> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(Error::RecursionLimit(self.config.max_depth));
        }
        self.num_tables += 1;
        if self.num_tables > self.config.max_tables {
            return Err(Error::TooManyTables(self.config.max_tables));
        }

        let vtable = self.deref_soffset(pos)?;
        let vtable_len = usize::from(self.read::<VOffsetT>(vtable)?);
        if vtable_len < 2 * SIZE_VOFFSET || vtable_len % SIZE_VOFFSET != 0 {
            return Err(Error::VTableMalformed {
                position: vtable,
                size: vtable_len,
            });
        }
        self.range_in_buffer(vtable, vtable_len)?;

        let table_len = usize::from(read_scalar_at::<VOffsetT>(self.buf, vtable + SIZE_VOFFSET));
        self.range_in_buffer(pos, table_len)?;

        Ok(TableVerifier {
            verifier: self,
            pos,
            vtable,
            vtable_len,
        })
    }

    /// Checks a length-prefixed vector of `element_size`-byte elements at `pos`.
    ///
    /// Returns the position of the first element and the element count.
    ///
    /// # Errors
    /// Returns a range or alignment error if the length prefix or the elements leave the buffer.
    pub fn verify_vector_range(
        &mut self,
        pos: usize,
        element_size: usize,
        alignment: usize,
    ) -> Result<(usize, usize)> {
        let len = self.read::<UOffsetT>(pos)? as usize;
        let start = pos + SIZE_UOFFSET;
        let Some(byte_len) = len.checked_mul(element_size) else {
            return Err(Error::RangeOutOfBounds {
                position: start,
                size: usize::MAX,
            });
        };
        self.is_aligned(start, alignment, "vector element")?;
        self.range_in_buffer(start, byte_len)?;
        Ok((start, len))
    }

    /// Checks the string at `pos`: in range, zero terminated and valid UTF-8.
    ///
    /// # Errors
    /// Returns [`Error::MissingNulTerminator`], [`Error::Utf8`] or a range error.
    pub fn verify_string(&mut self, pos: usize) -> Result<()> {
        let (start, len) = self.verify_vector_range(pos, 1, 1)?;
        let end = start + len;
        if self.buf.get(end) != Some(&0) {
            return Err(Error::MissingNulTerminator { position: pos });
        }
        self.apparent_size = self.apparent_size.saturating_add(1);

        std::str::from_utf8(&self.buf[start..end])
            .map(|_| ())
            .map_err(|source| Error::Utf8 {
                position: pos,
                source,
            })
    }

    /// Checks a struct of `size` bytes at `pos`.
    ///
    /// # Errors
    /// Returns an alignment or range error.
    pub fn verify_struct(&mut self, pos: usize, size: usize, alignment: usize) -> Result<()> {
        self.is_aligned(pos, alignment, "struct")?;
        self.range_in_buffer(pos, size)
    }

    /// Runs `verify` on the `len` bytes at `start` as a buffer of their own.
    ///
    /// Positions inside the nested verifier are relative to `start`. Depth and budgets carry
    /// over, so nesting buffers cannot be used to escape the limits.
    ///
    /// # Errors
    /// Returns whatever `verify` returns, or a range error if the bytes leave the buffer.
    pub fn verify_nested<F>(&mut self, start: usize, len: usize, verify: F) -> Result<()>
    where
        F: FnOnce(&mut Verifier<'cfg, 'buf>) -> Result<()>,
    {
        let Some(nested_buf) = start.checked_add(len).and_then(|end| self.buf.get(start..end))
        else {
            return Err(Error::RangeOutOfBounds {
                position: start,
                size: len,
            });
        };

        let mut nested = Verifier {
            buf: nested_buf,
            config: self.config,
            depth: self.depth,
            num_tables: self.num_tables,
            apparent_size: self.apparent_size,
        };
        let result = verify(&mut nested);
        self.num_tables = nested.num_tables;
        self.apparent_size = nested.apparent_size;
        result
    }

    /// Checks the `[ubyte]` vector at `pos` and verifies its contents as a root of type `T`.
    ///
    /// # Errors
    /// Returns the first defect in the vector or in the nested buffer.
    pub fn verify_nested_root<T: Verifiable>(&mut self, pos: usize) -> Result<()> {
        let (start, len) = self.verify_vector_range(pos, 1, 1)?;
        self.verify_nested(start, len, |nested| {
            ForwardsUOffset::<T>::run_verifier(nested, 0)
        })
    }
}

/// Field-by-field verification of one table, created by [`Verifier::visit_table`].
///
/// Methods consume and return the table verifier so checks chain with `?`:
///
/// ```rust
/// # use tabwire::{Verifier, VerifierConfig, Result};
/// fn verify_point(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
///     v.visit_table(pos)?
///         .visit_field::<i32>("x", 0, false)?
///         .visit_field::<i32>("y", 1, false)?
///         .finish();
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct TableVerifier<'ver, 'cfg, 'buf> {
    verifier: &'ver mut Verifier<'cfg, 'buf>,
    pos: usize,
    vtable: usize,
    vtable_len: usize,
}

impl<'ver, 'cfg, 'buf> TableVerifier<'ver, 'cfg, 'buf> {
    /// Position of the table.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Position of the field in `slot`, or `None` if absent.
    #[must_use]
    pub fn deref(&self, slot: u16) -> Option<usize> {
        let entry = usize::from(field_index_to_offset(slot));
        if entry + SIZE_VOFFSET > self.vtable_len {
            return None;
        }
        match read_scalar_at::<VOffsetT>(self.verifier.buf, self.vtable + entry) {
            0 => None,
            offset => Some(self.pos + usize::from(offset)),
        }
    }

    /// Verifies the field in `slot` as wire type `T`.
    ///
    /// # Errors
    /// Returns [`Error::MissingRequiredField`] if a required field is absent, otherwise the
    /// field's failure wrapped in [`Error::InField`].
    pub fn visit_field<T: Verifiable>(self, name: &str, slot: u16, required: bool) -> Result<Self> {
        self.visit_field_with(name, slot, required, |verifier, pos| {
            T::run_verifier(verifier, pos)
        })
    }

    /// Verifies the field in `slot` with a custom check, for fields whose type is only known
    /// at runtime.
    ///
    /// # Errors
    /// See [`TableVerifier::visit_field`].
    pub fn visit_field_with<F>(self, name: &str, slot: u16, required: bool, verify: F) -> Result<Self>
    where
        F: FnOnce(&mut Verifier<'cfg, 'buf>, usize) -> Result<()>,
    {
        match self.deref(slot) {
            Some(pos) => {
                verify(&mut *self.verifier, pos).map_err(|err| err.in_field(name))?;
                Ok(self)
            }
            None if required => Err(Error::MissingRequiredField {
                field: name.to_string(),
            }),
            None => Ok(self),
        }
    }

    /// Verifies a union stored as a `u8` discriminant in `key_slot` and an offset in
    /// `val_slot`.
    ///
    /// `verify_variant` receives the discriminant, the verifier and the position of the value
    /// offset; it returns `None` for a discriminant that names no declared variant.
    ///
    /// # Errors
    /// Returns [`Error::InconsistentUnion`] if only one half is present,
    /// [`Error::InvalidUnionTag`] for an undeclared discriminant,
    /// [`Error::MissingRequiredField`] if a required union is absent, otherwise the value's
    /// failure wrapped in [`Error::InField`].
    pub fn visit_union<F>(
        self,
        key_name: &str,
        key_slot: u16,
        val_name: &str,
        val_slot: u16,
        required: bool,
        verify_variant: F,
    ) -> Result<Self>
    where
        F: FnOnce(u8, &mut Verifier<'cfg, 'buf>, usize) -> Option<Result<()>>,
    {
        let key_pos = self.deref(key_slot);
        let val_pos = self.deref(val_slot);

        let tag = match key_pos {
            Some(pos) => self
                .verifier
                .read::<u8>(pos)
                .map_err(|err| err.in_field(key_name))?,
            None => 0,
        };

        match (tag, val_pos) {
            (0, None) if required => Err(Error::MissingRequiredField {
                field: val_name.to_string(),
            }),
            (0, None) => Ok(self),
            (0, Some(_)) | (_, None) => Err(Error::InconsistentUnion {
                field: val_name.to_string(),
            }),
            (tag, Some(pos)) => match verify_variant(tag, &mut *self.verifier, pos) {
                Some(result) => {
                    result.map_err(|err| err.in_field(val_name))?;
                    Ok(self)
                }
                None => Err(Error::InvalidUnionTag {
                    field: key_name.to_string(),
                    tag,
                }),
            },
        }
    }

    /// Leaves the table.
    pub fn finish(self) -> &'ver mut Verifier<'cfg, 'buf> {
        self.verifier.depth -= 1;
        self.verifier
    }
}

/// Verifies `buf` as a root of type `T` with the default configuration.
///
/// # Errors
/// Returns the first defect found.
pub fn verify_root<T: Verifiable>(buf: &[u8]) -> Result<()> {
    verify_root_with_opts::<T>(&VerifierConfig::default(), buf)
}

/// Verifies `buf` as a root of type `T`.
///
/// # Errors
/// Returns the first defect found.
pub fn verify_root_with_opts<T: Verifiable>(config: &VerifierConfig, buf: &[u8]) -> Result<()> {
    let mut verifier = Verifier::new(config, buf);
    let result = ForwardsUOffset::<T>::run_verifier(&mut verifier, 0);
    if let Err(err) = &result {
        debug!("buffer of {} bytes failed verification: {err}", buf.len());
    }
    result
}

/// Verifies `buf` as a root of type `T` carrying the file identifier `ident`.
///
/// # Errors
/// Returns [`Error::IdentifierMismatch`] if the identifier differs, otherwise the first
/// defect found.
pub fn verify_root_with_identifier<T: Verifiable>(
    config: &VerifierConfig,
    buf: &[u8],
    ident: &str,
) -> Result<()> {
    check_identifier(buf, ident)?;
    verify_root_with_opts::<T>(config, buf)
}

/// Verifies `buf` with the default configuration and returns its root view.
///
/// # Errors
/// Returns the first defect found.
pub fn root<'a, T>(buf: &'a [u8]) -> Result<T::Inner>
where
    T: Follow<'a> + Verifiable + 'a,
{
    root_with_opts::<T>(&VerifierConfig::default(), buf)
}

/// Verifies `buf` and returns its root view.
///
/// # Errors
/// Returns the first defect found.
pub fn root_with_opts<'a, T>(config: &VerifierConfig, buf: &'a [u8]) -> Result<T::Inner>
where
    T: Follow<'a> + Verifiable + 'a,
{
    verify_root_with_opts::<T>(config, buf)?;
    Ok(root_unchecked::<T>(buf))
}

/// Verifies `buf` including its file identifier and returns its root view.
///
/// # Errors
/// Returns [`Error::IdentifierMismatch`] if the identifier differs, otherwise the first
/// defect found.
pub fn root_with_identifier<'a, T>(buf: &'a [u8], ident: &str) -> Result<T::Inner>
where
    T: Follow<'a> + Verifiable + 'a,
{
    verify_root_with_identifier::<T>(&VerifierConfig::default(), buf, ident)?;
    Ok(root_unchecked::<T>(buf))
}

/// Verifies `buf` as a root of type `T` and returns a mutable view of the root table.
///
/// # Errors
/// Returns the first defect found.
pub fn root_mut<T: Verifiable>(buf: &mut [u8]) -> Result<TableMut<'_>> {
    verify_root::<T>(buf)?;
    Ok(root_mut_unchecked(buf))
}

/// Verifies many buffers in parallel, one result per buffer in input order.
#[must_use]
pub fn verify_batch<T: Verifiable>(config: &VerifierConfig, bufs: &[&[u8]]) -> Vec<Result<()>> {
    bufs.par_iter()
        .map(|buf| verify_root_with_opts::<T>(config, buf))
        .collect()
}

pub(crate) fn check_identifier(buf: &[u8], ident: &str) -> Result<()> {
    if buffer_has_identifier(buf, ident) {
        return Ok(());
    }
    Err(Error::IdentifierMismatch {
        expected: ident.to_string(),
        found: get_identifier(buf)
            .map(|found| String::from_utf8_lossy(found).into_owned())
            .unwrap_or_default(),
    })
}
