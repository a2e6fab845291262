//! Wire format constants and layout arithmetic.
//!
//! All components agree on the encoding through this module:
//!
//! ```text
//! buffer:  [u32 root offset][4-byte identifier, optional] ... objects ...
//! table:   [i32 soffset to vtable][present fields, at vtable-given offsets]
//! vtable:  [u16 vtable size][u16 table inline size][u16 per slot, 0 = absent]
//! vector:  [u32 element count][elements or u32 offsets]
//! string:  [u32 byte length][bytes][0]
//! ```
//!
//! An unsigned offset stored at position `L` points to `L + offset` and therefore always points
//! forward. A table's signed offset `S` points to `table_pos - S`, so a vtable may live on either
//! side of the tables that share it.

/// Unsigned offset type, forward pointing.
pub type UOffsetT = u32;
/// Signed offset type, from a table to its vtable.
pub type SOffsetT = i32;
/// Vtable entry type.
pub type VOffsetT = u16;

/// Size of an unsigned offset in bytes.
pub const SIZE_UOFFSET: usize = 4;
/// Size of a signed offset in bytes.
pub const SIZE_SOFFSET: usize = 4;
/// Size of a vtable entry in bytes.
pub const SIZE_VOFFSET: usize = 2;

/// Length of the optional file identifier following the root offset.
pub const FILE_IDENTIFIER_LENGTH: usize = 4;

/// Number of header entries (vtable size, table size) in front of the slot entries.
pub const VTABLE_METADATA_FIELDS: usize = 2;

/// Largest buffer the format can address: offsets are stored in 32 bits but the signed
/// table-to-vtable offset limits the usable range to `i32::MAX`.
pub const MAX_BUFFER_SIZE: usize = (1 << 31) - 1;

/// Converts a 0-based field slot into its byte position inside a vtable.
#[must_use]
pub const fn field_index_to_offset(slot: u16) -> VOffsetT {
    (slot.saturating_add(VTABLE_METADATA_FIELDS as u16)).saturating_mul(SIZE_VOFFSET as u16)
}

/// Size of a vtable whose highest used slot is `max_slot`, or of an empty vtable for `None`.
#[must_use]
pub fn vtable_size(max_slot: Option<u16>) -> usize {
    match max_slot {
        Some(slot) => (VTABLE_METADATA_FIELDS + usize::from(slot) + 1) * SIZE_VOFFSET,
        None => VTABLE_METADATA_FIELDS * SIZE_VOFFSET,
    }
}

/// Number of zero bytes needed so that `buf_size` becomes a multiple of `scalar_size`.
///
/// `scalar_size` must be a power of two.
#[must_use]
pub const fn padding_bytes(buf_size: usize, scalar_size: usize) -> usize {
    (!buf_size).wrapping_add(1) & (scalar_size.wrapping_sub(1))
}

/// Returns the bytes of the identifier slot, if the buffer is long enough to have one.
#[must_use]
pub fn get_identifier(buf: &[u8]) -> Option<&[u8]> {
    buf.get(SIZE_UOFFSET..SIZE_UOFFSET + FILE_IDENTIFIER_LENGTH)
}

/// Checks whether `buf` carries `ident` right after the root offset.
///
/// Identifiers that are not exactly [`FILE_IDENTIFIER_LENGTH`] bytes never match.
#[must_use]
pub fn buffer_has_identifier(buf: &[u8], ident: &str) -> bool {
    ident.len() == FILE_IDENTIFIER_LENGTH && get_identifier(buf) == Some(ident.as_bytes())
}
