//! Vtable encoding and the per-builder deduplication cache.

use std::collections::HashMap;

use log::trace;

use crate::{
    file::io::emplace_scalar,
    wire::{field_index_to_offset, vtable_size, UOffsetT, VOffsetT},
};

/// A field written into the table currently being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldLoc {
    /// Arena position of the field, counted from the end.
    pub off: UOffsetT,
    /// 0-based field slot.
    pub slot: u16,
    /// Inline size of the field in bytes.
    pub size: UOffsetT,
}

impl FieldLoc {
    /// Position of the field's last byte boundary, counted from the end.
    pub fn end(&self) -> UOffsetT {
        self.off - self.size
    }
}

/// Encodes the vtable for a table whose soffset ends `object_offset` bytes from the end.
///
/// Returns `None` if the vtable itself would not fit its own 16-bit size field.
pub(crate) fn encode_vtable(
    fields: &[FieldLoc],
    object_offset: UOffsetT,
    table_size: VOffsetT,
) -> Option<Vec<u8>> {
    let max_slot = fields.iter().map(|field| field.slot).max();
    let len = vtable_size(max_slot);
    let len_field = VOffsetT::try_from(len).ok()?;

    let mut vtable = vec![0u8; len];
    emplace_scalar::<VOffsetT>(&mut vtable, 0, len_field);
    emplace_scalar::<VOffsetT>(&mut vtable, 2, table_size);
    for field in fields {
        let entry = VOffsetT::try_from(object_offset - field.off).ok()?;
        emplace_scalar::<VOffsetT>(
            &mut vtable,
            usize::from(field_index_to_offset(field.slot)),
            entry,
        );
    }

    Some(vtable)
}

/// Maps exact vtable bytes to the first written copy of them.
///
/// Only the first table with a given shape writes its vtable; later tables reuse that copy.
#[derive(Debug, Default)]
pub(crate) struct VTableCache {
    written: HashMap<Box<[u8]>, UOffsetT>,
    hits: usize,
}

impl VTableCache {
    pub fn lookup(&mut self, vtable: &[u8]) -> Option<UOffsetT> {
        let found = self.written.get(vtable).copied();
        if let Some(offset) = found {
            self.hits += 1;
            trace!("reusing vtable of {} bytes at {offset}", vtable.len());
        }
        found
    }

    pub fn insert(&mut self, vtable: Vec<u8>, offset: UOffsetT) {
        self.written.entry(vtable.into_boxed_slice()).or_insert(offset);
    }

    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn clear(&mut self) {
        self.written.clear();
        self.hits = 0;
    }
}
