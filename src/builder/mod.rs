//! Serialization of value trees into a single buffer.
//!
//! The [`Builder`] writes bottom-up into a byte arena that grows towards the front: children are
//! written before the parents that reference them, so every offset points forward. The finished
//! buffer is the written suffix of the arena, prefixed with the root offset.
//!
//! # Architecture
//!
//! - **Arena** - `Vec<u8>` with a head cursor; positions are counted from the end so they stay
//!   valid when the arena grows and existing bytes move to the back
//! - **Table frames** - a stack of open tables, each owning a range of recorded field locations
//! - **Vtable cache** - maps exact vtable bytes to the first written copy, see [`BuilderConfig`]
//!
//! # Usage errors
//!
//! Calling `end_table` without a matching `start_table`, writing a slot twice, leaving a required
//! field out, or calling `finish` with a table still open are programming defects and panic.
//! Exceeding [`BuilderConfig::max_size`] is a resource limit and returns
//! [`crate::Error::BufferTooLarge`].
//!
//! # Examples
//!
//! ```rust
//! use tabwire::{Builder, Table, root};
//!
//! let mut builder = Builder::new();
//! let name = builder.create_string("Orc")?;
//! let inventory = builder.create_vector(&[1u8, 2, 3])?;
//!
//! let start = builder.start_table();
//! builder.add_offset(0, name)?;
//! builder.add_offset(1, inventory)?;
//! builder.add_field::<i16>(2, 80, 100)?;
//! let monster = builder.end_table(start)?;
//! builder.required(monster, 0, "name");
//!
//! let data = builder.finish(monster, None)?;
//! let table = root::<Table>(&data)?;
//! assert_eq!(table.get_str(0), Some("Orc"));
//! assert_eq!(table.get_or::<i16>(2, 100), 80);
//! # Ok::<(), tabwire::Error>(())
//! ```

mod config;
mod push;
mod vtable;

pub use config::BuilderConfig;
pub use push::{Push, RawVector, TableFinished, TableUnfinished, UnionWIPOffset, WIPOffset};

use std::any::type_name;

use log::debug;

use crate::{
    file::io::{emplace_scalar, Scalar},
    view::{ForwardsUOffset, Table, Vector},
    wire::{
        field_index_to_offset, padding_bytes, SOffsetT, UOffsetT, FILE_IDENTIFIER_LENGTH,
        MAX_BUFFER_SIZE, SIZE_SOFFSET, SIZE_UOFFSET,
    },
    Error, Result,
};
use vtable::{encode_vtable, FieldLoc, VTableCache};

/// Smallest arena allocated when a builder grows from empty.
const MIN_ARENA: usize = 16;

#[derive(Debug, Clone, Copy)]
struct TableFrame {
    /// Arena position of the table start, counted from the end.
    start: UOffsetT,
    /// Index of this table's first entry in `field_locs`.
    first_field: usize,
}

/// Builds one buffer from a tree of tables, vectors, strings and structs.
///
/// A builder is used by one thread at a time (all methods take `&mut self`) and is consumed by
/// [`Builder::finish`].
#[derive(Debug)]
pub struct Builder {
    buf: Vec<u8>,
    head: usize,
    config: BuilderConfig,
    min_align: usize,
    field_locs: Vec<FieldLoc>,
    frames: Vec<TableFrame>,
    vtables: VTableCache,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    /// Creates a builder with the default configuration and an arena of `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(BuilderConfig {
            initial_capacity: capacity,
            ..BuilderConfig::default()
        })
    }

    /// Creates a builder with the given configuration.
    #[must_use]
    pub fn with_config(mut config: BuilderConfig) -> Self {
        config.max_size = config.max_size.min(MAX_BUFFER_SIZE);
        let capacity = config.initial_capacity.min(config.max_size);
        Builder {
            buf: vec![0; capacity],
            head: capacity,
            config,
            min_align: 1,
            field_locs: Vec::new(),
            frames: Vec::new(),
            vtables: VTableCache::default(),
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn used_space(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Number of distinct vtables written so far.
    #[must_use]
    pub fn vtable_count(&self) -> usize {
        self.vtables.len()
    }

    /// Number of tables that reused an already written vtable.
    #[must_use]
    pub fn vtable_reuse_count(&self) -> usize {
        self.vtables.hits()
    }

    /// Bytes written so far, in their final order.
    #[must_use]
    pub fn unfinished_data(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    /// Discards everything written, keeping the allocated arena.
    pub fn reset(&mut self) {
        self.buf.fill(0);
        self.head = self.buf.len();
        self.min_align = 1;
        self.field_locs.clear();
        self.frames.clear();
        self.vtables.clear();
    }

    /// Opens a table. Fields added until the matching [`Builder::end_table`] belong to it.
    pub fn start_table(&mut self) -> WIPOffset<TableUnfinished> {
        let start = self.used_space() as UOffsetT;
        self.frames.push(TableFrame {
            start,
            first_field: self.field_locs.len(),
        });
        WIPOffset::new(start)
    }

    /// Adds a scalar field, omitting it when it equals `default`.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    ///
    /// # Panics
    /// Panics if no table is open or `slot` was already written in this table.
    pub fn add_field<T: Scalar + Push>(&mut self, slot: u16, value: T, default: T) -> Result<()> {
        if value == default && !self.config.force_defaults {
            self.assert_nested("add_field");
            return Ok(());
        }
        self.push_slot_always(slot, &value)
    }

    /// Adds an offset field pointing to an already finished object.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    ///
    /// # Panics
    /// Panics if no table is open, `slot` was already written in this table, or `target` is the
    /// start of a table that has not been ended.
    pub fn add_offset<T>(&mut self, slot: u16, target: WIPOffset<T>) -> Result<()> {
        assert!(
            type_name::<T>() != type_name::<TableUnfinished>(),
            "add_offset called with an unfinished table; call end_table first"
        );
        self.push_slot_always(slot, &target)
    }

    /// Adds a struct field. Structs are always stored, there is no default to compare against.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    ///
    /// # Panics
    /// Panics if no table is open or `slot` was already written in this table.
    pub fn add_struct<S: Push>(&mut self, slot: u16, value: &S) -> Result<()> {
        self.push_slot_always(slot, value)
    }

    /// Closes the table opened by `start`, writing (or reusing) its vtable.
    ///
    /// # Errors
    /// Returns [`Error::TableTooLarge`] if the table's inline part exceeds 65535 bytes and
    /// [`Error::BufferTooLarge`] if the arena cannot grow.
    ///
    /// # Panics
    /// Panics if `start` is not the innermost open table.
    pub fn end_table(
        &mut self,
        start: WIPOffset<TableUnfinished>,
    ) -> Result<WIPOffset<TableFinished>> {
        let Some(frame) = self.frames.pop() else {
            panic!("end_table called without a matching start_table");
        };
        assert_eq!(
            frame.start,
            start.value(),
            "end_table called with the start of a different table"
        );

        let object_offset = self.push(&(0 as SOffsetT))?;
        let fields = self.field_locs.split_off(frame.first_field);
        // Padding written before the first field belongs to whatever precedes the table.
        let table_end = fields
            .iter()
            .map(FieldLoc::end)
            .min()
            .unwrap_or(object_offset - SIZE_SOFFSET as UOffsetT);
        let table_size = (object_offset - table_end) as usize;
        let Ok(table_size) = u16::try_from(table_size) else {
            return Err(Error::TableTooLarge(table_size));
        };

        let Some(vtable) = encode_vtable(&fields, object_offset, table_size) else {
            return Err(Error::TableTooLarge(usize::from(table_size)));
        };

        let cached = if self.config.dedup_vtables {
            self.vtables.lookup(&vtable)
        } else {
            None
        };
        let vtable_offset = match cached {
            Some(offset) => offset,
            None => {
                let offset = self.push_bytes(&vtable)?;
                if self.config.dedup_vtables {
                    self.vtables.insert(vtable, offset);
                }
                offset
            }
        };

        // Table and vtable positions count from the end, so S = vtable_offset - object_offset.
        let soffset = vtable_offset as i64 - i64::from(object_offset);
        let table_pos = self.buf.len() - object_offset as usize;
        emplace_scalar::<SOffsetT>(&mut self.buf, table_pos, soffset as SOffsetT);

        Ok(WIPOffset::new(object_offset))
    }

    /// Asserts that a finished table has `slot` set.
    ///
    /// Generated table builders call this for every required field before handing out the
    /// finished offset.
    ///
    /// # Panics
    /// Panics with the field name if the field is absent.
    pub fn required(&self, table: WIPOffset<TableFinished>, slot: u16, name: &str) {
        let table_pos = self.buf.len() - table.value() as usize;
        let view = Table::new(&self.buf, table_pos);
        assert!(
            view.vtable().get(field_index_to_offset(slot)) != 0,
            "missing required field `{name}`"
        );
    }

    /// Writes a string with its length prefix and zero terminator.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    pub fn create_string(&mut self, value: &str) -> Result<WIPOffset<&'static str>> {
        let offset = self.create_terminated_bytes(value.as_bytes())?;
        Ok(WIPOffset::new(offset))
    }

    /// Writes a byte string with its length prefix and zero terminator.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    pub fn create_byte_string(&mut self, value: &[u8]) -> Result<WIPOffset<&'static [u8]>> {
        let offset = self.create_terminated_bytes(value)?;
        Ok(WIPOffset::new(offset))
    }

    /// Writes a vector of inline values: scalars, structs or offsets to finished objects.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    pub fn create_vector<T: Push>(
        &mut self,
        items: &[T],
    ) -> Result<WIPOffset<Vector<'static, T::Output>>> {
        self.start_vector(items.len() * T::SIZE, T::ALIGNMENT)?;
        for item in items.iter().rev() {
            self.push(item)?;
        }
        let offset = self.end_vector(items.len())?;
        Ok(WIPOffset::new(offset))
    }

    /// Writes a vector from pre-encoded element bytes.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    ///
    /// # Panics
    /// Panics if `bytes` does not hold exactly `count` elements of `element_size` bytes, or if
    /// `alignment` is not a power of two.
    pub fn create_vector_raw(
        &mut self,
        bytes: &[u8],
        count: usize,
        element_size: usize,
        alignment: usize,
    ) -> Result<WIPOffset<RawVector>> {
        assert_eq!(
            Some(bytes.len()),
            count.checked_mul(element_size),
            "raw vector of {count} elements of {element_size} bytes has {} bytes",
            bytes.len()
        );
        assert!(
            alignment.is_power_of_two(),
            "vector alignment {alignment} is not a power of two"
        );

        self.start_vector(bytes.len(), alignment)?;
        self.push_bytes(bytes)?;
        let offset = self.end_vector(count)?;
        Ok(WIPOffset::new(offset))
    }

    /// Writes every string, then a vector of offsets to them.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    pub fn create_vector_of_strings<S: AsRef<str>>(
        &mut self,
        values: &[S],
    ) -> Result<WIPOffset<Vector<'static, ForwardsUOffset<&'static str>>>> {
        let offsets = values
            .iter()
            .map(|value| self.create_string(value.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.create_vector(&offsets)
    }

    /// Sorts finished tables by their string field in `key_slot`, then writes a vector of them.
    ///
    /// Readers can binary search the result with [`Vector::lookup_by_key`]. Tables without the
    /// key sort first.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    pub fn create_vector_of_sorted_tables(
        &mut self,
        tables: &mut [WIPOffset<TableFinished>],
        key_slot: u16,
    ) -> Result<WIPOffset<Vector<'static, ForwardsUOffset<TableFinished>>>> {
        let buf = &self.buf;
        let key_of = |table: &WIPOffset<TableFinished>| {
            Table::new(buf, buf.len() - table.value() as usize).get_str(key_slot)
        };
        tables.sort_by(|a, b| key_of(a).cmp(&key_of(b)));
        self.create_vector(tables)
    }

    /// Writes the root offset and optional file identifier and returns the finished buffer.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooLarge`] if the arena cannot grow.
    ///
    /// # Panics
    /// Panics if a table is still open or `file_identifier` is not exactly 4 bytes.
    pub fn finish<T>(mut self, root: WIPOffset<T>, file_identifier: Option<&str>) -> Result<Vec<u8>> {
        assert!(
            self.frames.is_empty(),
            "finish called with {} table(s) still open",
            self.frames.len()
        );

        let identifier_len = match file_identifier {
            Some(ident) => {
                assert_eq!(
                    ident.len(),
                    FILE_IDENTIFIER_LENGTH,
                    "file identifier {ident:?} must be exactly {FILE_IDENTIFIER_LENGTH} bytes"
                );
                FILE_IDENTIFIER_LENGTH
            }
            None => 0,
        };

        let alignment = self.min_align.max(SIZE_UOFFSET);
        self.align(SIZE_UOFFSET + identifier_len, alignment)?;
        if let Some(ident) = file_identifier {
            self.push_bytes(ident.as_bytes())?;
        }
        self.push(&root)?;

        debug!(
            "finished buffer of {} bytes with {} vtable(s), {} reused",
            self.used_space(),
            self.vtables.len(),
            self.vtables.hits()
        );

        let head = self.head;
        self.buf.drain(..head);
        Ok(self.buf)
    }

    fn assert_nested(&self, operation: &str) {
        assert!(
            !self.frames.is_empty(),
            "{operation} called outside of start_table/end_table"
        );
    }

    fn push_slot_always<P: Push>(&mut self, slot: u16, value: &P) -> Result<()> {
        self.assert_nested("add_field");
        let first = self.frames.last().map_or(0, |frame| frame.first_field);
        assert!(
            !self.field_locs[first..].iter().any(|field| field.slot == slot),
            "field slot {slot} written twice in the same table"
        );

        let off = self.push(value)?;
        self.field_locs.push(FieldLoc {
            off,
            slot,
            size: P::SIZE as UOffsetT,
        });
        Ok(())
    }

    fn create_terminated_bytes(&mut self, bytes: &[u8]) -> Result<UOffsetT> {
        self.start_vector(bytes.len() + 1, 1)?;
        self.push_bytes(&[0])?;
        self.push_bytes(bytes)?;
        self.end_vector(bytes.len())
    }

    /// Pads so that `len` bytes of data followed by a `u32` length end up aligned for both.
    fn start_vector(&mut self, len: usize, alignment: usize) -> Result<()> {
        self.align(len, SIZE_UOFFSET)?;
        self.align(len, alignment)
    }

    fn end_vector(&mut self, count: usize) -> Result<UOffsetT> {
        let Ok(count) = UOffsetT::try_from(count) else {
            return Err(Error::BufferTooLarge {
                requested: count,
                max: self.config.max_size,
            });
        };
        self.push(&count)
    }

    /// Aligns and writes `value`, returning its from-the-end position.
    fn push<P: Push>(&mut self, value: &P) -> Result<UOffsetT> {
        self.align(P::SIZE, P::ALIGNMENT)?;
        self.make_space(P::SIZE)?;
        let (dst, rest) = self.buf[self.head..].split_at_mut(P::SIZE);
        value.push(dst, rest.len());
        Ok(self.used_space() as UOffsetT)
    }

    /// Writes raw bytes without alignment.
    fn push_bytes(&mut self, bytes: &[u8]) -> Result<UOffsetT> {
        self.make_space(bytes.len())?;
        self.buf[self.head..self.head + bytes.len()].copy_from_slice(bytes);
        Ok(self.used_space() as UOffsetT)
    }

    /// Writes zero padding so that `len` more bytes end on a multiple of `alignment`.
    fn align(&mut self, len: usize, alignment: usize) -> Result<()> {
        self.min_align = self.min_align.max(alignment);
        let padding = padding_bytes(self.used_space() + len, alignment);
        self.make_space(padding)?;
        self.buf[self.head..self.head + padding].fill(0);
        Ok(())
    }

    /// Moves the head `want` bytes towards the front, growing the arena as needed.
    fn make_space(&mut self, want: usize) -> Result<()> {
        self.ensure_capacity(want)?;
        self.head -= want;
        Ok(())
    }

    fn ensure_capacity(&mut self, want: usize) -> Result<()> {
        if want <= self.head {
            return Ok(());
        }

        let used = self.used_space();
        let requested = used.saturating_add(want);
        if requested > self.config.max_size {
            return Err(Error::BufferTooLarge {
                requested,
                max: self.config.max_size,
            });
        }

        let old_len = self.buf.len();
        let mut new_len = old_len.max(MIN_ARENA);
        while new_len < requested {
            new_len = new_len.saturating_mul(2);
        }
        let new_len = new_len.min(self.config.max_size).max(requested);

        // Existing bytes move to the back of the larger arena; the front is zeroed.
        let grown_by = new_len - old_len;
        self.buf.resize(new_len, 0);
        self.buf.copy_within(self.head..old_len, self.head + grown_by);
        self.head += grown_by;
        self.buf[..self.head].fill(0);
        Ok(())
    }
}
