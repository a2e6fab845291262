use crate::{
    file::io::read_scalar_at,
    view::{root_unchecked, Follow, ForwardsUOffset, Struct, StructView, Vector},
    wire::{field_index_to_offset, SOffsetT, VOffsetT, SIZE_VOFFSET},
};

/// View of a table: a position whose first 4 bytes are the signed offset to its vtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table<'a> {
    buf: &'a [u8],
    loc: usize,
}

impl<'a> Table<'a> {
    /// Creates a view of the table at `loc`.
    #[must_use]
    pub fn new(buf: &'a [u8], loc: usize) -> Self {
        Table { buf, loc }
    }

    /// The buffer this table lives in.
    #[must_use]
    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    /// Position of the table in the buffer.
    #[must_use]
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Returns the vtable describing this table's fields.
    ///
    /// # Panics
    /// Panics if the signed offset points before the start of the buffer.
    #[must_use]
    pub fn vtable(&self) -> VTable<'a> {
        let soffset = read_scalar_at::<SOffsetT>(self.buf, self.loc);
        let Ok(vtable_loc) = usize::try_from(self.loc as i64 - i64::from(soffset)) else {
            panic!("vtable of table at {} lies before the buffer", self.loc);
        };
        VTable::new(self.buf, vtable_loc)
    }

    /// Offset of the field in `slot` from the table start, or 0 if absent.
    #[must_use]
    pub fn field_offset(&self, slot: u16) -> VOffsetT {
        self.vtable().get(field_index_to_offset(slot))
    }

    /// Whether the field in `slot` is stored in the buffer.
    #[must_use]
    pub fn has_field(&self, slot: u16) -> bool {
        self.field_offset(slot) != 0
    }

    /// Reads the field in `slot` as wire type `T`, or `None` if absent.
    #[must_use]
    pub fn get<T: Follow<'a>>(&self, slot: u16) -> Option<T::Inner> {
        match self.field_offset(slot) {
            0 => None,
            offset => Some(T::follow(self.buf, self.loc + usize::from(offset))),
        }
    }

    /// Reads the field in `slot`, falling back to `default` if absent.
    #[must_use]
    pub fn get_or<T: Follow<'a>>(&self, slot: u16, default: T::Inner) -> T::Inner {
        self.get::<T>(slot).unwrap_or(default)
    }

    /// Reads a string field.
    #[must_use]
    pub fn get_str(&self, slot: u16) -> Option<&'a str> {
        self.get::<ForwardsUOffset<&str>>(slot)
    }

    /// Reads a sub-table field.
    #[must_use]
    pub fn get_table(&self, slot: u16) -> Option<Table<'a>> {
        self.get::<ForwardsUOffset<Table>>(slot)
    }

    /// Reads a vector field.
    #[must_use]
    pub fn get_vector<T: Follow<'a> + 'a>(&self, slot: u16) -> Option<Vector<'a, T>> {
        self.get::<ForwardsUOffset<Vector<'a, T>>>(slot)
    }

    /// Copies a struct field out of the buffer.
    #[must_use]
    pub fn get_struct<S: Struct>(&self, slot: u16) -> Option<S> {
        self.struct_view(slot, S::SIZE).map(|view| view.to_struct())
    }

    /// Borrows the `size` bytes of a struct field.
    #[must_use]
    pub fn struct_view(&self, slot: u16, size: usize) -> Option<StructView<'a>> {
        match self.field_offset(slot) {
            0 => None,
            offset => Some(StructView::new(
                self.buf,
                self.loc + usize::from(offset),
                size,
            )),
        }
    }

    /// Reads a union stored as a discriminant in `tag_slot` and a table in `value_slot`.
    ///
    /// Returns `None` for the `NONE` discriminant (0) and when either half is missing.
    #[must_use]
    pub fn get_union(&self, tag_slot: u16, value_slot: u16) -> Option<(u8, Table<'a>)> {
        let tag = self.get::<u8>(tag_slot)?;
        if tag == 0 {
            return None;
        }
        self.get_table(value_slot).map(|table| (tag, table))
    }

    /// Reads the root of a complete buffer nested inside a `[ubyte]` field.
    #[must_use]
    pub fn get_nested_root<T: Follow<'a>>(&self, slot: u16) -> Option<T::Inner> {
        let bytes = self.get::<ForwardsUOffset<&[u8]>>(slot)?;
        Some(root_unchecked::<T>(bytes))
    }
}

impl<'a> Follow<'a> for Table<'a> {
    type Inner = Table<'a>;

    const INLINE_SIZE: usize = crate::wire::SIZE_UOFFSET;

    fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Table::new(buf, loc)
    }
}

/// View of a vtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VTable<'a> {
    buf: &'a [u8],
    loc: usize,
}

impl<'a> VTable<'a> {
    /// Creates a view of the vtable at `loc`.
    #[must_use]
    pub fn new(buf: &'a [u8], loc: usize) -> Self {
        VTable { buf, loc }
    }

    /// Position of the vtable in the buffer.
    #[must_use]
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Size of the vtable in bytes, header included.
    #[must_use]
    pub fn num_bytes(&self) -> usize {
        usize::from(read_scalar_at::<VOffsetT>(self.buf, self.loc))
    }

    /// Size of the owning table's inline part in bytes.
    #[must_use]
    pub fn object_inline_num_bytes(&self) -> usize {
        usize::from(read_scalar_at::<VOffsetT>(self.buf, self.loc + SIZE_VOFFSET))
    }

    /// Number of slots the vtable covers.
    #[must_use]
    pub fn num_fields(&self) -> usize {
        (self.num_bytes() / SIZE_VOFFSET).saturating_sub(2)
    }

    /// Entry at vtable byte position `byte_loc`. Positions past the end read as 0 (absent),
    /// which is how tables written with an older, shorter layout stay readable.
    #[must_use]
    pub fn get(&self, byte_loc: VOffsetT) -> VOffsetT {
        if usize::from(byte_loc) + SIZE_VOFFSET > self.num_bytes() {
            return 0;
        }
        read_scalar_at::<VOffsetT>(self.buf, self.loc + usize::from(byte_loc))
    }

    /// Entry for 0-based slot `slot`.
    #[must_use]
    pub fn get_field(&self, slot: u16) -> VOffsetT {
        self.get(field_index_to_offset(slot))
    }

    /// Raw bytes of the vtable.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.buf[self.loc..self.loc + self.num_bytes()]
    }
}
