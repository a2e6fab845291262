use std::{cmp::Ordering, fmt, iter::FusedIterator, marker::PhantomData};

use crate::{
    file::io::read_scalar_at,
    view::Follow,
    wire::{UOffsetT, SIZE_UOFFSET},
};

/// View of a length-prefixed vector whose elements have wire type `T`.
///
/// Inline elements (scalars, structs) are read in place at `data + i * size`; offset elements
/// (strings, tables, vectors) use `T = ForwardsUOffset<..>` and are followed on access.
pub struct Vector<'a, T> {
    buf: &'a [u8],
    loc: usize,
    phantom: PhantomData<T>,
}

impl<'a, T> Clone for Vector<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Vector<'a, T> {}

impl<'a, T> fmt::Debug for Vector<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("loc", &self.loc)
            .field("len", &self.len())
            .finish()
    }
}

impl<'a, T> Vector<'a, T> {
    /// Creates a view of the vector whose length prefix is at `loc`.
    #[must_use]
    pub fn new(buf: &'a [u8], loc: usize) -> Self {
        Vector {
            buf,
            loc,
            phantom: PhantomData,
        }
    }

    /// Position of the length prefix.
    #[must_use]
    pub fn loc(&self) -> usize {
        self.loc
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
}

impl<'a, T: Follow<'a> + 'a> Vector<'a, T> {
    /// Reads element `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= len()`.
    #[must_use]
    pub fn get(&self, idx: usize) -> T::Inner {
        let len = self.len();
        assert!(idx < len, "index {idx} out of range for vector of length {len}");
        T::follow(self.buf, self.loc + SIZE_UOFFSET + idx * T::INLINE_SIZE)
    }

    /// Iterates over all elements.
    #[must_use]
    pub fn iter(&self) -> VectorIter<'a, T> {
        VectorIter::new(*self)
    }

    /// The element bytes, without the length prefix.
    ///
    /// For a `[ubyte]` vector this is the payload itself, e.g. a nested buffer.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        let start = self.loc + SIZE_UOFFSET;
        &self.buf[start..start + self.len() * T::INLINE_SIZE]
    }

    /// Binary searches a vector sorted by key.
    ///
    /// `compare` orders an element against the key, as generated `key_compare_with_value`
    /// methods do.
    pub fn lookup_by_key<K: ?Sized>(
        &self,
        key: &K,
        compare: impl Fn(&T::Inner, &K) -> Ordering,
    ) -> Option<T::Inner> {
        let mut low = 0;
        let mut high = self.len();
        while low < high {
            let mid = low + (high - low) / 2;
            let element = self.get(mid);
            match compare(&element, key) {
                Ordering::Equal => return Some(element),
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid,
            }
        }
        None
    }
}

impl<'a, T: 'a> Follow<'a> for Vector<'a, T> {
    type Inner = Vector<'a, T>;

    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Vector::new(buf, loc)
    }
}

impl<'a, T: Follow<'a> + 'a> IntoIterator for Vector<'a, T> {
    type Item = T::Inner;
    type IntoIter = VectorIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of a [`Vector`].
pub struct VectorIter<'a, T> {
    buf: &'a [u8],
    loc: usize,
    remaining: usize,
    phantom: PhantomData<T>,
}

impl<'a, T: Follow<'a> + 'a> VectorIter<'a, T> {
    fn new(vector: Vector<'a, T>) -> Self {
        VectorIter {
            buf: vector.buf,
            loc: vector.loc + SIZE_UOFFSET,
            remaining: vector.len(),
            phantom: PhantomData,
        }
    }
}

impl<'a, T: Follow<'a> + 'a> Iterator for VectorIter<'a, T> {
    type Item = T::Inner;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = T::follow(self.buf, self.loc);
        self.loc += T::INLINE_SIZE;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Follow<'a> + 'a> DoubleEndedIterator for VectorIter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(T::follow(
            self.buf,
            self.loc + self.remaining * T::INLINE_SIZE,
        ))
    }
}

impl<'a, T: Follow<'a> + 'a> ExactSizeIterator for VectorIter<'a, T> {}

impl<'a, T: Follow<'a> + 'a> FusedIterator for VectorIter<'a, T> {}
