//! Physical file backend for memory-mapped I/O.
//!
//! [`Physical`] maps a serialized buffer straight from disk into the address space. Reads and
//! verification then work on the mapping without copying the file, which is the main reason
//! the format is laid out for zero-copy access in the first place.
//!
//! The mapping is read-only. Callers that want to mutate scalars in place convert the file into
//! an owned buffer first (see [`crate::file::File::into_data`]).

use super::Backend;
use crate::Result;

use memmap2::Mmap;
use std::{fs, path::Path};

/// A file backend that uses memory-mapped I/O for efficient access to files on disk.
///
/// # Examples
///
/// ```rust,ignore
/// use tabwire::file::{Physical, Backend};
/// use std::path::Path;
///
/// let physical = Physical::new(Path::new("monster.bin"))?;
/// let header = physical.data_slice(0, 4)?;
/// # Ok::<(), tabwire::Error>(())
/// ```
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Create a new physical file backend by memory-mapping the specified file.
    ///
    /// # Arguments
    /// * `path` - Path to the buffer on disk
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path)?;
        Self::from_std_file(&file)
    }

    /// Creates a new physical file backend from an opened [`std::fs::File`].
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if memory mapping fails.
    pub fn from_std_file(file: &fs::File) -> Result<Physical> {
        // SAFETY: the mapping is read-only; the usual caveat applies that another process
        // truncating the file while it is mapped is outside of our control.
        let mmap = unsafe { Mmap::map(file) }?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        if offset_end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn data_mut(&mut self) -> Option<&mut [u8]> {
        None
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn into_data(self: Box<Self>) -> Vec<u8> {
        self.data.as_ref().to_vec()
    }
}
