//! Buffer loading and raw byte access.
//!
//! This module abstracts over where a serialized buffer lives. A buffer received over the network
//! is usually already in memory, while a buffer stored on disk is best memory-mapped so that
//! verification and reads never copy it. Both cases end up behind the same [`File`] type.
//!
//! # Key Components
//!
//! - [`File`] - A loaded buffer with header helpers (root offset, file identifier) and
//!   verified root access
//! - [`Backend`] - Trait for different data sources (disk files, memory buffers)
//! - [`io`] - Little-endian scalar reading and writing shared by the whole crate
//!
//! # Examples
//!
//! ## Loading from Memory
//!
//! ```rust
//! use tabwire::{Builder, File, Table};
//!
//! let mut builder = Builder::new();
//! let start = builder.start_table();
//! builder.add_field::<u32>(0, 7, 0)?;
//! let root = builder.end_table(start)?;
//! let data = builder.finish(root, Some("DEMO"))?;
//!
//! let file = File::from_mem(data)?;
//! assert!(file.has_identifier("DEMO"));
//!
//! let table = file.root::<Table>()?;
//! assert_eq!(table.get::<u32>(0), Some(7));
//! # Ok::<(), tabwire::Error>(())
//! ```
//!
//! ## Loading from Disk
//!
//! ```rust,no_run
//! use tabwire::{File, Table};
//!
//! let file = File::from_file("monster.bin")?;
//! println!("{} bytes, root at {}", file.len(), file.root_offset()?);
//! file.verify::<Table>(&tabwire::VerifierConfig::strict())?;
//! # Ok::<(), tabwire::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`File`] is `Send` and `Sync`. Verification and reads only borrow the bytes, so one loaded
//! buffer can be shared across threads for concurrent access.

pub mod io;

mod memory;
mod physical;

pub use memory::Memory;
pub use physical::Physical;

use std::path::Path;

use crate::{
    verifier::{self, Verifiable, VerifierConfig},
    view::Follow,
    wire::{self, FILE_IDENTIFIER_LENGTH, SIZE_UOFFSET},
    Error::{Empty, RangeOutOfBounds},
    Result,
};

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of buffer data, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe.
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the entire data buffer for writing, if the backend allows it.
    ///
    /// Memory-mapped files are read-only and return `None`.
    fn data_mut(&mut self) -> Option<&mut [u8]>;

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;

    /// Consumes the backend and returns an owned copy of its data.
    fn into_data(self: Box<Self>) -> Vec<u8>;
}

/// A serialized buffer loaded from disk or memory.
///
/// Loading only checks that the buffer is large enough to hold a root offset. Everything beyond
/// that is the job of the verifier, which [`File::verify`] and [`File::root`] run on demand.
#[derive(Debug)]
pub struct File {
    data: Box<dyn Backend>,
}

impl File {
    /// Loads a buffer from disk by memory-mapping it.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, [`crate::Error::Empty`]
    /// for an empty file, and [`crate::Error::RangeOutOfBounds`] if the file is too short to
    /// hold a root offset.
    pub fn from_file(path: impl AsRef<Path>) -> Result<File> {
        let physical = Physical::new(path)?;
        Self::load(Box::new(physical))
    }

    /// Loads a buffer from an already opened [`std::fs::File`].
    ///
    /// # Errors
    /// See [`File::from_file`].
    pub fn from_std_file(file: &std::fs::File) -> Result<File> {
        let physical = Physical::from_std_file(file)?;
        Self::load(Box::new(physical))
    }

    /// Loads a buffer that is already in memory, taking ownership of it.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty buffer and
    /// [`crate::Error::RangeOutOfBounds`] if it is too short to hold a root offset.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(Box::new(Memory::new(data)))
    }

    fn load(data: Box<dyn Backend>) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        if data.len() < SIZE_UOFFSET {
            return Err(RangeOutOfBounds {
                position: 0,
                size: SIZE_UOFFSET,
            });
        }

        Ok(File { data })
    }

    /// Returns the total size of the buffer in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no bytes. Never the case for a loaded file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the raw bytes of the buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a bounds-checked slice of the buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range leaves the buffer.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Returns the raw bytes for writing, or `None` for a read-only memory mapping.
    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        self.data.data_mut()
    }

    /// Consumes the file and returns its bytes, copying them out of a memory mapping if needed.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data.into_data()
    }

    /// Reads the root offset from the buffer header.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header is truncated.
    pub fn root_offset(&self) -> Result<u32> {
        io::read_le::<u32>(self.data.data())
    }

    /// Returns the 4-byte file identifier slot, if the buffer is long enough to have one.
    ///
    /// Whether the slot actually holds an identifier depends on the producer; compare it with
    /// [`File::has_identifier`] rather than trusting it blindly.
    #[must_use]
    pub fn identifier(&self) -> Option<&[u8]> {
        wire::get_identifier(self.data.data())
    }

    /// Checks whether the buffer carries the given file identifier.
    #[must_use]
    pub fn has_identifier(&self, ident: &str) -> bool {
        wire::buffer_has_identifier(self.data.data(), ident)
    }

    /// Verifies the buffer as a root of type `T`.
    ///
    /// # Errors
    /// Returns the first verification failure.
    pub fn verify<T: Verifiable>(&self, config: &VerifierConfig) -> Result<()> {
        verifier::verify_root_with_opts::<T>(config, self.data.data())
    }

    /// Verifies the buffer with the default configuration and returns its root view.
    ///
    /// # Errors
    /// Returns the first verification failure.
    pub fn root<'a, T>(&'a self) -> Result<T::Inner>
    where
        T: Follow<'a> + Verifiable + 'a,
    {
        verifier::root::<T>(self.data.data())
    }

    /// Verifies the buffer including its file identifier and returns its root view.
    ///
    /// # Errors
    /// Returns [`crate::Error::IdentifierMismatch`] if the identifier differs, otherwise the
    /// first verification failure.
    pub fn root_with_identifier<'a, T>(&'a self, ident: &str) -> Result<T::Inner>
    where
        T: Follow<'a> + Verifiable + 'a,
    {
        debug_assert_eq!(ident.len(), FILE_IDENTIFIER_LENGTH);
        verifier::root_with_identifier::<T>(self.data.data(), ident)
    }
}
