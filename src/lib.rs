// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # tabwire
//!
//! A compact, zero-copy binary serialization engine for schema-described hierarchical data.
//!
//! A producer writes nested records ("tables"), fixed-layout aggregates ("structs"), vectors
//! and strings into one contiguous little-endian byte buffer with the [`Builder`]. A consumer
//! that received the buffer from an untrusted source checks it once with the [`Verifier`], then
//! reads any field directly from the bytes through views such as [`Table`] and [`Vector`],
//! without parsing or copying. Fixed-size scalars already present in a buffer can be
//! overwritten in place.
//!
//! ## Features
//!
//! - **📦 Zero-copy reads** - Views borrow the buffer; nothing is decoded up front
//! - **🗜️ Compact tables** - Fields equal to their default are omitted, identical vtables are shared
//! - **🛡️ Bounded verification** - Every offset, length and alignment is checked against
//!   configurable depth, table and size budgets
//! - **🔧 Runtime layouts** - A JSON [`Schema`] drives verification and JSON rendering
//!   without generated code
//! - **⚡ Parallel batches** - Many buffers verify concurrently with [`verify_batch`]
//!
//! ## Quick Start
//!
//! ```rust
//! use tabwire::prelude::*;
//!
//! // Write a table with a string and two scalars.
//! let mut builder = Builder::new();
//! let name = builder.create_string("Orc")?;
//! let start = builder.start_table();
//! builder.add_offset(0, name)?;
//! builder.add_field::<i16>(1, 300, 150)?;
//! builder.add_field::<i16>(2, 100, 100)?; // equal to its default, so omitted
//! let monster = builder.end_table(start)?;
//! let data = builder.finish(monster, Some("MONS"))?;
//!
//! // Verify once, then read in place.
//! let table = root_with_identifier::<Table>(&data, "MONS")?;
//! assert_eq!(table.get_str(0), Some("Orc"));
//! assert_eq!(table.get_or::<i16>(1, 150), 300);
//! assert_eq!(table.get_or::<i16>(2, 100), 100);
//! assert!(!table.has_field(2));
//! # Ok::<(), tabwire::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`wire`] - Offset types, sizes and the header layout shared by every component
//! - [`builder`] - Back-to-front serialization with vtable deduplication
//! - [`verifier`] - Bounded structural validation of untrusted buffers
//! - [`view`] - Typed zero-copy accessors and in-place mutation
//! - [`schema`] - Layout metadata, layout-driven verification and JSON rendering
//! - [`hash`] - FNV hashes for hashed key fields
//! - [`file`] - Loading buffers from memory or memory-mapped files
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result). Verification errors carry the
//! field path that led to the defect:
//!
//! ```rust
//! use tabwire::{Error, Table, verify_root};
//!
//! match verify_root::<Table>(&[0, 0, 0, 0]) {
//!     Err(Error::NullOffset { position }) => println!("null root offset at {position}"),
//!     Err(err) => println!("invalid buffer: {err} (in {:?})", err.field_path()),
//!     Ok(()) => unreachable!(),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! cargo +nightly fuzz run verify --release
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Loading finished buffers from memory or from memory-mapped files.
///
/// [`File`] owns the bytes of one buffer and hands out verified root views. The
/// [`file::io`] submodule holds the little-endian scalar layer every other module reads and
/// writes through.
pub mod file;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use tabwire::prelude::*;
///
/// let mut builder = Builder::new();
/// let start = builder.start_table();
/// let root = builder.end_table(start)?;
/// let data = builder.finish(root, None)?;
/// assert!(tabwire::root::<Table>(&data).is_ok());
/// # Ok::<(), tabwire::Error>(())
/// ```
pub mod prelude;

pub mod builder;
pub mod hash;
pub mod schema;
pub mod verifier;
pub mod view;
pub mod wire;

/// `tabwire` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `tabwire` Error type
///
/// See [`error::Error`](Error) for the categories of failures.
pub use error::Error;

pub use builder::{
    Builder, BuilderConfig, Push, RawVector, TableFinished, TableUnfinished, UnionWIPOffset,
    WIPOffset,
};
pub use file::{io::Scalar, File};
pub use schema::Schema;
pub use verifier::{
    root, root_mut, root_with_identifier, root_with_opts, verify_batch, verify_root,
    verify_root_with_identifier, verify_root_with_opts, TableVerifier, Verifiable, Verifier,
    VerifierConfig,
};
pub use view::{
    root_mut_unchecked, root_unchecked, Follow, ForwardsUOffset, Struct, StructView,
    StructViewMut, Table, TableMut, VTable, Vector, VectorIter, VectorMut,
};
