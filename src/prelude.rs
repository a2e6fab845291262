//! # tabwire Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the tabwire library. Import it to get quick access to everything needed for building,
//! verifying and reading buffers.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all tabwire operations
pub use crate::Error;

/// The result type used throughout tabwire
pub use crate::Result;

// ================================================================================================
// Building
// ================================================================================================

/// Back-to-front buffer builder and its configuration
pub use crate::{Builder, BuilderConfig};

/// Offsets handed out by the builder and the markers that type them
pub use crate::{TableFinished, UnionWIPOffset, WIPOffset};

/// Values the builder writes inline
pub use crate::Push;

// ================================================================================================
// Verification
// ================================================================================================

/// Verifier, its configuration and the trait verifiable wire types implement
pub use crate::{Verifiable, Verifier, VerifierConfig};

/// Verify-then-read entry points
pub use crate::{root, root_mut, root_with_identifier, verify_root, verify_root_with_opts};

// ================================================================================================
// Reading and Mutation
// ================================================================================================

/// Zero-copy views
pub use crate::{Follow, ForwardsUOffset, Struct, StructView, Table, Vector};

/// In-place mutation of present scalars
pub use crate::{StructViewMut, TableMut, VectorMut};

// ================================================================================================
// Loading and Layout Metadata
// ================================================================================================

/// Buffers loaded from memory or memory-mapped files
pub use crate::File;

/// Runtime layout metadata
pub use crate::Schema;
