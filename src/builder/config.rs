//! Builder configuration
//!
//! Controls arena sizing, the hard size limit and the two encoding choices a producer can make:
//! whether fields equal to their default are stored, and whether identical vtables are shared.

use crate::wire::MAX_BUFFER_SIZE;

/// Configuration for a [`crate::Builder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Arena size allocated up front (default: 1024)
    pub initial_capacity: usize,

    /// Largest buffer the builder may produce; growing beyond it fails with
    /// [`crate::Error::BufferTooLarge`] (default: [`MAX_BUFFER_SIZE`])
    pub max_size: usize,

    /// Store fields even when they equal their default (default: false)
    /// Useful when readers must be able to tell "set to default" from "absent"
    pub force_defaults: bool,

    /// Share byte-identical vtables between tables (default: true)
    pub dedup_vtables: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_size: MAX_BUFFER_SIZE,
            force_defaults: false,
            dedup_vtables: true,
        }
    }
}

impl BuilderConfig {
    /// Creates a configuration for many small buffers
    ///
    /// Starts with a tiny arena and keeps all size optimizations enabled.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            initial_capacity: 64,
            ..Self::default()
        }
    }

    /// Creates a configuration that stores every field written, defaults included
    #[must_use]
    pub fn force_defaults() -> Self {
        Self {
            force_defaults: true,
            ..Self::default()
        }
    }

    /// Returns this configuration with a different size limit, clamped to what the format can
    /// address
    #[must_use]
    pub fn with_max_size(self, max_size: usize) -> Self {
        Self {
            max_size: max_size.min(MAX_BUFFER_SIZE),
            ..self
        }
    }
}
