//! Verifier configuration
//!
//! The verifier's budget bounds the work an untrusted buffer can cause: nesting depth, number of
//! tables visited and the total number of bytes checked. Running out of budget fails the
//! verification like any other defect.

/// Default recursion limit for nested tables.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default limit on the number of tables visited.
pub const DEFAULT_MAX_TABLES: usize = 1_000_000;

/// Default limit on the sum of all verified byte ranges (2 GiB).
pub const DEFAULT_MAX_APPARENT_SIZE: usize = 1 << 31;

/// Configuration for a [`crate::Verifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Maximum nesting depth of tables (default: 64)
    pub max_depth: usize,

    /// Maximum number of tables visited in one verification (default: 1,000,000)
    pub max_tables: usize,

    /// Maximum sum of all verified byte ranges (default: 2 GiB)
    /// Shared sub-objects are counted every time they are reached, so this bounds the work done
    /// on buffers that reference the same data many times
    pub max_apparent_size: usize,

    /// Reject scalars, offsets and structs at positions that are not a multiple of their
    /// alignment (default: true)
    pub check_alignment: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_tables: DEFAULT_MAX_TABLES,
            max_apparent_size: DEFAULT_MAX_APPARENT_SIZE,
            check_alignment: true,
        }
    }
}

impl VerifierConfig {
    /// Creates a configuration for small messages from untrusted peers
    ///
    /// Shallow nesting, few tables and a small work budget.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_depth: 16,
            max_tables: 10_000,
            max_apparent_size: 16 << 20,
            check_alignment: true,
        }
    }

    /// Creates a configuration for large, trusted-but-checked buffers
    ///
    /// Deep nesting and a large budget; alignment is not enforced, which admits buffers written
    /// by producers that pack data more tightly than the builder does.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            max_depth: 256,
            max_tables: usize::MAX,
            max_apparent_size: usize::MAX,
            check_alignment: false,
        }
    }

    /// Returns this configuration with a different recursion limit
    #[must_use]
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_config_presets() {
        let default = VerifierConfig::default();
        assert_eq!(default.max_depth, 64);
        assert_eq!(default.max_tables, 1_000_000);
        assert_eq!(default.max_apparent_size, 1 << 31);
        assert!(default.check_alignment);

        let strict = VerifierConfig::strict();
        assert!(strict.max_depth < default.max_depth);
        assert!(strict.max_tables < default.max_tables);
        assert!(strict.check_alignment);

        let relaxed = VerifierConfig::relaxed();
        assert!(relaxed.max_depth > default.max_depth);
        assert!(!relaxed.check_alignment);
    }

    #[test]
    fn test_with_max_depth() {
        let config = VerifierConfig::strict().with_max_depth(3);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_tables, VerifierConfig::strict().max_tables);
    }
}
