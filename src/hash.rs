//! FNV-1 and FNV-1a hashing for fields declared with a hash attribute.
//!
//! A string-keyed field can be stored as the hash of its value instead of the value itself. The
//! algorithm and width are part of the layout metadata, so producer and consumer must agree on
//! [`HashAlgorithm`].
//!
//! # Examples
//!
//! ```rust
//! use tabwire::hash::{fnv1a_32, HashAlgorithm};
//!
//! assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
//! assert_eq!(HashAlgorithm::Fnv1a32.hash(b"a"), 0xe40c_292c);
//! assert_eq!("fnv1a_32".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Fnv1a32);
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

const FNV_32_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_32_PRIME: u32 = 0x0100_0193;
const FNV_64_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_64_PRIME: u64 = 0x0000_0100_0000_01B3;

/// FNV-1, 32 bit.
#[must_use]
pub fn fnv1_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV_32_OFFSET_BASIS, |hash, &byte| {
        hash.wrapping_mul(FNV_32_PRIME) ^ u32::from(byte)
    })
}

/// FNV-1a, 32 bit.
#[must_use]
pub fn fnv1a_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV_32_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_32_PRIME)
    })
}

/// FNV-1, 64 bit.
#[must_use]
pub fn fnv1_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV_64_OFFSET_BASIS, |hash, &byte| {
        hash.wrapping_mul(FNV_64_PRIME) ^ u64::from(byte)
    })
}

/// FNV-1a, 64 bit.
#[must_use]
pub fn fnv1a_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV_64_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_64_PRIME)
    })
}

/// Hash algorithm attached to a field in the layout metadata.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// FNV-1, 32 bit
    #[strum(serialize = "fnv1_32")]
    #[serde(rename = "fnv1_32")]
    Fnv132,
    /// FNV-1a, 32 bit
    #[strum(serialize = "fnv1a_32")]
    #[serde(rename = "fnv1a_32")]
    Fnv1a32,
    /// FNV-1, 64 bit
    #[strum(serialize = "fnv1_64")]
    #[serde(rename = "fnv1_64")]
    Fnv164,
    /// FNV-1a, 64 bit
    #[strum(serialize = "fnv1a_64")]
    #[serde(rename = "fnv1a_64")]
    Fnv1a64,
}

impl HashAlgorithm {
    /// Width of the produced hash in bytes, which must match the field's scalar size.
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            HashAlgorithm::Fnv132 | HashAlgorithm::Fnv1a32 => 4,
            HashAlgorithm::Fnv164 | HashAlgorithm::Fnv1a64 => 8,
        }
    }

    /// Hashes `data`, widening 32-bit results.
    #[must_use]
    pub fn hash(self, data: &[u8]) -> u64 {
        match self {
            HashAlgorithm::Fnv132 => u64::from(fnv1_32(data)),
            HashAlgorithm::Fnv1a32 => u64::from(fnv1a_32(data)),
            HashAlgorithm::Fnv164 => fnv1_64(data),
            HashAlgorithm::Fnv1a64 => fnv1a_64(data),
        }
    }
}
