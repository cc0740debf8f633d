//! # Address Errors
//!
//! Every recoverable failure of the algebra is returned as one of the
//! types below. Caller bugs (bit indexes past the width of a value,
//! segment indexes past the end of a section) panic instead.

use thiserror::Error;

use crate::bits::{BitCount, SegInt};
use crate::family::Family;

/// The operand's value range cannot satisfy a contiguity requirement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IncompatibleAddressError {
    /// Masking a segment range would produce a non-contiguous set of values.
    #[error("masking [{lower}, {upper}] with {mask:#x} is not a contiguous range")]
    NonContiguousMask {
        lower: SegInt,
        upper: SegInt,
        mask: SegInt,
    },

    /// Reversing the bits or bytes of a range would produce a non-contiguous set.
    #[error("reversing [{lower}, {upper}] is not a contiguous range")]
    NonContiguousReversal { lower: SegInt, upper: SegInt },

    /// Trie ordering is only defined between keys of one width.
    #[error("trie keys differ in bit count: {left} vs {right}")]
    TrieBitCountMismatch { left: BitCount, right: BitCount },

    /// The two operands belong to different address families.
    #[error("cannot combine {left} with {right}")]
    FamilyMismatch { left: Family, right: Family },
}

/// Two operands were expected to have the same number of segments.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("segment count mismatch: expected {expected}, found {actual}")]
pub struct SizeMismatchError {
    pub expected: usize,
    pub actual: usize,
}

/// Construction-time validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressValueError {
    #[error("{actual} bytes cannot fill {segments} segments of {family}")]
    ByteLength {
        family: Family,
        segments: usize,
        actual: usize,
    },

    #[error("prefix length {prefix} exceeds bit count {bit_count}")]
    PrefixTooLong { prefix: BitCount, bit_count: BitCount },

    #[error("segment value {value} exceeds {bit_count} bits")]
    SegmentValueTooLarge { value: SegInt, bit_count: BitCount },

    #[error("segment lower value {lower} is above upper value {upper}")]
    InvertedRange { lower: SegInt, upper: SegInt },

    #[error("{family} sections cannot have {actual} segments")]
    SegmentCount { family: Family, actual: usize },
}

/// Umbrella error for callers that mix operations of several kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error(transparent)]
    Incompatible(#[from] IncompatibleAddressError),

    #[error(transparent)]
    SizeMismatch(#[from] SizeMismatchError),

    #[error(transparent)]
    Value(#[from] AddressValueError),
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
