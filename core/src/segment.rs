//! # Segment Ranges
//!
//! A [`SegmentRange`] is the `[lower, upper]` pair of values one fixed
//! position of an address can take: an IPv4 octet, an IPv6 hextet or a
//! MAC byte. Sections are built from an ordered list of these.

use addrkit_common::bits::{self, BitCount, SegInt};
use addrkit_common::error::{AddressValueError, IncompatibleAddressError};

/// Inclusive range of values for one segment, together with its bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentRange {
    lower: SegInt,
    upper: SegInt,
    bit_count: BitCount,
}

impl SegmentRange {
    /// Validates the bounds against the bit width.
    pub fn new(lower: SegInt, upper: SegInt, bit_count: BitCount) -> Result<Self, AddressValueError> {
        let max = bits::max_value(bit_count);
        if upper > max {
            return Err(AddressValueError::SegmentValueTooLarge {
                value: upper,
                bit_count,
            });
        }
        if lower > upper {
            return Err(AddressValueError::InvertedRange { lower, upper });
        }
        Ok(Self {
            lower,
            upper,
            bit_count,
        })
    }

    pub fn single(value: SegInt, bit_count: BitCount) -> Result<Self, AddressValueError> {
        Self::new(value, value, bit_count)
    }

    /// Every value of the given width.
    pub fn full(bit_count: BitCount) -> Self {
        Self {
            lower: 0,
            upper: bits::max_value(bit_count),
            bit_count,
        }
    }

    /// Caller guarantees `lower <= upper <= max`.
    pub(crate) fn from_bounds(lower: SegInt, upper: SegInt, bit_count: BitCount) -> Self {
        debug_assert!(lower <= upper && upper <= bits::max_value(bit_count));
        Self {
            lower,
            upper,
            bit_count,
        }
    }

    pub fn lower(&self) -> SegInt {
        self.lower
    }

    pub fn upper(&self) -> SegInt {
        self.upper
    }

    pub fn bit_count(&self) -> BitCount {
        self.bit_count
    }

    pub fn max_value(&self) -> SegInt {
        bits::max_value(self.bit_count)
    }

    pub fn is_multiple(&self) -> bool {
        self.lower != self.upper
    }

    pub fn count(&self) -> u64 {
        u64::from(self.upper - self.lower) + 1
    }

    /// Number of distinct values of the top `prefix` bits.
    pub fn prefix_count(&self, prefix: BitCount) -> u64 {
        if prefix >= self.bit_count {
            return self.count();
        }
        let shift = self.bit_count - prefix;
        u64::from((self.upper >> shift) - (self.lower >> shift)) + 1
    }

    pub fn includes_zero(&self) -> bool {
        self.lower == 0
    }

    pub fn includes_max(&self) -> bool {
        self.upper == self.max_value()
    }

    pub fn is_full_range(&self) -> bool {
        self.includes_zero() && self.includes_max()
    }

    pub fn contains_value(&self, value: SegInt) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn contains(&self, other: &SegmentRange) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }

    pub fn overlaps(&self, other: &SegmentRange) -> bool {
        other.lower <= self.upper && other.upper >= self.lower
    }

    pub fn intersect(&self, other: &SegmentRange) -> Option<SegmentRange> {
        let lower = self.lower.max(other.lower);
        let upper = self.upper.min(other.upper);
        (lower <= upper).then(|| Self::from_bounds(lower, upper, self.bit_count))
    }

    /// Containment restricted to the top `prefix` bits of both ranges.
    pub fn prefix_contains(&self, other: &SegmentRange, prefix: BitCount) -> bool {
        let shift = self.bit_count - prefix.min(self.bit_count);
        let (lower, upper) = (self.lower >> shift, self.upper >> shift);
        lower <= other.lower >> shift && other.upper >> shift <= upper
    }

    /// Equality restricted to the top `prefix` bits of both ranges.
    pub fn prefix_equal(&self, other: &SegmentRange, prefix: BitCount) -> bool {
        let shift = self.bit_count - prefix.min(self.bit_count);
        self.lower >> shift == other.lower >> shift && self.upper >> shift == other.upper >> shift
    }

    pub fn contains_prefix_block(&self, prefix: BitCount) -> bool {
        bits::is_prefix_block(self.lower, self.upper, prefix, self.bit_count)
    }

    pub fn contains_single_prefix_block(&self, prefix: BitCount) -> bool {
        bits::is_single_prefix_block(self.lower, self.upper, prefix, self.bit_count)
    }

    pub fn min_prefix_len_for_block(&self) -> BitCount {
        bits::min_prefix_len_for_block(self.lower, self.upper, self.bit_count)
    }

    pub fn prefix_len_for_single_block(&self) -> Option<BitCount> {
        bits::prefix_len_for_single_block(self.lower, self.upper, self.bit_count)
    }

    /// Widens the range to the blocks of the given prefix it touches.
    pub fn to_prefix_block(&self, prefix: BitCount) -> Self {
        let host = bits::host_mask(prefix, self.bit_count);
        Self::from_bounds(self.lower & !host, self.upper | host, self.bit_count)
    }

    /// Whether bit `n` of the lower value is set, counting from the least
    /// significant bit.
    ///
    /// # Panics
    ///
    /// If `n` is not below the bit count.
    pub fn test_bit(&self, n: BitCount) -> bool {
        assert!(
            n < self.bit_count,
            "bit index {n} out of range for {} bits",
            self.bit_count
        );
        self.lower & (1 << n) != 0
    }

    /// Whether bit `index` of the lower value is set, counting from the
    /// most significant bit.
    ///
    /// # Panics
    ///
    /// If `index` is not below the bit count.
    pub fn is_one_bit(&self, index: BitCount) -> bool {
        assert!(
            index < self.bit_count,
            "bit index {index} out of range for {} bits",
            self.bit_count
        );
        self.test_bit(self.bit_count - index - 1)
    }

    /// Length of the run of `ones` (or zeros) at the top of the lower value.
    pub fn leading_bit_count(&self, ones: bool) -> BitCount {
        let value = (if ones { !self.lower } else { self.lower }) & self.max_value();
        if value == 0 {
            return self.bit_count;
        }
        value.leading_zeros() - (SegInt::BITS - self.bit_count)
    }

    /// Length of the run of `ones` (or zeros) at the bottom of the lower value.
    pub fn trailing_bit_count(&self, ones: bool) -> BitCount {
        let run = if ones {
            self.lower.trailing_ones()
        } else {
            self.lower.trailing_zeros()
        };
        run.min(self.bit_count)
    }

    pub fn matching_bits(&self, other: &SegmentRange) -> BitCount {
        bits::matching_bits(self.lower, other.lower, self.bit_count)
    }

    pub fn mask(&self, mask: SegInt) -> Result<Self, IncompatibleAddressError> {
        let (lower, upper) = bits::mask_range(self.lower, self.upper, mask, self.bit_count)?;
        Ok(Self::from_bounds(lower, upper, self.bit_count))
    }

    pub fn bitwise_or(&self, mask: SegInt) -> Result<Self, IncompatibleAddressError> {
        let (lower, upper) = bits::or_range(self.lower, self.upper, mask, self.bit_count)?;
        Ok(Self::from_bounds(lower, upper, self.bit_count))
    }

    pub fn reverse_bits(&self) -> Result<Self, IncompatibleAddressError> {
        self.reversed(|v| bits::reverse_bits(v, self.bit_count))
    }

    /// Bit reversal applied to each byte separately.
    pub fn reverse_bits_per_byte(&self) -> Result<Self, IncompatibleAddressError> {
        self.reversed(|v| {
            let mut out = 0;
            let mut shift = 0;
            while shift < self.bit_count {
                let byte = (v >> shift) & 0xff;
                out |= bits::reverse_bits(byte, 8) << shift;
                shift += 8;
            }
            out
        })
    }

    pub fn reverse_bytes(&self) -> Result<Self, IncompatibleAddressError> {
        self.reversed(|v| bits::reverse_bytes(v, self.bit_count))
    }

    // a reversed range is a range only if it was a single value or every value
    fn reversed(&self, f: impl Fn(SegInt) -> SegInt) -> Result<Self, IncompatibleAddressError> {
        if !self.is_multiple() {
            let value = f(self.lower);
            return Ok(Self::from_bounds(value, value, self.bit_count));
        }
        if self.is_full_range() {
            return Ok(*self);
        }
        Err(IncompatibleAddressError::NonContiguousReversal {
            lower: self.lower,
            upper: self.upper,
        })
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
