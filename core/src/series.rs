//! # Segment Series
//!
//! The capability shared by every ordered run of segments: sections and
//! addresses. Implementors supply the segments, the family and the
//! prefix length; the prefix-block algebra, bit tests and numeric
//! accessors come for free.

use addrkit_common::bits::{self, BitCount, SegInt};
use addrkit_common::family::Family;

use crate::block;
use crate::segment::SegmentRange;

pub trait SegmentSeries {
    fn family(&self) -> Family;

    fn segment_count(&self) -> usize;

    /// # Panics
    ///
    /// If `index` is not below the segment count.
    fn segment(&self, index: usize) -> SegmentRange;

    fn prefix_len(&self) -> Option<BitCount>;

    fn bits_per_segment(&self) -> BitCount {
        self.family().bits_per_segment()
    }

    fn bit_count(&self) -> BitCount {
        self.segment_count() as BitCount * self.bits_per_segment()
    }

    fn is_multiple(&self) -> bool {
        (0..self.segment_count()).any(|i| self.segment(i).is_multiple())
    }

    fn is_prefixed(&self) -> bool {
        self.prefix_len().is_some()
    }

    fn contains_prefix_block(&self, prefix: BitCount) -> bool {
        block::contains_prefix_block(self.segment_count(), self.bits_per_segment(), prefix, |i| {
            let s = self.segment(i);
            (s.lower(), s.upper())
        })
    }

    fn contains_single_prefix_block(&self, prefix: BitCount) -> bool {
        block::contains_single_prefix_block(self.segment_count(), self.bits_per_segment(), prefix, |i| {
            let s = self.segment(i);
            (s.lower(), s.upper())
        })
    }

    /// Smallest prefix length for which this series is a union of prefix blocks.
    ///
    /// `1.2.*.*` gives 16, `1.2.*.4` gives 32.
    fn min_prefix_len_for_block(&self) -> BitCount {
        block::min_prefix_len_for_block(self.segment_count(), self.bits_per_segment(), |i| {
            let s = self.segment(i);
            (s.lower(), s.upper())
        })
    }

    /// The prefix length for which this series is exactly one prefix block.
    ///
    /// `1.2.252-255.*` gives 22, `1.2.*.4` gives none.
    fn prefix_len_for_single_block(&self) -> Option<BitCount> {
        block::prefix_len_for_single_block(self.segment_count(), self.bits_per_segment(), |i| {
            let s = self.segment(i);
            (s.lower(), s.upper())
        })
    }

    /// Whether the assigned prefix length exists and the series contains
    /// every block of it that it touches.
    fn is_prefix_block(&self) -> bool {
        self.prefix_len()
            .is_some_and(|p| self.contains_prefix_block(p))
    }

    fn is_single_prefix_block(&self) -> bool {
        self.prefix_len()
            .is_some_and(|p| self.contains_single_prefix_block(p))
    }

    /// Whether the values form one contiguous numeric interval.
    fn is_sequential(&self) -> bool {
        let count = self.segment_count();
        match (0..count).find(|&i| self.segment(i).is_multiple()) {
            Some(first) => (first + 1..count).all(|i| self.segment(i).is_full_range()),
            None => true,
        }
    }

    /// Index of the segment after which every segment spans its full range.
    fn sequential_block_index(&self) -> usize {
        block::sequential_block_index(self.segment_count(), self.bits_per_segment(), |i| {
            let s = self.segment(i);
            (s.lower(), s.upper())
        })
    }

    fn includes_zero(&self) -> bool {
        (0..self.segment_count()).all(|i| self.segment(i).includes_zero())
    }

    fn includes_max(&self) -> bool {
        (0..self.segment_count()).all(|i| self.segment(i).includes_max())
    }

    fn is_full_range(&self) -> bool {
        (0..self.segment_count()).all(|i| self.segment(i).is_full_range())
    }

    /// The lower value packed into an integer, first segment most significant.
    fn value(&self) -> u128 {
        let bps = self.bits_per_segment();
        (0..self.segment_count()).fold(0, |acc, i| (acc << bps) | u128::from(self.segment(i).lower()))
    }

    fn upper_value(&self) -> u128 {
        let bps = self.bits_per_segment();
        (0..self.segment_count()).fold(0, |acc, i| (acc << bps) | u128::from(self.segment(i).upper()))
    }

    /// Whether bit `n` of the lower value is set, counting from the least
    /// significant bit of the whole series.
    ///
    /// # Panics
    ///
    /// If `n` is not below the bit count.
    fn test_bit(&self, n: BitCount) -> bool {
        let bit_count = self.bit_count();
        assert!(n < bit_count, "bit index {n} out of range for {bit_count} bits");
        let bps = self.bits_per_segment();
        let index = self.segment_count() - 1 - (n / bps) as usize;
        self.segment(index).test_bit(n % bps)
    }

    /// Whether bit `index` of the lower value is set, counting from the
    /// most significant bit.
    ///
    /// # Panics
    ///
    /// If `index` is not below the bit count.
    fn is_one_bit(&self, index: BitCount) -> bool {
        let bit_count = self.bit_count();
        assert!(index < bit_count, "bit index {index} out of range for {bit_count} bits");
        self.test_bit(bit_count - index - 1)
    }

    fn max_segment_value(&self) -> SegInt {
        bits::max_value(self.bits_per_segment())
    }
}
