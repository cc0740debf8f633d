//! # Sequential Ranges
//!
//! A [`SequentialRange`] is every address from a lower boundary to an
//! upper boundary, inclusive. Unlike a section it is always one
//! contiguous interval: `1.2.3.4 -> 1.2.4.5` holds 258 addresses, where
//! the section `1.2.3-4.4-5` holds only 4.
//!
//! Ranges support the usual interval algebra (containment, overlap,
//! intersection, subtraction, joining) and decompose into prefix blocks
//! or sequential blocks.

use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use addrkit_common::bits::{BitCount, SegInt};
use addrkit_common::config::Config;
use addrkit_common::error::{AddressError, IncompatibleAddressError, SizeMismatchError};
use addrkit_common::family::Family;
use num_bigint::{BigInt, BigUint};
use rayon::prelude::*;
use tracing::debug;

use crate::address::Address;
use crate::block;
use crate::compare::AddressComparator;
use crate::iter::range::BlockSteps;
use crate::section::Section;
use crate::series::SegmentSeries;
use crate::span;

#[derive(Debug, Clone)]
pub struct SequentialRange {
    lower: Address,
    upper: Address,
    count: OnceLock<BigUint>,
}

impl SequentialRange {
    /// The range from the smallest to the largest value of either operand.
    ///
    /// The operands may be given in either order and may themselves be
    /// multi-valued; prefix lengths are dropped.
    pub fn new(one: &Address, two: &Address) -> Result<Self, AddressError> {
        check_shape(one, two)?;
        let lower = one.value().min(two.value());
        let upper = one.upper_value().max(two.upper_value());
        Ok(Self::from_bounds(one.family(), one.segment_count(), lower, upper))
    }

    pub(crate) fn from_bounds(family: Family, segment_count: usize, lower: u128, upper: u128) -> Self {
        Self {
            lower: Address::from_bounds_unchecked(family, segment_count, lower, lower, None),
            upper: Address::from_bounds_unchecked(family, segment_count, upper, upper, None),
            count: OnceLock::new(),
        }
    }

    fn with_bounds(&self, lower: u128, upper: u128) -> Self {
        Self::from_bounds(self.family(), self.segment_count(), lower, upper)
    }

    pub fn lower(&self) -> &Address {
        &self.lower
    }

    pub fn upper(&self) -> &Address {
        &self.upper
    }

    pub fn family(&self) -> Family {
        self.lower.family()
    }

    pub fn segment_count(&self) -> usize {
        self.lower.segment_count()
    }

    pub fn bit_count(&self) -> BitCount {
        self.lower.bit_count()
    }

    /// Packed lower and upper values.
    pub fn bounds(&self) -> (u128, u128) {
        (self.lower.value(), self.upper.value())
    }

    pub fn is_multiple(&self) -> bool {
        self.lower != self.upper
    }

    pub fn count(&self) -> &BigUint {
        self.count.get_or_init(|| {
            let (lower, upper) = self.bounds();
            BigUint::from(upper - lower) + 1u32
        })
    }

    fn same_shape(&self, other: &SequentialRange) -> bool {
        self.family() == other.family() && self.segment_count() == other.segment_count()
    }

    /// Whether every value of `address` lies within the range.
    pub fn contains(&self, address: &Address) -> bool {
        let (lower, upper) = self.bounds();
        address.family() == self.family()
            && address.segment_count() == self.segment_count()
            && lower <= address.value()
            && address.upper_value() <= upper
    }

    pub fn contains_range(&self, other: &SequentialRange) -> bool {
        let (lower, upper) = self.bounds();
        let (other_lower, other_upper) = other.bounds();
        self.same_shape(other) && lower <= other_lower && other_upper <= upper
    }

    pub fn overlaps(&self, other: &SequentialRange) -> bool {
        let (lower, upper) = self.bounds();
        let (other_lower, other_upper) = other.bounds();
        self.same_shape(other) && other_lower <= upper && other_upper >= lower
    }

    /// Whether any value of `address` lies within the range.
    ///
    /// The smallest member of the address not below the lower boundary is
    /// found segment by segment and checked against the upper boundary.
    pub fn overlaps_address(&self, address: &Address) -> bool {
        if address.family() != self.family() || address.segment_count() != self.segment_count() {
            return false;
        }
        let bps = address.bits_per_segment();
        let count = address.segment_count();
        let (_, upper) = self.bounds();
        let lows = |from: usize| -> u128 {
            (from..count).fold(0, |acc, i| (acc << bps) | u128::from(address.segment(i).lower()))
        };
        let shift_in = |prefix: u128, value: SegInt, index: usize| -> u128 {
            let rest = (count - index - 1) as BitCount * bps;
            (((prefix << bps) | u128::from(value)) << rest) | lows(index + 1)
        };
        let mut tight: u128 = 0;
        let mut fallback: Option<u128> = None;
        for i in 0..count {
            let bound = self.lower.segment(i).lower();
            let seg = address.segment(i);
            if bound < seg.lower() {
                return shift_in(tight, seg.lower(), i) <= upper;
            }
            if bound > seg.upper() {
                return fallback.is_some_and(|candidate| candidate <= upper);
            }
            if bound < seg.upper() {
                fallback = Some(shift_in(tight, bound + 1, i));
            }
            tight = (tight << bps) | u128::from(bound);
        }
        tight <= upper
    }

    pub fn intersect(&self, other: &SequentialRange) -> Option<SequentialRange> {
        if !self.same_shape(other) {
            return None;
        }
        let (lower, upper) = self.bounds();
        let (other_lower, other_upper) = other.bounds();
        let from = lower.max(other_lower);
        let to = upper.min(other_upper);
        (from <= to).then(|| self.with_bounds(from, to))
    }

    /// The union of the two ranges, when that union is itself a range.
    ///
    /// Ranges join when they overlap or when one ends right before the
    /// other starts. A range ending at the maximum value is never adjacent
    /// to one starting at zero.
    pub fn join_to(&self, other: &SequentialRange) -> Option<SequentialRange> {
        if !self.same_shape(other) {
            return None;
        }
        if self.overlaps(other) || self.is_adjacent(other) {
            return self.extend(other).ok();
        }
        None
    }

    fn is_adjacent(&self, other: &SequentialRange) -> bool {
        let (lower, upper) = self.bounds();
        let (other_lower, other_upper) = other.bounds();
        upper.checked_add(1) == Some(other_lower) || other_upper.checked_add(1) == Some(lower)
    }

    fn max_value(&self) -> u128 {
        span::low_mask(self.bit_count())
    }

    /// The range from the lower of both lower boundaries to the higher of
    /// both upper boundaries, gap included.
    pub fn extend(&self, other: &SequentialRange) -> Result<SequentialRange, AddressError> {
        check_shape(&self.lower, &other.lower)?;
        let (lower, upper) = self.bounds();
        let (other_lower, other_upper) = other.bounds();
        Ok(self.with_bounds(lower.min(other_lower), upper.max(other_upper)))
    }

    /// The parts of this range not covered by `other`: none, one or two
    /// ranges, in ascending order.
    pub fn subtract(&self, other: &SequentialRange) -> Vec<SequentialRange> {
        if !self.same_shape(other) {
            return vec![self.clone()];
        }
        let (lower, upper) = self.bounds();
        let (other_lower, other_upper) = other.bounds();
        if other_upper < lower || other_lower > upper {
            return vec![self.clone()];
        }
        let mut remainder = Vec::with_capacity(2);
        if lower < other_lower {
            remainder.push(self.with_bounds(lower, other_lower - 1));
        }
        if other_upper < upper {
            remainder.push(self.with_bounds(other_upper + 1, upper));
        }
        remainder
    }

    /// The address `n` on from the lower boundary, counting down for
    /// negative `n`. `None` past either end of the value space.
    pub fn increment(&self, n: i64) -> Option<Address> {
        let (lower, _) = self.bounds();
        let value = if n < 0 {
            lower.checked_sub(u128::from(n.unsigned_abs()))?
        } else {
            lower.checked_add(n as u128)?
        };
        if value > self.max_value() {
            return None;
        }
        Some(Address::from_bounds_unchecked(self.family(), self.segment_count(), value, value, None))
    }

    /// Distance of the single-valued `address` from the lower boundary,
    /// the inverse of [`increment`](SequentialRange::increment).
    pub fn enumerate(&self, address: &Address) -> Option<BigInt> {
        if address.family() != self.family() || address.segment_count() != self.segment_count() || address.is_multiple()
        {
            return None;
        }
        let (lower, _) = self.bounds();
        Some(BigInt::from(address.value()) - BigInt::from(lower))
    }

    /// The smallest prefix block containing the whole range.
    pub fn cover_with_prefix_block(&self) -> Address {
        let (lower, upper) = self.bounds();
        let bit_count = self.bit_count();
        let (block, prefix) = span::cover_block(lower, upper, bit_count);
        let block_upper = block | span::low_mask(bit_count - prefix);
        Address::from_bounds_unchecked(self.family(), self.segment_count(), block, block_upper, Some(prefix))
    }

    /// The fewest prefix blocks whose union is exactly this range.
    pub fn span_with_prefix_blocks(&self) -> Vec<Address> {
        let (lower, upper) = self.bounds();
        let bit_count = self.bit_count();
        span::prefix_blocks(lower, upper, bit_count)
            .into_iter()
            .map(|(block, prefix)| {
                let block_upper = block | span::low_mask(bit_count - prefix);
                Address::from_bounds_unchecked(self.family(), self.segment_count(), block, block_upper, Some(prefix))
            })
            .collect()
    }

    /// The fewest sequential blocks whose union is exactly this range.
    pub fn span_with_sequential_blocks(&self) -> Vec<Address> {
        let lower: Vec<SegInt> = self.lower.segments().iter().map(|s| s.lower()).collect();
        let upper: Vec<SegInt> = self.upper.segments().iter().map(|s| s.lower()).collect();
        let max = self.lower.max_segment_value();
        span::sequential_blocks(&lower, &upper, max)
            .into_iter()
            .map(|pairs| Address::from_section_unchecked(Section::from_pairs(self.family(), &pairs, None)))
            .collect()
    }

    /// Joins overlapping and adjacent ranges into the fewest ranges.
    ///
    /// The result is sorted by lower boundary.
    pub fn join(ranges: &[SequentialRange]) -> Vec<SequentialRange> {
        Self::join_with(ranges, &Config::default())
    }

    /// Like [`join`](SequentialRange::join), sorting on the rayon pool when
    /// the batch reaches the configured threshold.
    pub fn join_with(ranges: &[SequentialRange], config: &Config) -> Vec<SequentialRange> {
        let mut sorted = ranges.to_vec();
        let order = AddressComparator::LOW_VALUE;
        if config.is_parallel(sorted.len()) {
            sorted.par_sort_by(|a, b| order.compare_ranges(a, b));
        } else {
            sorted.sort_by(|a, b| order.compare_ranges(a, b));
        }
        let mut joined: Vec<SequentialRange> = Vec::with_capacity(sorted.len());
        for range in sorted {
            if let Some(last) = joined.last_mut() {
                if let Some(merged) = last.join_to(&range) {
                    *last = merged;
                    continue;
                }
            }
            joined.push(range);
        }
        debug!(inputs = ranges.len(), joined = joined.len(), "joined sequential ranges");
        joined
    }

    fn pair(&self, index: usize) -> (SegInt, SegInt) {
        (self.lower.segment(index).lower(), self.upper.segment(index).lower())
    }

    pub fn contains_prefix_block(&self, prefix: BitCount) -> bool {
        block::contains_prefix_block(self.segment_count(), self.lower.bits_per_segment(), prefix, |i| self.pair(i))
    }

    pub fn contains_single_prefix_block(&self, prefix: BitCount) -> bool {
        block::contains_single_prefix_block(self.segment_count(), self.lower.bits_per_segment(), prefix, |i| {
            self.pair(i)
        })
    }

    pub fn min_prefix_len_for_block(&self) -> BitCount {
        block::min_prefix_len_for_block(self.segment_count(), self.lower.bits_per_segment(), |i| self.pair(i))
    }

    pub fn prefix_len_for_single_block(&self) -> Option<BitCount> {
        block::prefix_len_for_single_block(self.segment_count(), self.lower.bits_per_segment(), |i| self.pair(i))
    }

    /// Number of distinct values of the top `prefix` bits.
    pub fn prefix_count_len(&self, prefix: BitCount) -> BigUint {
        let (lower, upper) = self.bounds();
        let shift = self.bit_count() - prefix.min(self.bit_count());
        BigUint::from(span::shr(upper, shift) - span::shr(lower, shift)) + 1u32
    }

    pub fn includes_zero(&self) -> bool {
        self.lower.value() == 0
    }

    pub fn includes_max(&self) -> bool {
        self.upper.value() == self.max_value()
    }

    pub fn is_full_range(&self) -> bool {
        self.includes_zero() && self.includes_max()
    }

    /// Every address of the range, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Address> + Send + use<> {
        let family = self.family();
        let count = self.segment_count();
        let (lower, upper) = self.bounds();
        BlockSteps::new(lower, upper, self.bit_count(), self.bit_count())
            .map(move |step| Address::from_bounds_unchecked(family, count, step.block_lower, step.block_lower, None))
    }

    /// Every prefix block of the given length that intersects the range,
    /// in full.
    pub fn prefix_block_iter(&self, prefix: BitCount) -> impl Iterator<Item = Address> + Send + use<> {
        let family = self.family();
        let count = self.segment_count();
        let prefix = prefix.min(self.bit_count());
        let (lower, upper) = self.bounds();
        BlockSteps::new(lower, upper, self.bit_count(), prefix).map(move |step| {
            Address::from_bounds_unchecked(family, count, step.block_lower, step.block_upper, Some(prefix))
        })
    }

    /// The range split at every boundary of the given prefix length.
    ///
    /// The first and last parts may be partial blocks.
    pub fn prefix_iter(&self, prefix: BitCount) -> impl Iterator<Item = SequentialRange> + Send + use<> {
        let family = self.family();
        let count = self.segment_count();
        let (lower, upper) = self.bounds();
        BlockSteps::new(lower, upper, self.bit_count(), prefix)
            .map(move |step| SequentialRange::from_bounds(family, count, step.clipped_lower, step.clipped_upper))
    }
}

fn check_shape(one: &Address, two: &Address) -> Result<(), AddressError> {
    if one.family() != two.family() {
        return Err(IncompatibleAddressError::FamilyMismatch {
            left: one.family(),
            right: two.family(),
        }
        .into());
    }
    if one.segment_count() != two.segment_count() {
        return Err(SizeMismatchError {
            expected: one.segment_count(),
            actual: two.segment_count(),
        }
        .into());
    }
    Ok(())
}

impl PartialEq for SequentialRange {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower && self.upper == other.upper
    }
}

impl Eq for SequentialRange {}

impl Hash for SequentialRange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower.hash(state);
        self.upper.hash(state);
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
