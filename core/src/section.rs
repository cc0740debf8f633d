//! # Address Sections
//!
//! A [`Section`] is an immutable, ordered list of [`SegmentRange`]s of one
//! family with an optional prefix length. It represents the **cartesian
//! product** of its segment ranges: `1.2.3-4.*` holds 512 values.
//!
//! Sections are the common currency of the crate. Addresses wrap one,
//! iterators yield them and sequential ranges decompose into them.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use addrkit_common::bits::{self, BitCount, SegInt};
use addrkit_common::error::{AddressError, AddressValueError, IncompatibleAddressError, SizeMismatchError};
use addrkit_common::family::Family;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::segment::SegmentRange;
use crate::series::SegmentSeries;
use crate::span;

#[derive(Debug, Clone)]
pub struct Section {
    family: Family,
    segments: Arc<[SegmentRange]>,
    prefix_len: Option<BitCount>,
    multiple: bool,
    count: OnceLock<BigUint>,
}

/// Largest segment count a section of the family may have.
fn max_segments(family: Family) -> usize {
    match family {
        Family::Mac => 8,
        other => other.address_segment_count(),
    }
}

fn check_shape(family: Family, count: usize, prefix_len: Option<BitCount>) -> Result<(), AddressValueError> {
    if count > max_segments(family) {
        return Err(AddressValueError::SegmentCount {
            family,
            actual: count,
        });
    }
    let bit_count = count as BitCount * family.bits_per_segment();
    match prefix_len {
        Some(prefix) if prefix > bit_count => Err(AddressValueError::PrefixTooLong { prefix, bit_count }),
        _ => Ok(()),
    }
}

impl Section {
    /// The zero-segment sentinel.
    pub fn empty() -> Self {
        Self::from_parts(Family::Empty, Vec::new(), None)
    }

    pub(crate) fn from_parts(family: Family, segments: Vec<SegmentRange>, prefix_len: Option<BitCount>) -> Self {
        let multiple = segments.iter().any(SegmentRange::is_multiple);
        Self {
            family,
            segments: segments.into(),
            prefix_len,
            multiple,
            count: OnceLock::new(),
        }
    }

    /// Builds a single-valued section from a per-index value provider.
    pub fn from_values<F>(family: Family, count: usize, values: F, prefix_len: Option<BitCount>) -> Result<Self, AddressValueError>
    where
        F: Fn(usize) -> SegInt,
    {
        Self::from_range_values(family, count, &values, &values, prefix_len)
    }

    /// Builds a section from lower and upper value providers.
    ///
    /// A pair given in descending order is swapped.
    pub fn from_range_values<L, U>(
        family: Family,
        count: usize,
        lower: L,
        upper: U,
        prefix_len: Option<BitCount>,
    ) -> Result<Self, AddressValueError>
    where
        L: Fn(usize) -> SegInt,
        U: Fn(usize) -> SegInt,
    {
        check_shape(family, count, prefix_len)?;
        let bps = family.bits_per_segment();
        let segments = (0..count)
            .map(|i| {
                let (a, b) = (lower(i), upper(i));
                SegmentRange::new(a.min(b), a.max(b), bps)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(family, segments, prefix_len))
    }

    /// Builds a section from explicit segments, revalidated against the
    /// family's segment width.
    pub fn from_segments(
        family: Family,
        segments: &[SegmentRange],
        prefix_len: Option<BitCount>,
    ) -> Result<Self, AddressValueError> {
        Self::from_range_values(
            family,
            segments.len(),
            |i| segments[i].lower(),
            |i| segments[i].upper(),
            prefix_len,
        )
    }

    /// Builds a single-valued section from big-endian bytes.
    pub fn from_bytes(
        family: Family,
        segment_count: usize,
        bytes: &[u8],
        prefix_len: Option<BitCount>,
    ) -> Result<Self, AddressValueError> {
        let per_segment = family.bytes_per_segment();
        if bytes.len() != segment_count * per_segment {
            return Err(AddressValueError::ByteLength {
                family,
                segments: segment_count,
                actual: bytes.len(),
            });
        }
        Self::from_values(
            family,
            segment_count,
            |i| {
                bytes[i * per_segment..(i + 1) * per_segment]
                    .iter()
                    .fold(0, |acc, &b| (acc << 8) | SegInt::from(b))
            },
            prefix_len,
        )
    }

    /// Builds a single-valued section from a packed value. Bits above the
    /// section's bit count are ignored.
    pub fn from_value(
        family: Family,
        segment_count: usize,
        value: u128,
        prefix_len: Option<BitCount>,
    ) -> Result<Self, AddressValueError> {
        check_shape(family, segment_count, prefix_len)?;
        Ok(Self::from_value_unchecked(family, segment_count, value, prefix_len))
    }

    pub(crate) fn from_value_unchecked(
        family: Family,
        segment_count: usize,
        value: u128,
        prefix_len: Option<BitCount>,
    ) -> Self {
        Self::from_bounds_unchecked(family, segment_count, value, value, prefix_len)
    }

    /// Splits packed lower and upper values segment by segment.
    pub(crate) fn from_bounds_unchecked(
        family: Family,
        segment_count: usize,
        lower: u128,
        upper: u128,
        prefix_len: Option<BitCount>,
    ) -> Self {
        let bps = family.bits_per_segment();
        let max = u128::from(bits::max_value(bps));
        let segments = (0..segment_count)
            .map(|i| {
                let shift = (segment_count - 1 - i) as BitCount * bps;
                let lo = (span::shr(lower, shift) & max) as SegInt;
                let hi = (span::shr(upper, shift) & max) as SegInt;
                SegmentRange::from_bounds(lo, hi, bps)
            })
            .collect();
        Self::from_parts(family, segments, prefix_len)
    }

    pub(crate) fn from_pairs(family: Family, pairs: &[(SegInt, SegInt)], prefix_len: Option<BitCount>) -> Self {
        let bps = family.bits_per_segment();
        let segments = pairs
            .iter()
            .map(|&(lo, hi)| SegmentRange::from_bounds(lo, hi, bps))
            .collect();
        Self::from_parts(family, segments, prefix_len)
    }

    pub fn segments(&self) -> &[SegmentRange] {
        &self.segments
    }

    pub fn max_value(&self) -> u128 {
        span::low_mask(self.bit_count())
    }

    /// Number of individual values, cached after the first call.
    pub fn count(&self) -> &BigUint {
        self.count.get_or_init(|| {
            self.segments
                .iter()
                .map(|s| BigUint::from(s.count()))
                .product()
        })
    }

    /// Number of distinct prefixes of the assigned prefix length, or the
    /// count when there is none.
    pub fn prefix_count(&self) -> BigUint {
        match self.prefix_len {
            Some(prefix) => self.prefix_count_len(prefix),
            None => self.count().clone(),
        }
    }

    /// Number of distinct values of the top `prefix` bits.
    pub fn prefix_count_len(&self, prefix: BitCount) -> BigUint {
        let prefix = prefix.min(self.bit_count());
        let bps = self.bits_per_segment();
        self.segments
            .iter()
            .enumerate()
            .map(|(i, s)| match bits::segment_prefix_len(i, bps, prefix) {
                None => BigUint::from(s.count()),
                Some(local) => BigUint::from(s.prefix_count(local)),
            })
            .product()
    }

    /// Number of distinct values of the first `segment_count` segments.
    pub fn block_count(&self, segment_count: usize) -> BigUint {
        self.segments
            .iter()
            .take(segment_count)
            .map(|s| BigUint::from(s.count()))
            .product()
    }

    /// How many sequential blocks the sequential block iterator yields.
    pub fn sequential_block_count(&self) -> BigUint {
        self.block_count(self.sequential_block_index())
    }

    pub fn lower(&self) -> Section {
        let segments = self
            .segments
            .iter()
            .map(|s| SegmentRange::from_bounds(s.lower(), s.lower(), s.bit_count()))
            .collect();
        Self::from_parts(self.family, segments, self.prefix_len)
    }

    pub fn upper(&self) -> Section {
        let segments = self
            .segments
            .iter()
            .map(|s| SegmentRange::from_bounds(s.upper(), s.upper(), s.bit_count()))
            .collect();
        Self::from_parts(self.family, segments, self.prefix_len)
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.pack_bytes(SegmentRange::lower)
    }

    pub fn upper_bytes(&self) -> Vec<u8> {
        self.pack_bytes(SegmentRange::upper)
    }

    fn pack_bytes(&self, value: fn(&SegmentRange) -> SegInt) -> Vec<u8> {
        let per_segment = self.family.bytes_per_segment();
        self.segments
            .iter()
            .flat_map(|s| {
                let v = value(s);
                (0..per_segment).rev().map(move |b| (v >> (b * 8)) as u8)
            })
            .collect()
    }

    pub(crate) fn same_shape(&self, other: &Section) -> bool {
        self.family == other.family && self.segments.len() == other.segments.len()
    }

    /// Fails unless `other` has this section's family and segment count.
    pub(crate) fn check_operand(&self, other: &Section) -> Result<(), AddressError> {
        if self.family != other.family {
            return Err(IncompatibleAddressError::FamilyMismatch {
                left: self.family,
                right: other.family,
            }
            .into());
        }
        if self.segments.len() != other.segments.len() {
            return Err(SizeMismatchError {
                expected: self.segments.len(),
                actual: other.segments.len(),
            }
            .into());
        }
        Ok(())
    }

    pub fn contains(&self, other: &Section) -> bool {
        self.same_shape(other)
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a.contains(b))
    }

    pub fn overlaps(&self, other: &Section) -> bool {
        self.same_shape(other)
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a.overlaps(b))
    }

    /// Same values, with the prefix length set to
    /// [`min_prefix_len_for_block`](SegmentSeries::min_prefix_len_for_block).
    pub fn assign_min_prefix_for_block(&self) -> Section {
        self.with_prefix(Some(self.min_prefix_len_for_block()))
    }

    /// Same values with the prefix length for which they form exactly one
    /// block, if there is one.
    pub fn assign_prefix_for_single_block(&self) -> Option<Section> {
        self.prefix_len_for_single_block()
            .map(|prefix| self.with_prefix(Some(prefix)))
    }

    /// Widens to the full blocks of the assigned prefix length.
    pub fn to_prefix_block(&self) -> Section {
        match self.prefix_len {
            Some(prefix) => self.to_prefix_block_len(prefix),
            None => self.clone(),
        }
    }

    /// Widens to the full blocks of the given prefix length, which becomes
    /// the prefix length of the result.
    pub fn to_prefix_block_len(&self, prefix: BitCount) -> Section {
        let prefix = prefix.min(self.bit_count());
        let bps = self.bits_per_segment();
        let segments = self
            .segments
            .iter()
            .enumerate()
            .map(|(i, s)| match bits::segment_prefix_len(i, bps, prefix) {
                None => *s,
                Some(local) => s.to_prefix_block(local),
            })
            .collect();
        Self::from_parts(self.family, segments, Some(prefix))
    }

    pub fn without_prefix_len(&self) -> Section {
        self.with_prefix(None)
    }

    pub fn set_prefix_len(&self, prefix: BitCount) -> Result<Section, AddressValueError> {
        let bit_count = self.bit_count();
        if prefix > bit_count {
            return Err(AddressValueError::PrefixTooLong { prefix, bit_count });
        }
        Ok(self.with_prefix(Some(prefix)))
    }

    /// Moves the prefix length by `delta` bits, clamped to the bit count.
    ///
    /// Without a prefix length, a positive delta becomes the prefix length
    /// and a negative one is applied to the bit count.
    pub fn adjust_prefix_len(&self, delta: i32) -> Section {
        let bit_count = i64::from(self.bit_count());
        let base = match self.prefix_len {
            Some(prefix) => i64::from(prefix),
            None if delta < 0 => bit_count,
            None => 0,
        };
        let prefix = (base + i64::from(delta)).clamp(0, bit_count);
        self.with_prefix(Some(prefix as BitCount))
    }

    pub(crate) fn with_prefix(&self, prefix_len: Option<BitCount>) -> Section {
        Self {
            prefix_len,
            ..self.clone()
        }
    }

    /// Replaces the segment at `index` with `[lower, upper]` and every
    /// following segment with its full range.
    ///
    /// # Panics
    ///
    /// If `index` is not below the segment count.
    pub fn to_block(&self, index: usize, lower: SegInt, upper: SegInt) -> Result<Section, AddressValueError> {
        assert!(
            index < self.segments.len(),
            "segment index {index} out of range for {} segments",
            self.segments.len()
        );
        let bps = self.bits_per_segment();
        let replaced = SegmentRange::new(lower.min(upper), lower.max(upper), bps)?;
        let segments = self.segments[..index]
            .iter()
            .copied()
            .chain(std::iter::once(replaced))
            .chain(std::iter::repeat_n(SegmentRange::full(bps), self.segments.len() - index - 1))
            .collect();
        Ok(Self::from_parts(self.family, segments, self.prefix_len))
    }

    /// Counts `n` values on from this section.
    ///
    /// For `0 <= n < count` this is the `n`-th member in iteration order.
    /// Larger `n` counts on past the upper value and negative `n` counts
    /// down from the lower value. `None` when the result leaves the value
    /// space.
    pub fn increment(&self, n: i64) -> Option<Section> {
        if n < 0 {
            let value = self.value().checked_sub(u128::from(n.unsigned_abs()))?;
            return Some(Self::from_value_unchecked(self.family, self.segments.len(), value, self.prefix_len));
        }
        let n = n as u64;
        let count = self.count();
        if BigUint::from(n) < *count {
            return Some(self.nth_member(n));
        }
        let beyond = (BigUint::from(n) - count).to_u128()? + 1;
        let value = self.upper_value().checked_add(beyond)?;
        if value > self.max_value() {
            return None;
        }
        Some(Self::from_value_unchecked(self.family, self.segments.len(), value, self.prefix_len))
    }

    // mixed-radix digits, last segment least significant
    fn nth_member(&self, mut n: u64) -> Section {
        let mut segments = self.segments.to_vec();
        for s in segments.iter_mut().rev() {
            let count = s.count();
            let value = s.lower() + (n % count) as SegInt;
            n /= count;
            *s = SegmentRange::from_bounds(value, value, s.bit_count());
        }
        Self::from_parts(self.family, segments, self.prefix_len)
    }

    /// Applies `mask` segment by segment. The prefix length is dropped.
    pub fn mask(&self, mask: &Section) -> Result<Section, AddressError> {
        self.check_operand(mask)?;
        let segments = self
            .segments
            .iter()
            .zip(mask.segments.iter())
            .map(|(s, m)| s.mask(m.lower()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(self.family, segments, None))
    }

    /// Segments in reverse order, prefix length dropped.
    pub fn reverse_segments(&self) -> Section {
        let segments = self.segments.iter().rev().copied().collect();
        Self::from_parts(self.family, segments, None)
    }

    /// Reverses every bit of the section, or with `per_byte` the bits
    /// within each byte only.
    pub fn reverse_bits(&self, per_byte: bool) -> Result<Section, IncompatibleAddressError> {
        let segments = if per_byte {
            self.segments
                .iter()
                .map(SegmentRange::reverse_bits_per_byte)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            self.segments
                .iter()
                .rev()
                .map(SegmentRange::reverse_bits)
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(Self::from_parts(self.family, segments, None))
    }

    /// Reverses the byte order of the whole section.
    pub fn reverse_bytes(&self) -> Result<Section, IncompatibleAddressError> {
        let segments = self
            .segments
            .iter()
            .rev()
            .map(SegmentRange::reverse_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(self.family, segments, None))
    }

    /// The smallest prefix block containing every value.
    pub fn cover_with_prefix_block(&self) -> Section {
        let (lower, prefix) = span::cover_block(self.value(), self.upper_value(), self.bit_count());
        let upper = lower | span::low_mask(self.bit_count() - prefix);
        Self::from_bounds_unchecked(self.family, self.segments.len(), lower, upper, Some(prefix))
    }

    /// The fewest prefix blocks whose union is exactly this section.
    pub fn span_with_prefix_blocks(&self) -> Vec<Section> {
        let bit_count = self.bit_count();
        self.sequential_block_iter()
            .flat_map(|block| span::prefix_blocks(block.value(), block.upper_value(), bit_count))
            .map(|(lower, prefix)| {
                let upper = lower | span::low_mask(bit_count - prefix);
                Self::from_bounds_unchecked(self.family, self.segments.len(), lower, upper, Some(prefix))
            })
            .collect()
    }

    /// The fewest sequential blocks whose union is exactly this section.
    pub fn span_with_sequential_blocks(&self) -> Vec<Section> {
        self.without_prefix_len().sequential_block_iter().collect()
    }
}

impl SegmentSeries for Section {
    fn family(&self) -> Family {
        self.family
    }

    fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn segment(&self, index: usize) -> SegmentRange {
        self.segments[index]
    }

    fn prefix_len(&self) -> Option<BitCount> {
        self.prefix_len
    }

    fn is_multiple(&self) -> bool {
        self.multiple
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::empty()
    }
}

/// Equality is on the set of values; the prefix length is not compared.
impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family && self.segments == other.segments
    }
}

impl Eq for Section {}

impl Hash for Section {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.family.hash(state);
        self.segments.hash(state);
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
