//! # Subnet Algebra
//!
//! Operations relating a section to a second operand of the same shape
//! (intersection, subtraction, prefix comparison, enumeration, spans
//! between two operands) and operations on the host and network parts
//! of a prefixed section.
//!
//! The **host** of a section is every bit past its prefix length. A
//! section without a prefix length has no host bits for the `includes_*`
//! queries, and is treated as a `/0` when its host is zeroed or filled.

use addrkit_common::bits::{self, BitCount, SegInt};
use addrkit_common::error::{AddressError, IncompatibleAddressError};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use tracing::trace;

use crate::section::Section;
use crate::segment::SegmentRange;
use crate::series::SegmentSeries;
use crate::span;

impl Section {
    /// Values common to both sections, `None` when they are disjoint.
    ///
    /// The result keeps the longer prefix length when both operands have
    /// one, and has none otherwise.
    pub fn intersect(&self, other: &Section) -> Result<Option<Section>, AddressError> {
        self.check_operand(other)?;
        let prefix_len = match (self.prefix_len(), other.prefix_len()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        let segments = self
            .segments()
            .iter()
            .zip(other.segments())
            .map(|(a, b)| a.intersect(b))
            .collect::<Option<Vec<_>>>();
        Ok(segments.map(|segments| Self::from_parts(self.family(), segments, prefix_len)))
    }

    /// Values of this section outside `other`, as disjoint sections.
    ///
    /// Each piece fixes the segments before some index to their
    /// intersection with `other`, keeps the part of that segment lying
    /// below or above `other`, and leaves the later segments whole. When
    /// this section is prefixed each piece gets the longer of its own
    /// minimal block prefix and this section's prefix length.
    pub fn subtract(&self, other: &Section) -> Result<Vec<Section>, AddressError> {
        self.check_operand(other)?;
        if !self.overlaps(other) {
            return Ok(vec![self.clone()]);
        }
        let mut kept = self.segments().to_vec();
        let mut pieces = Vec::new();
        for (i, (s, o)) in self.segments().iter().zip(other.segments()).enumerate() {
            if s.lower() < o.lower() {
                pieces.push(self.piece(&kept, i, s.lower(), o.lower() - 1));
            }
            if s.upper() > o.upper() {
                pieces.push(self.piece(&kept, i, o.upper() + 1, s.upper()));
            }
            if let Some(common) = s.intersect(o) {
                kept[i] = common;
            }
        }
        trace!(pieces = pieces.len(), "subtracted section");
        let Some(prefix) = self.prefix_len() else {
            return Ok(pieces);
        };
        let bit_count = self.bit_count();
        Ok(pieces
            .into_iter()
            .map(|piece| {
                let min = piece.min_prefix_len_for_block();
                let prefix = if min == bit_count { prefix } else { min.max(prefix) };
                piece.with_prefix(Some(prefix))
            })
            .collect())
    }

    fn piece(&self, kept: &[SegmentRange], index: usize, lower: SegInt, upper: SegInt) -> Section {
        let bps = self.bits_per_segment();
        let segments = kept[..index]
            .iter()
            .copied()
            .chain(std::iter::once(SegmentRange::from_bounds(lower, upper, bps)))
            .chain(self.segments()[index + 1..].iter().copied())
            .collect();
        Self::from_parts(self.family(), segments, None)
    }

    /// Single-valued mask with ones in the network bits of the prefix
    /// length, or in every bit without one. The mask has no prefix length.
    pub fn network_mask(&self) -> Section {
        self.prefix_mask(bits::network_mask)
    }

    /// Single-valued mask with ones in the host bits of the prefix length,
    /// or zero without one. The mask has no prefix length.
    pub fn host_mask(&self) -> Section {
        self.prefix_mask(bits::host_mask)
    }

    fn prefix_mask(&self, mask: fn(BitCount, BitCount) -> SegInt) -> Section {
        let prefix = self.prefix_len().unwrap_or(self.bit_count());
        let bps = self.bits_per_segment();
        let segments = (0..self.segment_count())
            .map(|i| {
                let local = bits::segment_prefix_len(i, bps, prefix).unwrap_or(bps);
                let value = mask(local, bps);
                SegmentRange::from_bounds(value, value, bps)
            })
            .collect();
        Self::from_parts(self.family(), segments, None)
    }

    /// Clears the host bits, keeping the prefix length.
    ///
    /// Without a prefix length the result is the all-zero value with
    /// prefix length 0. Fails when a multi-valued segment does not mask to
    /// a contiguous range.
    pub fn to_zero_host(&self) -> Result<Section, IncompatibleAddressError> {
        match self.prefix_len() {
            Some(prefix) => self.to_zero_host_len(prefix),
            None => Ok(self.filled(0, Some(0))),
        }
    }

    /// Clears every bit past `prefix`. The prefix length is unchanged.
    pub fn to_zero_host_len(&self, prefix: BitCount) -> Result<Section, IncompatibleAddressError> {
        self.map_host(prefix, |s, local| s.mask(bits::network_mask(local, s.bit_count())))
    }

    /// Sets the host bits, keeping the prefix length.
    ///
    /// Without a prefix length the result is the all-ones value with
    /// prefix length 0.
    pub fn to_max_host(&self) -> Result<Section, IncompatibleAddressError> {
        match self.prefix_len() {
            Some(prefix) => self.to_max_host_len(prefix),
            None => Ok(self.filled(self.max_segment_value(), Some(0))),
        }
    }

    /// Sets every bit past `prefix`. The prefix length is unchanged.
    pub fn to_max_host_len(&self, prefix: BitCount) -> Result<Section, IncompatibleAddressError> {
        self.map_host(prefix, |s, local| s.bitwise_or(bits::host_mask(local, s.bit_count())))
    }

    /// Clears the network bits, keeping the host and the prefix length.
    ///
    /// Without a prefix length every bit is network and the result is the
    /// all-zero value. A straddling segment whose host bits do not form a
    /// range becomes every host value of that segment.
    pub fn to_zero_network(&self) -> Section {
        let Some(prefix) = self.prefix_len() else {
            return self.filled(0, None);
        };
        let bps = self.bits_per_segment();
        let segments = self
            .segments()
            .iter()
            .enumerate()
            .map(|(i, s)| match bits::segment_prefix_len(i, bps, prefix) {
                None => SegmentRange::from_bounds(0, 0, bps),
                Some(0) => *s,
                Some(local) => {
                    let host = bits::host_mask(local, bps);
                    s.mask(host)
                        .unwrap_or_else(|_| SegmentRange::from_bounds(0, host, bps))
                }
            })
            .collect();
        Self::from_parts(self.family(), segments, Some(prefix))
    }

    fn map_host<F>(&self, prefix: BitCount, f: F) -> Result<Section, IncompatibleAddressError>
    where
        F: Fn(&SegmentRange, BitCount) -> Result<SegmentRange, IncompatibleAddressError>,
    {
        let prefix = prefix.min(self.bit_count());
        let bps = self.bits_per_segment();
        let segments = self
            .segments()
            .iter()
            .enumerate()
            .map(|(i, s)| match bits::segment_prefix_len(i, bps, prefix) {
                None => Ok(*s),
                Some(local) => f(s, local),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(self.family(), segments, self.prefix_len()))
    }

    // every segment set to one value
    fn filled(&self, value: SegInt, prefix_len: Option<BitCount>) -> Section {
        if self.segment_count() == 0 {
            return self.clone();
        }
        let bps = self.bits_per_segment();
        let segments = vec![SegmentRange::from_bounds(value, value, bps); self.segment_count()];
        Self::from_parts(self.family(), segments, prefix_len)
    }

    /// Whether some value has all host bits zero. `false` without a
    /// prefix length.
    pub fn includes_zero_host(&self) -> bool {
        self.prefix_len()
            .is_some_and(|prefix| self.includes_zero_host_len(prefix))
    }

    pub fn includes_zero_host_len(&self, prefix: BitCount) -> bool {
        self.host_segments_all(prefix, |lower, upper, host| {
            lower & host == 0 || (lower | host) < upper
        })
    }

    /// Whether some value has all host bits set. `false` without a prefix
    /// length.
    pub fn includes_max_host(&self) -> bool {
        self.prefix_len()
            .is_some_and(|prefix| self.includes_max_host_len(prefix))
    }

    pub fn includes_max_host_len(&self, prefix: BitCount) -> bool {
        self.host_segments_all(prefix, |lower, upper, host| {
            let base = upper & !host;
            upper & host == host || (base != 0 && base - 1 >= lower)
        })
    }

    // segments vary independently, so each one can be tested on its own
    fn host_segments_all<F>(&self, prefix: BitCount, test: F) -> bool
    where
        F: Fn(SegInt, SegInt, SegInt) -> bool,
    {
        let bps = self.bits_per_segment();
        self.segments()
            .iter()
            .enumerate()
            .all(|(i, s)| match bits::segment_prefix_len(i, bps, prefix) {
                None => true,
                Some(local) => test(s.lower(), s.upper(), bits::host_mask(local, bps)),
            })
    }

    /// Containment of `other` compared on this section's network bits
    /// only. Without a prefix length this is plain containment.
    pub fn prefix_contains(&self, other: &Section) -> bool {
        self.prefix_compare(other, SegmentRange::contains, SegmentRange::prefix_contains)
    }

    /// Equality with `other` compared on this section's network bits only.
    /// Without a prefix length this is plain equality.
    pub fn prefix_equal(&self, other: &Section) -> bool {
        self.prefix_compare(other, |a, b| a == b, SegmentRange::prefix_equal)
    }

    fn prefix_compare<W, P>(&self, other: &Section, whole: W, partial: P) -> bool
    where
        W: Fn(&SegmentRange, &SegmentRange) -> bool,
        P: Fn(&SegmentRange, &SegmentRange, BitCount) -> bool,
    {
        if !self.same_shape(other) {
            return false;
        }
        let (ours, theirs) = (self.segments(), other.segments());
        let Some(prefix) = self.prefix_len() else {
            return ours.iter().zip(theirs).all(|(a, b)| whole(a, b));
        };
        let bps = self.bits_per_segment();
        let Some(index) = bits::network_segment_index(prefix, bps) else {
            return true;
        };
        let local = prefix - index as BitCount * bps;
        (0..index).all(|i| whole(&ours[i], &theirs[i])) && partial(&ours[index], &theirs[index], local)
    }

    /// Position of the single value `other` relative to this section.
    ///
    /// Inverse of [`increment`](Section::increment): members get their
    /// index in iteration order, values above the upper value count on
    /// from `count - 1` and values below the lower value are negative.
    /// `None` when `other` is multi-valued, of another shape, or lies
    /// between the bounds without being a member.
    pub fn enumerate(&self, other: &Section) -> Option<BigInt> {
        if !self.same_shape(other) || other.is_multiple() {
            return None;
        }
        let value = other.value();
        if self.contains(other) {
            let index = self
                .segments()
                .iter()
                .zip(other.segments())
                .fold(BigUint::zero(), |acc, (s, o)| acc * s.count() + (o.lower() - s.lower()));
            return Some(BigInt::from(index));
        }
        let upper = self.upper_value();
        if value > upper {
            return Some(BigInt::from(self.count().clone()) - 1 + BigInt::from(value - upper));
        }
        let lower = self.value();
        if value < lower {
            return Some(-BigInt::from(lower - value));
        }
        None
    }

    /// The smallest prefix block containing both operands and everything
    /// between them.
    pub fn cover_with_prefix_block_to(&self, other: &Section) -> Result<Section, AddressError> {
        let (lower, upper) = self.outer_bounds(other)?;
        let (block, prefix) = span::cover_block(lower, upper, self.bit_count());
        Ok(self.prefix_block_at(block, prefix))
    }

    /// The fewest prefix blocks spanning from the lowest to the highest
    /// value of either operand.
    pub fn span_with_prefix_blocks_to(&self, other: &Section) -> Result<Vec<Section>, AddressError> {
        let (lower, upper) = self.outer_bounds(other)?;
        Ok(span::prefix_blocks(lower, upper, self.bit_count())
            .into_iter()
            .map(|(block, prefix)| self.prefix_block_at(block, prefix))
            .collect())
    }

    /// The fewest sequential blocks spanning from the lowest to the
    /// highest value of either operand.
    pub fn span_with_sequential_blocks_to(&self, other: &Section) -> Result<Vec<Section>, AddressError> {
        let (lower, upper) = self.outer_bounds(other)?;
        let count = self.segment_count();
        let digits = |value: u128| -> Vec<SegInt> {
            Self::from_value_unchecked(self.family(), count, value, None)
                .segments()
                .iter()
                .map(SegmentRange::lower)
                .collect()
        };
        Ok(span::sequential_blocks(&digits(lower), &digits(upper), self.max_segment_value())
            .into_iter()
            .map(|pairs| Self::from_pairs(self.family(), &pairs, None))
            .collect())
    }

    fn outer_bounds(&self, other: &Section) -> Result<(u128, u128), AddressError> {
        self.check_operand(other)?;
        Ok((
            self.value().min(other.value()),
            self.upper_value().max(other.upper_value()),
        ))
    }

    fn prefix_block_at(&self, block: u128, prefix: BitCount) -> Section {
        let upper = block | span::low_mask(self.bit_count() - prefix);
        Self::from_bounds_unchecked(self.family(), self.segment_count(), block, upper, Some(prefix))
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
