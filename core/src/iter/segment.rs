use addrkit_common::bits::{self, BitCount, SegInt};

use crate::segment::SegmentRange;

/// How one segment position is enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentMode {
    /// Every value of the range, one at a time.
    Full,
    /// One element per value of the top `n` bits, each clipped to the
    /// original range.
    Prefix(BitCount),
    /// One full block per value of the top `n` bits.
    PrefixBlock(BitCount),
    /// The original range, once.
    Identity,
}

/// Cursor over a single segment position.
#[derive(Debug, Clone)]
pub(crate) struct SegmentIter {
    range: SegmentRange,
    mode: SegmentMode,
    next: Option<SegInt>,
    last: SegInt,
}

impl SegmentIter {
    pub(crate) fn new(range: SegmentRange, mode: SegmentMode) -> Self {
        let (first, last) = match mode {
            SegmentMode::Full => (range.lower(), range.upper()),
            SegmentMode::Prefix(prefix) | SegmentMode::PrefixBlock(prefix) => {
                let shift = range.bit_count() - prefix.min(range.bit_count());
                (shr(range.lower(), shift), shr(range.upper(), shift))
            }
            SegmentMode::Identity => (0, 0),
        };
        Self {
            range,
            mode,
            next: Some(first),
            last,
        }
    }

    fn block(&self, prefix: BitCount, value: SegInt) -> (SegInt, SegInt) {
        let bit_count = self.range.bit_count();
        let prefix = prefix.min(bit_count);
        let lower = value.checked_shl(bit_count - prefix).unwrap_or(0);
        (lower, lower | bits::host_mask(prefix, bit_count))
    }
}

fn shr(value: SegInt, n: BitCount) -> SegInt {
    value.checked_shr(n).unwrap_or(0)
}

impl Iterator for SegmentIter {
    type Item = SegmentRange;

    fn next(&mut self) -> Option<SegmentRange> {
        let current = self.next?;
        self.next = (current < self.last).then(|| current + 1);
        let bit_count = self.range.bit_count();
        let item = match self.mode {
            SegmentMode::Full => SegmentRange::from_bounds(current, current, bit_count),
            SegmentMode::Identity => self.range,
            SegmentMode::PrefixBlock(prefix) => {
                let (lower, upper) = self.block(prefix, current);
                SegmentRange::from_bounds(lower, upper, bit_count)
            }
            SegmentMode::Prefix(prefix) => {
                let (lower, upper) = self.block(prefix, current);
                SegmentRange::from_bounds(
                    lower.max(self.range.lower()),
                    upper.min(self.range.upper()),
                    bit_count,
                )
            }
        };
        Some(item)
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
