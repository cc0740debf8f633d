//! # Spanning Helpers
//!
//! Whole-value arithmetic for splitting an interval `[lower, upper]` of
//! `bits`-wide values into prefix blocks or sequential blocks. Values
//! are packed into a `u128`, which holds every supported family.

use addrkit_common::bits::{BitCount, SegInt};
use tracing::trace;

/// Ones in the `n` least significant bits of a `u128`.
pub(crate) fn low_mask(n: BitCount) -> u128 {
    if n >= u128::BITS {
        u128::MAX
    } else {
        (1u128 << n) - 1
    }
}

pub(crate) fn shr(value: u128, n: BitCount) -> u128 {
    value.checked_shr(n).unwrap_or(0)
}

/// The minimal list of `(block lower value, prefix length)` pairs whose
/// union is exactly `[lower, upper]`.
pub(crate) fn prefix_blocks(lower: u128, upper: u128, bits: BitCount) -> Vec<(u128, BitCount)> {
    let mut blocks = Vec::new();
    let mut current = lower;
    loop {
        let aligned = if current == 0 {
            bits
        } else {
            current.trailing_zeros().min(bits)
        };
        // largest host length whose block still ends at or before upper
        let remaining = upper - current;
        let fits = if remaining == u128::MAX {
            u128::BITS
        } else {
            u128::BITS - 1 - (remaining + 1).leading_zeros()
        };
        let host = aligned.min(fits);
        blocks.push((current, bits - host));
        let end = current | low_mask(host);
        if end >= upper {
            break;
        }
        current = end + 1;
    }
    trace!(lower, upper, blocks = blocks.len(), "spanned with prefix blocks");
    blocks
}

/// Lower value and prefix length of the smallest prefix block that
/// covers `[lower, upper]`.
pub(crate) fn cover_block(lower: u128, upper: u128, bits: BitCount) -> (u128, BitCount) {
    let diff = lower ^ upper;
    let prefix = if diff == 0 {
        bits
    } else {
        diff.leading_zeros() - (u128::BITS - bits)
    };
    (lower & !low_mask(bits - prefix), prefix)
}

/// A sequential block given as per-segment `(lower, upper)` pairs.
pub(crate) type SegmentPairs = Vec<(SegInt, SegInt)>;

/// Splits the interval between two boundaries, given segment by segment,
/// into the fewest blocks whose segments are single values followed by
/// one range followed by full ranges.
pub(crate) fn sequential_blocks(lower: &[SegInt], upper: &[SegInt], max: SegInt) -> Vec<SegmentPairs> {
    let mut blocks = Vec::new();
    split_sequential(lower, upper, max, &mut blocks);
    blocks
}

fn split_sequential(lower: &[SegInt], upper: &[SegInt], max: SegInt, blocks: &mut Vec<SegmentPairs>) {
    let Some(diff) = (0..lower.len()).find(|&i| lower[i] != upper[i]) else {
        blocks.push(lower.iter().map(|&v| (v, v)).collect());
        return;
    };
    let lower_tail_zero = lower[diff + 1..].iter().all(|&v| v == 0);
    let upper_tail_max = upper[diff + 1..].iter().all(|&v| v == max);
    let block = |from: SegInt, to: SegInt| -> SegmentPairs {
        lower[..diff]
            .iter()
            .map(|&v| (v, v))
            .chain(std::iter::once((from, to)))
            .chain(std::iter::repeat_n((0, max), lower.len() - diff - 1))
            .collect()
    };

    let mut from = lower[diff];
    let mut to = upper[diff];
    if !lower_tail_zero {
        let mut head_upper = lower[..=diff].to_vec();
        head_upper.resize(lower.len(), max);
        split_sequential(lower, &head_upper, max, blocks);
        from += 1;
    }
    if !upper_tail_max {
        to -= 1;
    }
    if from <= to {
        blocks.push(block(from, to));
    }
    if !upper_tail_max {
        let mut tail_lower = upper[..=diff].to_vec();
        tail_lower.resize(upper.len(), 0);
        split_sequential(&tail_lower, upper, max, blocks);
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
