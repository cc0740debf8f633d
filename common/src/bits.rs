//! # Segment Bit Algebra
//!
//! Pure functions over a single `[lower, upper]` pair of segment values
//! of a given bit width. Everything that decides whether a range of
//! values is a **prefix block**, what its **minimal prefix** is, or how
//! it behaves under **masking** and **reversal** lives here, so that
//! segments, sections and sequential ranges all share one definition.

use tracing::trace;

use crate::error::IncompatibleAddressError;

/// Bit widths and prefix lengths.
pub type BitCount = u32;

/// Holds the value of any family's segment (octet, hextet, MAC byte).
pub type SegInt = u32;

/// Largest value of a `bits`-wide segment.
pub fn max_value(bits: BitCount) -> SegInt {
    low_ones(bits)
}

/// Ones in the `n` least significant bits.
pub fn low_ones(n: BitCount) -> SegInt {
    match n {
        0 => 0,
        n if n >= SegInt::BITS => SegInt::MAX,
        n => (1 << n) - 1,
    }
}

fn shr(value: SegInt, n: BitCount) -> SegInt {
    value.checked_shr(n).unwrap_or(0)
}

/// Ones in the host bits of a `bits`-wide value with the given prefix.
pub fn host_mask(prefix: BitCount, bits: BitCount) -> SegInt {
    if prefix >= bits {
        0
    } else {
        shr(max_value(bits), prefix)
    }
}

/// Ones in the top `prefix` bits of a `bits`-wide value.
pub fn network_mask(prefix: BitCount, bits: BitCount) -> SegInt {
    max_value(bits) & !host_mask(prefix, bits)
}

/// Smallest prefix length for which `[lower, upper]` is a union of
/// prefix blocks.
///
/// The host part can be no longer than the trailing zeros of `lower` and
/// the trailing ones of `upper`.
pub fn min_prefix_len_for_block(lower: SegInt, upper: SegInt, bits: BitCount) -> BitCount {
    if lower == upper {
        return bits;
    }
    if lower == 0 && upper == max_value(bits) {
        return 0;
    }
    let zeros = lower.trailing_zeros();
    let ones = upper.trailing_ones();
    bits - zeros.min(ones).min(bits)
}

/// The prefix length for which `[lower, upper]` is exactly one prefix
/// block, if there is one.
pub fn prefix_len_for_single_block(lower: SegInt, upper: SegInt, bits: BitCount) -> Option<BitCount> {
    let prefix = min_prefix_len_for_block(lower, upper, bits);
    if prefix == bits {
        return (lower == upper).then_some(prefix);
    }
    let shift = bits - prefix;
    (shr(lower, shift) == shr(upper, shift)).then_some(prefix)
}

/// Whether `[lower, upper]` contains every block of the given prefix
/// that it touches.
pub fn is_prefix_block(lower: SegInt, upper: SegInt, prefix: BitCount, bits: BitCount) -> bool {
    if prefix == 0 {
        return lower == 0 && upper == max_value(bits);
    }
    if prefix >= bits {
        return true;
    }
    let host = host_mask(prefix, bits);
    lower & host == 0 && upper & host == host
}

/// Whether `[lower, upper]` is exactly one block of the given prefix.
pub fn is_single_prefix_block(lower: SegInt, upper: SegInt, prefix: BitCount, bits: BitCount) -> bool {
    if prefix >= bits {
        return lower == upper;
    }
    let shift = bits - prefix;
    shr(lower, shift) == shr(upper, shift) && is_prefix_block(lower, upper, prefix, bits)
}

/// Number of leading bits `a` and `b` have in common within `bits`.
pub fn matching_bits(a: SegInt, b: SegInt, bits: BitCount) -> BitCount {
    if bits == 0 {
        return 0;
    }
    let diff = (a ^ b) & max_value(bits);
    if diff == 0 {
        return bits;
    }
    diff.leading_zeros() - (SegInt::BITS - bits)
}

/// Prefix length local to the segment at `index`.
///
/// `None` for segments lying wholly inside the network part, `Some(0)`
/// for segments wholly in the host part.
pub fn segment_prefix_len(index: usize, bits_per_segment: BitCount, prefix: BitCount) -> Option<BitCount> {
    let so_far = index as BitCount * bits_per_segment;
    if prefix <= so_far {
        return Some(0);
    }
    let local = prefix - so_far;
    (local <= bits_per_segment).then_some(local)
}

/// Index of the segment holding the first host bit.
pub fn host_segment_index(prefix: BitCount, bits_per_segment: BitCount) -> usize {
    if bits_per_segment == 0 {
        return 0;
    }
    (prefix / bits_per_segment) as usize
}

/// Index of the segment holding the last network bit.
pub fn network_segment_index(prefix: BitCount, bits_per_segment: BitCount) -> Option<usize> {
    if prefix == 0 || bits_per_segment == 0 {
        return None;
    }
    Some(((prefix - 1) / bits_per_segment) as usize)
}

/// Masks every value of `[lower, upper]` with `mask`.
///
/// The result is itself a range only when the varying bits kept by the
/// mask are a contiguous low run that the range either spans completely
/// or does not cross.
pub fn mask_range(
    lower: SegInt,
    upper: SegInt,
    mask: SegInt,
    bits: BitCount,
) -> Result<(SegInt, SegInt), IncompatibleAddressError> {
    let mask = mask & max_value(bits);
    if lower == upper {
        return Ok((lower & mask, lower & mask));
    }
    let top_diff = SegInt::BITS - 1 - (lower ^ upper).leading_zeros();
    let region = low_ones(top_diff + 1);
    let kept = mask & region;
    let fixed = lower & !region & mask;
    if kept == 0 {
        return Ok((fixed, fixed));
    }
    let top_kept = SegInt::BITS - 1 - kept.leading_zeros();
    if kept == low_ones(top_kept + 1) {
        if top_kept == top_diff {
            return Ok((lower & mask, upper & mask));
        }
        let count = u64::from(upper - lower) + 1;
        if count >= 1u64 << (top_kept + 1) {
            return Ok((fixed, fixed | kept));
        }
    }
    trace!(lower, upper, mask, "mask yields a non-contiguous range");
    Err(IncompatibleAddressError::NonContiguousMask { lower, upper, mask })
}

/// ORs every value of `[lower, upper]` with `mask`.
///
/// The complement of `x | mask` is `!x & !mask`, so this is masking over
/// the complemented range.
pub fn or_range(
    lower: SegInt,
    upper: SegInt,
    mask: SegInt,
    bits: BitCount,
) -> Result<(SegInt, SegInt), IncompatibleAddressError> {
    let max = max_value(bits);
    let mask = mask & max;
    let (low, high) = mask_range(!upper & max, !lower & max, !mask & max, bits)
        .map_err(|_| IncompatibleAddressError::NonContiguousMask { lower, upper, mask })?;
    Ok((!high & max, !low & max))
}

/// Reverses the low `bits` bits of `value`.
pub fn reverse_bits(value: SegInt, bits: BitCount) -> SegInt {
    if bits == 0 {
        return 0;
    }
    shr(value.reverse_bits(), SegInt::BITS - bits)
}

/// Reverses the byte order within the low `bits` bits of `value`.
pub fn reverse_bytes(value: SegInt, bits: BitCount) -> SegInt {
    if bits <= 8 {
        return value;
    }
    shr(value.swap_bytes(), SegInt::BITS - bits)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
