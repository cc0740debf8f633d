//! # Grouping Block Algebra
//!
//! Prefix-block queries over a whole sequence of segments. The segments
//! are given as a closure returning the `(lower, upper)` value pair at
//! each index, which lets sections (one range per segment) and
//! sequential ranges (lower and upper boundary addresses) share the
//! same walk.
//!
//! For a sequential range a pair may have `lower > upper`; the bit tests
//! below never assume otherwise.

use addrkit_common::bits::{self, BitCount, SegInt};

/// Whether the values contain every block of `prefix` that they touch.
///
/// The segment straddling the prefix must be a block for its local
/// prefix and every later segment must span its full range.
pub(crate) fn contains_prefix_block<F>(count: usize, bits_per_segment: BitCount, prefix: BitCount, pair: F) -> bool
where
    F: Fn(usize) -> (SegInt, SegInt),
{
    let prefix = prefix.min(count as BitCount * bits_per_segment);
    let max = bits::max_value(bits_per_segment);
    let host_index = bits::host_segment_index(prefix, bits_per_segment);
    if host_index >= count {
        return true;
    }
    let (lower, upper) = pair(host_index);
    let local = prefix - host_index as BitCount * bits_per_segment;
    if !bits::is_prefix_block(lower, upper, local, bits_per_segment) {
        return false;
    }
    (host_index + 1..count).all(|i| pair(i) == (0, max))
}

/// Whether the values are exactly one block of `prefix`.
pub(crate) fn contains_single_prefix_block<F>(count: usize, bits_per_segment: BitCount, prefix: BitCount, pair: F) -> bool
where
    F: Fn(usize) -> (SegInt, SegInt),
{
    let prefix = prefix.min(count as BitCount * bits_per_segment);
    let max = bits::max_value(bits_per_segment);
    for i in 0..count {
        let (lower, upper) = pair(i);
        if let Some(local) = bits::segment_prefix_len(i, bits_per_segment, prefix) {
            if !bits::is_single_prefix_block(lower, upper, local, bits_per_segment) {
                return false;
            }
            return (i + 1..count).all(|j| pair(j) == (0, max));
        }
        if lower != upper {
            return false;
        }
    }
    true
}

/// Smallest prefix for which the values are a union of prefix blocks.
pub(crate) fn min_prefix_len_for_block<F>(count: usize, bits_per_segment: BitCount, pair: F) -> BitCount
where
    F: Fn(usize) -> (SegInt, SegInt),
{
    let mut total = count as BitCount * bits_per_segment;
    for i in (0..count).rev() {
        let (lower, upper) = pair(i);
        let local = bits::min_prefix_len_for_block(lower, upper, bits_per_segment);
        if local == bits_per_segment {
            break;
        }
        total -= bits_per_segment;
        if local != 0 {
            total += local;
            break;
        }
    }
    total
}

/// The prefix for which the values are exactly one prefix block.
pub(crate) fn prefix_len_for_single_block<F>(count: usize, bits_per_segment: BitCount, pair: F) -> Option<BitCount>
where
    F: Fn(usize) -> (SegInt, SegInt),
{
    let max = bits::max_value(bits_per_segment);
    let mut total = 0;
    for i in 0..count {
        let (lower, upper) = pair(i);
        let local = bits::prefix_len_for_single_block(lower, upper, bits_per_segment)?;
        total += local;
        if local < bits_per_segment {
            if (i + 1..count).all(|j| pair(j) == (0, max)) {
                return Some(total);
            }
            return None;
        }
    }
    Some(total)
}

/// Index of the first segment from which everything that follows spans
/// its full range.
pub(crate) fn sequential_block_index<F>(count: usize, bits_per_segment: BitCount, pair: F) -> usize
where
    F: Fn(usize) -> (SegInt, SegInt),
{
    let max = bits::max_value(bits_per_segment);
    let mut index = count.saturating_sub(1);
    while index > 0 && pair(index) == (0, max) {
        index -= 1;
    }
    index
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(values: &[(SegInt, SegInt)]) -> impl Fn(usize) -> (SegInt, SegInt) + '_ {
        move |i| values[i]
    }

    #[test]
    fn test_class_b_block() {
        let v = [(1, 1), (2, 2), (0, 255), (0, 255)];
        assert!(contains_prefix_block(4, 8, 16, pairs(&v)));
        assert!(contains_prefix_block(4, 8, 20, pairs(&v)));
        assert!(!contains_prefix_block(4, 8, 15, pairs(&v)));
        assert!(contains_single_prefix_block(4, 8, 16, pairs(&v)));
        assert!(!contains_single_prefix_block(4, 8, 20, pairs(&v)));
        assert_eq!(min_prefix_len_for_block(4, 8, pairs(&v)), 16);
        assert_eq!(prefix_len_for_single_block(4, 8, pairs(&v)), Some(16));
    }

    #[test]
    fn test_straddling_segment() {
        // 1.2.252-255.*
        let v = [(1, 1), (2, 2), (252, 255), (0, 255)];
        assert_eq!(min_prefix_len_for_block(4, 8, pairs(&v)), 22);
        assert_eq!(prefix_len_for_single_block(4, 8, pairs(&v)), Some(22));
        assert!(contains_single_prefix_block(4, 8, 22, pairs(&v)));
    }

    #[test]
    fn test_not_a_single_block() {
        // 1.2.*.4
        let v = [(1, 1), (2, 2), (0, 255), (4, 4)];
        assert_eq!(min_prefix_len_for_block(4, 8, pairs(&v)), 32);
        assert_eq!(prefix_len_for_single_block(4, 8, pairs(&v)), None);
        // 1-2.*.*.*
        let v = [(1, 2), (0, 255), (0, 255), (0, 255)];
        assert_eq!(min_prefix_len_for_block(4, 8, pairs(&v)), 8);
        assert_eq!(prefix_len_for_single_block(4, 8, pairs(&v)), None);
    }

    #[test]
    fn test_boundary_pairs_of_a_range() {
        // 1.2.3.0 -> 1.3.0.255, the third pair is inverted
        let v = [(1, 1), (2, 3), (3, 0), (0, 255)];
        assert!(contains_prefix_block(4, 8, 24, pairs(&v)));
        assert!(!contains_prefix_block(4, 8, 16, pairs(&v)));
        assert_eq!(min_prefix_len_for_block(4, 8, pairs(&v)), 24);
        assert_eq!(prefix_len_for_single_block(4, 8, pairs(&v)), None);
    }

    #[test]
    fn test_full_and_single() {
        let full = [(0, 255); 4];
        assert_eq!(min_prefix_len_for_block(4, 8, pairs(&full)), 0);
        assert_eq!(prefix_len_for_single_block(4, 8, pairs(&full)), Some(0));
        assert_eq!(sequential_block_index(4, 8, pairs(&full)), 0);
        let single = [(10, 10), (0, 0), (0, 0), (1, 1)];
        assert_eq!(min_prefix_len_for_block(4, 8, pairs(&single)), 32);
        assert_eq!(prefix_len_for_single_block(4, 8, pairs(&single)), Some(32));
        assert!(contains_prefix_block(4, 8, 32, pairs(&single)));
        assert!(!contains_prefix_block(4, 8, 31, pairs(&single)));
    }

    #[test]
    fn test_ipv6_hextet_blocks() {
        // 2001:db8::12-13:*
        let v = [
            (0x2001, 0x2001),
            (0xdb8, 0xdb8),
            (0, 0),
            (0, 0),
            (0, 0),
            (0, 0),
            (0x12, 0x13),
            (0, 0xffff),
        ];
        assert_eq!(min_prefix_len_for_block(8, 16, pairs(&v)), 111);
        assert_eq!(prefix_len_for_single_block(8, 16, pairs(&v)), Some(111));
        assert!(contains_prefix_block(8, 16, 111, pairs(&v)));
        assert!(contains_prefix_block(8, 16, 112, pairs(&v)));
        assert!(!contains_prefix_block(8, 16, 110, pairs(&v)));
        assert!(contains_single_prefix_block(8, 16, 111, pairs(&v)));
        assert!(!contains_single_prefix_block(8, 16, 112, pairs(&v)));
        assert_eq!(sequential_block_index(8, 16, pairs(&v)), 6);
    }

    #[test]
    fn test_ipv6_straddling_not_a_block() {
        // 2001:db8::12-13:ff0-1010
        let v = [
            (0x2001, 0x2001),
            (0xdb8, 0xdb8),
            (0, 0),
            (0, 0),
            (0, 0),
            (0, 0),
            (0x12, 0x13),
            (0xff0, 0x1010),
        ];
        assert_eq!(min_prefix_len_for_block(8, 16, pairs(&v)), 128);
        assert_eq!(prefix_len_for_single_block(8, 16, pairs(&v)), None);
        assert!(!contains_prefix_block(8, 16, 116, pairs(&v)));
    }

    #[test]
    fn test_mac_blocks() {
        // 00:11:22:33:44:55:00-7f:*
        let eui64 = [(0x00, 0x00), (0x11, 0x11), (0x22, 0x22), (0x33, 0x33), (0x44, 0x44), (0x55, 0x55), (0x00, 0x7f), (0x00, 0xff)];
        assert_eq!(min_prefix_len_for_block(8, 8, pairs(&eui64)), 49);
        assert_eq!(prefix_len_for_single_block(8, 8, pairs(&eui64)), Some(49));
        assert!(contains_single_prefix_block(8, 8, 49, pairs(&eui64)));
        assert!(contains_prefix_block(8, 8, 52, pairs(&eui64)));
        assert!(!contains_single_prefix_block(8, 8, 52, pairs(&eui64)));
        // 00:11:22:33:40-4f:*
        let mac48 = [(0x00, 0x00), (0x11, 0x11), (0x22, 0x22), (0x33, 0x33), (0x40, 0x4f), (0x00, 0xff)];
        assert_eq!(min_prefix_len_for_block(6, 8, pairs(&mac48)), 36);
        assert_eq!(prefix_len_for_single_block(6, 8, pairs(&mac48)), Some(36));
    }

    #[test]
    fn test_sequential_block_index() {
        let v = [(1, 1), (2, 3), (0, 255), (0, 255)];
        assert_eq!(sequential_block_index(4, 8, pairs(&v)), 1);
        let v = [(1, 1), (2, 3), (0, 255), (4, 4)];
        assert_eq!(sequential_block_index(4, 8, pairs(&v)), 3);
    }
}
