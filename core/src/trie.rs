//! # Trie Keys
//!
//! What a binary trie needs from an address: the packed value, the
//! prefix length with its mask, and the mask of the first bit after the
//! prefix. The trie itself lives elsewhere; this module supplies the
//! keys and the ordering its in-order traversal follows.
//!
//! In trie order a prefix block sits between its two halves: everything
//! under `1.2.0.0/24` sorts before `1.2.0.0/23`, everything under
//! `1.2.1.0/24` after it.

use std::cmp::Ordering;

use addrkit_common::bits::{self, BitCount};
use addrkit_common::error::IncompatibleAddressError;
use addrkit_common::family::Family;
use tracing::debug;

use crate::address::Address;
use crate::series::SegmentSeries;
use crate::span;

/// The fields a trie indexes an address by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrieKey {
    pub family: Family,
    pub bit_count: BitCount,
    /// Lower value, packed.
    pub value: u128,
    pub prefix_len: Option<BitCount>,
    /// Network mask of the prefix length, all ones without one.
    pub prefix_mask: u128,
    /// The bit right after the prefix, zero when the prefix covers every bit.
    pub next_bit_mask: u128,
}

impl TrieKey {
    pub fn of(address: &Address) -> Self {
        let bit_count = address.bit_count();
        let prefix = address.prefix_len().unwrap_or(bit_count);
        let all = span::low_mask(bit_count);
        let next_bit_mask = if prefix < bit_count {
            1u128 << (bit_count - 1 - prefix)
        } else {
            0
        };
        Self {
            family: address.family(),
            bit_count,
            value: address.value(),
            prefix_len: address.prefix_len(),
            prefix_mask: all & !span::low_mask(bit_count - prefix),
            next_bit_mask,
        }
    }
}

/// Capability required by an external trie engine.
pub trait TrieKeyed {
    fn trie_key(&self) -> &TrieKey;

    /// Orders two keys of one family and width in trie order.
    fn trie_compare(&self, other: &Self) -> Result<Ordering, IncompatibleAddressError>;
}

impl TrieKeyed for Address {
    fn trie_key(&self) -> &TrieKey {
        self.cached_trie_key(|| TrieKey::of(self))
    }

    fn trie_compare(&self, other: &Self) -> Result<Ordering, IncompatibleAddressError> {
        check_trie_compatible(self, other)?;
        Ok(trie_order(self, other))
    }
}

fn check_trie_compatible(one: &Address, two: &Address) -> Result<(), IncompatibleAddressError> {
    if one.family() != two.family() {
        debug!(left = %one.family(), right = %two.family(), "trie order across families");
        return Err(IncompatibleAddressError::FamilyMismatch {
            left: one.family(),
            right: two.family(),
        });
    }
    if one.bit_count() != two.bit_count() {
        debug!(left = one.bit_count(), right = two.bit_count(), "trie order across widths");
        return Err(IncompatibleAddressError::TrieBitCountMismatch {
            left: one.bit_count(),
            right: two.bit_count(),
        });
    }
    Ok(())
}

/// Trie order of two addresses already known to share family and width.
///
/// Only lower values and assigned prefix lengths take part. At the first
/// segment where a prefix ends with all bits before it matching, the
/// shorter prefix is an ancestor of the other operand, which lands on
/// the side given by its bit right after the ancestor's prefix.
fn trie_order(one: &Address, two: &Address) -> Ordering {
    let count = one.segment_count();
    let bps = one.bits_per_segment();
    let local = |address: &Address, index: usize| {
        address
            .prefix_len()
            .and_then(|prefix| bits::segment_prefix_len(index, bps, prefix))
    };
    let matching = |a: u32, b: u32, limit: BitCount| {
        if limit == 0 { 0 } else { bits::matching_bits(a, b, bps) }
    };
    for i in 0..count {
        let seg1 = one.segment(i);
        let seg2 = two.segment(i);
        let (v1, v2) = (seg1.lower(), seg2.lower());
        match (local(one, i), local(two, i)) {
            (Some(p1), Some(p2)) if p2 <= p1 => {
                if matching(v1, v2, p2) < p2 {
                    return v1.cmp(&v2);
                }
                if p1 == p2 {
                    return Ordering::Equal;
                }
                return if seg1.is_one_bit(p2) {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            }
            (Some(p1), _) => {
                if matching(v1, v2, p1) < p1 {
                    return v1.cmp(&v2);
                }
                if p1 < bps {
                    return if seg2.is_one_bit(p1) {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    };
                }
                if i + 1 == count {
                    return Ordering::Greater;
                }
            }
            (None, Some(p2)) => {
                if matching(v1, v2, p2) < p2 {
                    return v1.cmp(&v2);
                }
                if p2 < bps {
                    return if seg1.is_one_bit(p2) {
                        Ordering::Greater
                    } else {
                        Ordering::Less
                    };
                }
                if i + 1 == count {
                    return Ordering::Less;
                }
            }
            (None, None) => {
                if v1 != v2 {
                    return v1.cmp(&v2);
                }
            }
        }
    }
    Ordering::Equal
}

/// Sorts addresses into trie order.
///
/// Every address must share one family and bit count; otherwise the
/// slice is left untouched and the mismatch is returned.
pub fn sort_for_trie(addresses: &mut [Address]) -> Result<(), IncompatibleAddressError> {
    if let Some((first, rest)) = addresses.split_first() {
        for address in rest {
            check_trie_compatible(first, address)?;
        }
    }
    addresses.sort_by(trie_order);
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
