#![cfg(test)]
use std::cmp::Ordering;

use addrkit_common::config::Config;
use addrkit_common::error::{AddressError, IncompatibleAddressError, SizeMismatchError};
use addrkit_common::family::Family;
use addrkit_core::{Address, AddressComparator, SegmentSeries, Section, SequentialRange, TrieKeyed};
use anyhow::Result;
use num_bigint::BigUint;

use super::logging;
use super::util::{range, v4, v4_ranges, v6};

/*************************************************************
                    Prefix-block algebra
**************************************************************/

#[test]
fn block_of_two_full_octets_has_prefix_sixteen() -> Result<()> {
    let section = Section::from_range_values(Family::Ipv4, 4, |i| [1, 2, 0, 0][i], |i| [1, 2, 255, 255][i], None)?;
    assert_eq!(section.min_prefix_len_for_block(), 16);
    assert_eq!(section.prefix_len_for_single_block(), Some(16));
    assert!(!section.is_prefix_block());

    let prefixed = section.set_prefix_len(16)?;
    assert!(prefixed.is_prefix_block());
    assert!(prefixed.is_single_prefix_block());
    assert_eq!(prefixed.count(), &BigUint::from(65536u32));
    Ok(())
}

#[test]
fn dropping_prefix_keeps_single_value() -> Result<()> {
    let section = Section::from_values(Family::Ipv4, 4, |i| [1, 2, 3, 4][i], Some(16))?;
    assert_eq!(section.prefix_len(), Some(16));
    let plain = section.without_prefix_len();
    assert_eq!(plain.prefix_len(), None);
    assert_eq!(plain.count(), &BigUint::from(1u32));
    assert_eq!(plain, section);
    Ok(())
}

#[test]
fn ipv6_slash_zero_counts_every_value() -> Result<()> {
    let everything = v6("::").set_prefix_len(0)?.to_prefix_block();
    assert!(everything.is_full_range());
    assert_eq!(everything.count(), &(BigUint::from(1u32) << 128));
    assert_eq!(everything.prefix_count(), BigUint::from(1u32));
    Ok(())
}

/*************************************************************
                    Sequential ranges
**************************************************************/

#[test]
fn span_of_odd_range_is_exact() {
    logging::init();
    let r = range(v4(1, 2, 3, 4), v4(1, 2, 4, 5));
    let blocks = r.span_with_prefix_blocks();
    let total: BigUint = blocks.iter().map(|b| b.count().clone()).sum();
    assert_eq!(total, BigUint::from(258u32));
    for block in &blocks {
        assert!(block.is_prefix_block());
        assert!(r.contains(block), "{block:?} escapes the range");
    }
    for pair in blocks.windows(2) {
        assert!(pair[0].upper_value() < pair[1].value());
    }
    assert_eq!(blocks.first().map(|b| b.value()), Some(r.lower().value()));
    assert_eq!(blocks.last().map(|b| b.upper_value()), Some(r.upper().value()));
}

#[test]
fn join_requires_overlap_or_adjacency() {
    let ten = |d| v4(0, 0, 0, d);
    let joined = range(ten(10), ten(20)).join_to(&range(ten(21), ten(30)));
    assert_eq!(joined, Some(range(ten(10), ten(30))));
    assert!(joined.is_some_and(|r| r.is_multiple()));
    assert_eq!(range(ten(10), ten(20)).join_to(&range(ten(22), ten(30))), None);
}

#[test]
fn join_at_top_of_space_does_not_wrap() {
    let top = range(v4(255, 255, 255, 0), v4(255, 255, 255, 255));
    let bottom = range(v4(0, 0, 0, 0), v4(0, 0, 0, 255));
    assert_eq!(top.join_to(&bottom), None);
    assert_eq!(SequentialRange::join(&[top.clone(), bottom.clone()]), vec![bottom, top]);
}

#[test]
fn merging_addresses_yields_minimal_blocks() -> Result<()> {
    logging::init();
    let inputs = [
        v4(10, 0, 0, 0).set_prefix_len(25)?.to_prefix_block(),
        v4(10, 0, 0, 128).set_prefix_len(25)?.to_prefix_block(),
        v4(10, 0, 1, 0),
        v4(10, 0, 1, 1),
    ];
    let merged = Address::merge_to_prefix_blocks(&inputs)?;
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].prefix_len(), Some(24));
    assert_eq!(merged[1].prefix_len(), Some(31));

    let sequential = Address::merge_to_sequential_blocks(&inputs)?;
    assert_eq!(sequential.len(), 2);
    assert_eq!(sequential[0].count(), &BigUint::from(256u32));
    Ok(())
}

#[test]
fn merging_mixed_operands_fails() {
    let mac = Address::from_mac_bytes(&[1, 2, 3, 4, 5, 6]).unwrap();
    let eui = Address::from_mac_bytes(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    assert_eq!(
        Address::merge_to_prefix_blocks(&[mac.clone(), eui]),
        Err(AddressError::SizeMismatch(SizeMismatchError { expected: 6, actual: 8 }))
    );
    assert!(matches!(
        Address::merge_to_sequential_blocks(&[mac, v4(1, 2, 3, 4)]),
        Err(AddressError::Incompatible(IncompatibleAddressError::FamilyMismatch { .. }))
    ));
}

#[test]
fn sparse_address_overlap_is_member_exact() {
    let r = range(v4(1, 2, 3, 250), v4(1, 2, 4, 5));
    assert!(!r.overlaps_address(&v4_ranges([(1, 1), (2, 2), (0, 255), (6, 6)])));
    assert!(r.overlaps_address(&v4_ranges([(1, 1), (2, 2), (0, 255), (5, 5)])));
    assert!(r.overlaps(&v4_ranges([(1, 1), (2, 2), (0, 255), (6, 6)]).to_sequential_range()));
}

/*************************************************************
                    Subnet algebra
**************************************************************/

#[test]
fn carving_one_host_out_of_an_ipv6_block() -> Result<()> {
    logging::init();
    let block = v6("2001:db8::").set_prefix_len(120)?.to_prefix_block();
    let host = v6("2001:db8::7");
    let pieces = block.subtract(&host)?;
    let total: BigUint = pieces.iter().map(|p| p.count().clone()).sum();
    assert_eq!(total, BigUint::from(255u32));
    for piece in &pieces {
        assert_eq!(piece.intersect(&host)?, None);
        assert!(piece.prefix_len().is_some_and(|p| p >= 120));
    }
    assert_eq!(block.enumerate(&host), Some(7.into()));
    assert_eq!(block.intersect(&host)?, Some(host));
    Ok(())
}

#[test]
fn host_and_network_parts_of_ipv6_prefix() -> Result<()> {
    let address = v6("2001:db8:1234::5").set_prefix_len(48)?;
    assert_eq!(address.to_zero_host()?, v6("2001:db8:1234::"));
    assert_eq!(address.to_max_host()?, v6("2001:db8:1234:ffff:ffff:ffff:ffff:ffff"));
    assert_eq!(address.to_zero_network(), v6("::5"));
    assert_eq!(address.network_mask(), v6("ffff:ffff:ffff::"));
    assert!(!address.includes_zero_host());
    assert!(address.to_prefix_block().includes_zero_host());
    assert!(address.prefix_contains(&v6("2001:db8:1234:ffff::1")));
    assert!(!address.prefix_contains(&v6("2001:db8:1235::")));
    Ok(())
}

#[test]
fn spanning_between_two_mac_addresses() -> Result<()> {
    let from = Address::from_mac_bytes(&[0, 0x11, 0x22, 0x33, 0x44, 0xfe])?;
    let to = Address::from_mac_bytes(&[0, 0x11, 0x22, 0x33, 0x46, 0x01])?;
    let range = from.span_with_range(&to)?;
    assert_eq!(range.count(), &BigUint::from(260u32));
    let blocks = from.span_with_sequential_blocks_to(&to)?;
    assert_eq!(blocks.len(), 3);
    let total: BigUint = blocks.iter().map(|b| b.count().clone()).sum();
    assert_eq!(&total, range.count());
    assert_eq!(from.span_with_prefix_blocks_to(&to)?, range.span_with_prefix_blocks());
    assert!(from.cover_with_prefix_block_to(&to)?.contains(&to));
    assert_eq!(range.enumerate(&to), Some(259.into()));
    Ok(())
}

/*************************************************************
                    Orderings
**************************************************************/

#[test]
fn fewer_values_sort_first_regardless_of_start() {
    let five = v4_ranges([(200, 200), (0, 0), (0, 0), (0, 4)]);
    let six = v4_ranges([(1, 1), (0, 0), (0, 0), (0, 5)]);
    assert_eq!(AddressComparator::COUNT.compare_addresses(&five, &six), Ordering::Less);
    assert_eq!(AddressComparator::COUNT.compare_addresses(&six, &five), Ordering::Greater);
    assert_eq!(AddressComparator::LOW_VALUE.compare_addresses(&five, &six), Ordering::Greater);
}

#[test]
fn sorting_with_config() {
    let mut batch = vec![v4(3, 0, 0, 0), v4(1, 0, 0, 0), v6("::1"), v4(1, 0, 0, 0)];
    addrkit_core::compare::sort_addresses(&mut batch, &Config::default());
    assert_eq!(batch, vec![v4(1, 0, 0, 0), v4(3, 0, 0, 0), v6("::1")]);
}

#[test]
fn trie_order_is_antisymmetric_for_neighbours() -> Result<()> {
    let items = [
        v4(1, 2, 3, 4),
        v4(1, 2, 3, 0).set_prefix_len(24)?.to_prefix_block(),
        v4(1, 2, 0, 0).set_prefix_len(16)?.to_prefix_block(),
        v4(1, 2, 128, 0).set_prefix_len(17)?.to_prefix_block(),
        v4(1, 2, 3, 4).set_prefix_len(32)?,
    ];
    for a in &items {
        for b in &items {
            assert_eq!(a.trie_compare(b)?, b.trie_compare(a)?.reverse());
        }
    }
    Ok(())
}

#[test]
fn views_expose_std_types() {
    let address = v4(192, 168, 1, 10);
    let view = address.as_ipv4().unwrap();
    assert_eq!(view.to_std(), std::net::Ipv4Addr::new(192, 168, 1, 10));
    assert!(address.as_ipv6().is_none());
    assert_eq!(v6("::1").as_ipv6().map(|v| v.to_u128()), Some(1));
}
