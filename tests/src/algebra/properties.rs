#![cfg(test)]
use std::cmp::Ordering;

use addrkit_core::{Address, AddressComparator, SegmentSeries, SequentialRange, TrieKeyed};
use anyhow::Result;
use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::logging;
use super::util::{random_eui64, random_v4, random_v4_range, random_v6, random_v6_range, v4_ranges};

const SEED: u64 = 0x00ad_d2e5;

/*************************************************************
                    Prefix blocks
**************************************************************/

#[test]
fn prefix_block_contains_its_prefix() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..500 {
        let address = random_v4(&mut rng, 40);
        let prefix = rng.random_range(0..=32);
        let block = address.to_prefix_block_len(prefix);
        assert!(block.contains_prefix_block(prefix), "{block:?} /{prefix}");
        assert!(block.min_prefix_len_for_block() <= prefix);
        assert!(block.contains(&address));
        assert_eq!(block.to_prefix_block(), block);
    }
    Ok(())
}

/*************************************************************
                    Iteration
**************************************************************/

#[test]
fn iteration_yields_count_single_members() {
    logging::init();
    let mut rng = StdRng::seed_from_u64(SEED + 1);
    for _ in 0..50 {
        let address = random_v4(&mut rng, 3);
        let mut seen = 0u64;
        for member in address.iter() {
            assert!(!member.is_multiple());
            assert!(address.contains(&member));
            seen += 1;
        }
        assert_eq!(&BigUint::from(seen), address.count());
    }
}

#[test]
fn prefix_blocks_partition_sequential_ranges() {
    let mut rng = StdRng::seed_from_u64(SEED + 2);
    for _ in 0..200 {
        let r = random_v4_range(&mut rng, 5000);
        let blocks = r.span_with_prefix_blocks();
        let total: BigUint = blocks.iter().map(|b| b.count().clone()).sum();
        assert_eq!(&total, r.count());
        assert!(blocks.iter().all(|b| r.contains(b)));
        let cover = r.cover_with_prefix_block();
        assert!(blocks.iter().all(|b| cover.contains(b)));
    }
}

#[test]
fn prefix_iterators_partition_ipv6_and_mac() {
    let mut rng = StdRng::seed_from_u64(SEED + 8);
    for round in 0..200 {
        let address = if round % 2 == 0 {
            random_v6(&mut rng, 0x30)
        } else {
            random_eui64(&mut rng, 0x30)
        };
        let bit_count = address.bit_count();
        let bps = address.bits_per_segment();
        let prefix = rng.random_range(bit_count - 2 * bps..=bit_count);
        let prefixed = address.set_prefix_len(prefix).unwrap();

        let blocks: Vec<Address> = prefixed.prefix_block_iter().collect();
        let parts: Vec<Address> = prefixed.prefix_iter().collect();
        assert_eq!(BigUint::from(blocks.len()), prefixed.prefix_count());
        assert_eq!(blocks.len(), parts.len());
        for (block, part) in blocks.iter().zip(&parts) {
            assert!(block.contains_single_prefix_block(prefix), "{block:?} /{prefix}");
            assert!(block.contains(part));
            assert!(address.contains(part));
        }
        let total: BigUint = parts.iter().map(|p| p.count().clone()).sum();
        assert_eq!(&total, address.count());
        assert!(address.min_prefix_len_for_block() >= bit_count - 2 * bps);
        if let Some(single) = address.prefix_len_for_single_block() {
            assert!(address.contains_single_prefix_block(single));
        }
    }
}

#[test]
fn prefix_blocks_partition_ipv6_ranges() {
    let mut rng = StdRng::seed_from_u64(SEED + 9);
    for _ in 0..200 {
        let r = random_v6_range(&mut rng, 1 << 40);
        let blocks = r.span_with_prefix_blocks();
        let total: BigUint = blocks.iter().map(|b| b.count().clone()).sum();
        assert_eq!(&total, r.count());
        assert!(blocks.iter().all(|b| r.contains(b) && b.is_single_prefix_block()));
        for pair in blocks.windows(2) {
            assert_eq!(pair[0].upper_value() + 1, pair[1].value());
        }
    }
}

/*************************************************************
                    Count ordering
**************************************************************/

#[test]
fn count_order_is_total() {
    let mut rng = StdRng::seed_from_u64(SEED + 3);
    let sample: Vec<Address> = (0..60).map(|_| random_v4(&mut rng, 2)).collect();
    let cmp = |a: &Address, b: &Address| AddressComparator::COUNT.compare_addresses(a, b);
    for a in &sample {
        assert_eq!(cmp(a, a), Ordering::Equal);
        for b in &sample {
            assert_eq!(cmp(a, b), cmp(b, a).reverse());
            for c in &sample {
                if cmp(a, b).is_le() && cmp(b, c).is_le() {
                    assert!(cmp(a, c).is_le(), "{a:?} {b:?} {c:?}");
                }
            }
        }
    }
}

/*************************************************************
                    Range set algebra
**************************************************************/

#[test]
fn subtract_and_intersect_rebuild_the_range() {
    let mut rng = StdRng::seed_from_u64(SEED + 4);
    for _ in 0..500 {
        let a = random_v4_range(&mut rng, 1 << 20);
        let b = if rng.random_bool(0.5) {
            random_v4_range(&mut rng, 1 << 20)
        } else {
            let start = a.lower().as_ipv4().map_or(0, |v| v.to_u32());
            let offset = rng.random_range(0..=4096u32);
            let from = std::net::Ipv4Addr::from_bits(start.saturating_add(offset));
            let to = std::net::Ipv4Addr::from_bits(start.saturating_add(offset).saturating_add(rng.random_range(0..=8192)));
            SequentialRange::new(&from.into(), &to.into()).unwrap()
        };
        let mut parts = a.subtract(&b);
        parts.extend(a.intersect(&b));
        let total: BigUint = parts.iter().map(|p| p.count().clone()).sum();
        assert_eq!(&total, a.count());
        assert!(parts.iter().all(|p| a.contains_range(p)));
        let rejoined = SequentialRange::join(&parts);
        assert_eq!(rejoined, vec![a.clone()]);
    }
}

#[test]
fn section_subtract_and_intersect_partition_the_section() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED + 10);
    for _ in 0..300 {
        let a = random_v4(&mut rng, 12);
        let b = if rng.random_bool(0.2) {
            random_v4(&mut rng, 12)
        } else {
            let mut octets = [(0, 0); 4];
            for (i, octet) in octets.iter_mut().enumerate() {
                let s = a.segment(i);
                let lower = rng.random_range(s.lower().saturating_sub(3)..=s.upper());
                *octet = (lower, (lower + rng.random_range(0..=8)).min(255));
            }
            v4_ranges(octets)
        };
        let mut parts = a.subtract(&b)?;
        parts.extend(a.intersect(&b)?);
        let total: BigUint = parts.iter().map(|p| p.count().clone()).sum();
        assert_eq!(&total, a.count(), "{a:?} - {b:?}");
        for (i, p) in parts.iter().enumerate() {
            assert!(a.contains(p));
            assert!(parts[i + 1..].iter().all(|q| !p.overlaps(q)));
        }
    }
    Ok(())
}

#[test]
fn join_covers_every_input() {
    logging::init();
    let mut rng = StdRng::seed_from_u64(SEED + 5);
    let inputs: Vec<SequentialRange> = (0..300).map(|_| random_v4_range(&mut rng, 1 << 24)).collect();
    let joined = SequentialRange::join(&inputs);
    for r in &inputs {
        assert_eq!(joined.iter().filter(|j| j.contains_range(r)).count(), 1);
    }
    for pair in joined.windows(2) {
        assert!(pair[0].join_to(&pair[1]).is_none());
    }
}

/*************************************************************
                    Trie order
**************************************************************/

#[test]
fn trie_order_antisymmetric_on_mixed_ranges() {
    let mut rng = StdRng::seed_from_u64(SEED + 6);
    let sample: Vec<Address> = (0..120)
        .map(|_| {
            let address = random_v4(&mut rng, 8);
            match rng.random_range(0..3) {
                0 => address,
                1 => address.assign_min_prefix_for_block(),
                _ => address.to_prefix_block_len(rng.random_range(0..=32)),
            }
        })
        .collect();
    for a in &sample {
        for b in &sample {
            assert_eq!(a.trie_compare(b).unwrap(), b.trie_compare(a).unwrap().reverse());
        }
    }
}

#[test]
fn trie_order_transitive_on_singles_and_blocks() {
    let mut rng = StdRng::seed_from_u64(SEED + 7);
    let sample: Vec<Address> = (0..40)
        .map(|_| {
            let value: u32 = rng.random_range(0..1024u32) << 20;
            let address: Address = std::net::Ipv4Addr::from_bits(value).into();
            if rng.random_bool(0.5) {
                address
            } else {
                address.to_prefix_block_len(rng.random_range(0..=14))
            }
        })
        .collect();
    let cmp = |a: &Address, b: &Address| a.trie_compare(b).unwrap();
    for a in &sample {
        for b in &sample {
            for c in &sample {
                if cmp(a, b).is_le() && cmp(b, c).is_le() {
                    assert!(cmp(a, c).is_le(), "{a:?} {b:?} {c:?}");
                }
            }
        }
    }
}
