#![cfg(test)]
use std::net::{Ipv4Addr, Ipv6Addr};

use addrkit_common::family::Family;
use addrkit_core::{Address, Section, SequentialRange};
use rand::Rng;

pub fn v4(a: u8, b: u8, c: u8, d: u8) -> Address {
    Ipv4Addr::new(a, b, c, d).into()
}

pub fn v6(s: &str) -> Address {
    s.parse::<Ipv6Addr>().unwrap().into()
}

/// An IPv4 address with each octet spanning the given bounds.
pub fn v4_ranges(octets: [(u32, u32); 4]) -> Address {
    let section = Section::from_range_values(Family::Ipv4, 4, |i| octets[i].0, |i| octets[i].1, None).unwrap();
    Address::from_section(section).unwrap()
}

pub fn range(lower: Address, upper: Address) -> SequentialRange {
    SequentialRange::new(&lower, &upper).unwrap()
}

/// A random IPv4 address whose octets span at most `width + 1` values each.
pub fn random_v4(rng: &mut impl Rng, width: u32) -> Address {
    let mut octets = [(0, 0); 4];
    for octet in &mut octets {
        let lower = rng.random_range(0..=255u32);
        let upper = (lower + rng.random_range(0..=width)).min(255);
        *octet = (lower, upper);
    }
    v4_ranges(octets)
}

/// A random IPv4 range spanning at most `span + 1` addresses.
pub fn random_v4_range(rng: &mut impl Rng, span: u32) -> SequentialRange {
    let lower: u32 = rng.random();
    let upper = lower.saturating_add(rng.random_range(0..=span));
    range(Ipv4Addr::from_bits(lower).into(), Ipv4Addr::from_bits(upper).into())
}

/// A random address whose leading segments are single values and whose
/// last two segments span at most `width + 1` values each.
fn random_tail_ranges(rng: &mut impl Rng, family: Family, segments: usize, width: u32) -> Address {
    let max = (1u32 << family.bits_per_segment()) - 1;
    let mut bounds = vec![(0, 0); segments];
    for (i, bound) in bounds.iter_mut().enumerate() {
        let lower = rng.random_range(0..=max);
        let upper = if i + 2 >= segments {
            (lower + rng.random_range(0..=width)).min(max)
        } else {
            lower
        };
        *bound = (lower, upper);
    }
    let section = Section::from_range_values(family, segments, |i| bounds[i].0, |i| bounds[i].1, None).unwrap();
    Address::from_section(section).unwrap()
}

pub fn random_v6(rng: &mut impl Rng, width: u32) -> Address {
    random_tail_ranges(rng, Family::Ipv6, 8, width)
}

/// A random EUI-64 address, see [`random_v6`] for the shape.
pub fn random_eui64(rng: &mut impl Rng, width: u32) -> Address {
    random_tail_ranges(rng, Family::Mac, 8, width)
}

/// A random IPv6 range spanning at most `span + 1` addresses.
pub fn random_v6_range(rng: &mut impl Rng, span: u64) -> SequentialRange {
    let lower: u128 = rng.random();
    let upper = lower.saturating_add(u128::from(rng.random_range(0..=span)));
    range(Ipv6Addr::from_bits(lower).into(), Ipv6Addr::from_bits(upper).into())
}
