//! # Ordering
//!
//! Total orders over every kind of address item. An [`AddressComparator`]
//! is a stateless strategy: the count ordering (the default, and the one
//! behind `Ord`) sorts by structure and then by how many values an item
//! holds, the value orderings sort by boundary values alone.
//!
//! Items of different kinds never compare equal. Segments sort below
//! sequential ranges, ranges below sections, sections below addresses.
//! Within a kind, the family rank and the bit count come first, so an
//! IPv4 item always precedes an IPv6 one.

use std::cmp::Ordering;

use addrkit_common::config::{self, Config};
use rayon::prelude::*;
use tracing::debug;

use crate::address::Address;
use crate::range::SequentialRange;
use crate::section::Section;
use crate::segment::SegmentRange;
use crate::series::SegmentSeries;

/// Any item a comparator can order.
#[derive(Debug, Clone, Copy)]
pub enum AddressItem<'a> {
    Segment(&'a SegmentRange),
    Range(&'a SequentialRange),
    Section(&'a Section),
    Address(&'a Address),
}

impl AddressItem<'_> {
    fn kind_rank(&self) -> u8 {
        match self {
            AddressItem::Segment(_) => 0,
            AddressItem::Range(_) => 1,
            AddressItem::Section(_) => 2,
            AddressItem::Address(_) => 3,
        }
    }
}

impl<'a> From<&'a SegmentRange> for AddressItem<'a> {
    fn from(segment: &'a SegmentRange) -> Self {
        AddressItem::Segment(segment)
    }
}

impl<'a> From<&'a SequentialRange> for AddressItem<'a> {
    fn from(range: &'a SequentialRange) -> Self {
        AddressItem::Range(range)
    }
}

impl<'a> From<&'a Section> for AddressItem<'a> {
    fn from(section: &'a Section) -> Self {
        AddressItem::Section(section)
    }
}

impl<'a> From<&'a Address> for AddressItem<'a> {
    fn from(address: &'a Address) -> Self {
        AddressItem::Address(address)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressComparator {
    /// Structural rank, bit count, number of values, then the values.
    #[default]
    Count,
    /// Compares one boundary first and the other on a tie.
    ///
    /// With `compare_high_value` the upper boundary is primary. With
    /// `flip_second` the tie-break on the other boundary is reversed.
    Value { compare_high_value: bool, flip_second: bool },
}

impl AddressComparator {
    pub const COUNT: AddressComparator = AddressComparator::Count;
    pub const LOW_VALUE: AddressComparator = AddressComparator::Value {
        compare_high_value: false,
        flip_second: false,
    };
    pub const HIGH_VALUE: AddressComparator = AddressComparator::Value {
        compare_high_value: true,
        flip_second: false,
    };
    pub const REVERSE_LOW_VALUE: AddressComparator = AddressComparator::Value {
        compare_high_value: false,
        flip_second: true,
    };
    pub const REVERSE_HIGH_VALUE: AddressComparator = AddressComparator::Value {
        compare_high_value: true,
        flip_second: true,
    };

    pub fn from_ordering(ordering: config::Ordering) -> Self {
        match ordering {
            config::Ordering::Count => Self::COUNT,
            config::Ordering::LowValue => Self::LOW_VALUE,
            config::Ordering::HighValue => Self::HIGH_VALUE,
            config::Ordering::ReverseLowValue => Self::REVERSE_LOW_VALUE,
            config::Ordering::ReverseHighValue => Self::REVERSE_HIGH_VALUE,
        }
    }

    /// Orders any two items, of the same kind or not.
    pub fn compare(&self, one: AddressItem<'_>, two: AddressItem<'_>) -> Ordering {
        match (one, two) {
            (AddressItem::Segment(a), AddressItem::Segment(b)) => self.compare_segments(a, b),
            (AddressItem::Range(a), AddressItem::Range(b)) => self.compare_ranges(a, b),
            (AddressItem::Section(a), AddressItem::Section(b)) => self.compare_sections(a, b),
            (AddressItem::Address(a), AddressItem::Address(b)) => self.compare_addresses(a, b),
            _ => one.kind_rank().cmp(&two.kind_rank()),
        }
    }

    pub fn compare_segments(&self, one: &SegmentRange, two: &SegmentRange) -> Ordering {
        one.bit_count().cmp(&two.bit_count()).then_with(|| {
            self.compare_bounds(
                (u128::from(one.lower()), u128::from(one.upper())),
                (u128::from(two.lower()), u128::from(two.upper())),
            )
        })
    }

    pub fn compare_sections(&self, one: &Section, two: &Section) -> Ordering {
        one.family()
            .section_rank()
            .cmp(&two.family().section_rank())
            .then_with(|| one.bit_count().cmp(&two.bit_count()))
            .then_with(|| match self {
                AddressComparator::Count => compare_count(one, two).then_with(|| {
                    one.segments()
                        .iter()
                        .zip(two.segments())
                        .map(|(a, b)| self.compare_segments(a, b))
                        .find(|o| o.is_ne())
                        .unwrap_or(Ordering::Equal)
                }),
                AddressComparator::Value { .. } => {
                    self.compare_bounds((one.value(), one.upper_value()), (two.value(), two.upper_value()))
                }
            })
    }

    /// Addresses compare as their sections; the prefix length plays no part.
    pub fn compare_addresses(&self, one: &Address, two: &Address) -> Ordering {
        self.compare_sections(one.section(), two.section())
    }

    pub fn compare_ranges(&self, one: &SequentialRange, two: &SequentialRange) -> Ordering {
        one.family()
            .range_rank()
            .cmp(&two.family().range_rank())
            .then_with(|| one.bit_count().cmp(&two.bit_count()))
            .then_with(|| self.compare_bounds(one.bounds(), two.bounds()))
    }

    /// Compares two `(lower, upper)` boundary pairs.
    fn compare_bounds(&self, one: (u128, u128), two: (u128, u128)) -> Ordering {
        let (one_lower, one_upper) = one;
        let (two_lower, two_upper) = two;
        match *self {
            AddressComparator::Count => (one_upper - one_lower)
                .cmp(&(two_upper - two_lower))
                .then_with(|| one_lower.cmp(&two_lower)),
            AddressComparator::Value {
                compare_high_value,
                flip_second,
            } => {
                let (primary, secondary) = if compare_high_value {
                    (one_upper.cmp(&two_upper), one_lower.cmp(&two_lower))
                } else {
                    (one_lower.cmp(&two_lower), one_upper.cmp(&two_upper))
                };
                primary.then(if flip_second { secondary.reverse() } else { secondary })
            }
        }
    }
}

/// Single-valued items before multi-valued ones, then by number of values.
fn compare_count(one: &Section, two: &Section) -> Ordering {
    match (one.is_multiple(), two.is_multiple()) {
        (false, false) => Ordering::Equal,
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => one.count().cmp(two.count()),
    }
}

/// Sorts a batch with the configured ordering, dropping duplicates when
/// `config.dedup` is set.
pub fn sort_addresses(addresses: &mut Vec<Address>, config: &Config) {
    let comparator = AddressComparator::from_ordering(config.ordering);
    if config.is_parallel(addresses.len()) {
        addresses.par_sort_by(|a, b| comparator.compare_addresses(a, b));
    } else {
        addresses.sort_by(|a, b| comparator.compare_addresses(a, b));
    }
    if config.dedup {
        let before = addresses.len();
        addresses.dedup_by(|a, b| comparator.compare_addresses(a, b).is_eq());
        debug!(removed = before - addresses.len(), "deduplicated sorted addresses");
    }
}

impl PartialOrd for Section {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Section {
    fn cmp(&self, other: &Self) -> Ordering {
        AddressComparator::COUNT.compare_sections(self, other)
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        AddressComparator::COUNT.compare_addresses(self, other)
    }
}

impl PartialOrd for SequentialRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SequentialRange {
    fn cmp(&self, other: &Self) -> Ordering {
        AddressComparator::COUNT.compare_ranges(self, other)
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
