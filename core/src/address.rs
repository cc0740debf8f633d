//! # Addresses
//!
//! An [`Address`] is a [`Section`] of full address length for its family:
//! 4 octets for IPv4, 8 hextets for IPv6, 6 or 8 bytes for MAC. It may
//! still be multi-valued (`10.0.0.0/8` as a block, `1.2.*.4`).
//!
//! Read-only section queries are reached through `Deref`; the methods
//! defined here are the ones that must hand back an `Address` again.
//! Per-family accessors are exposed through typed views selected by the
//! family tag, see [`Address::as_ipv4`].

use std::hash::{Hash, Hasher};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::Deref;
use std::sync::OnceLock;

use addrkit_common::bits::{BitCount, SegInt};
use addrkit_common::error::{AddressError, AddressValueError, IncompatibleAddressError, SizeMismatchError};
use addrkit_common::family::Family;
use tracing::debug;

use crate::iter::SectionIter;
use crate::range::SequentialRange;
use crate::section::Section;
use crate::segment::SegmentRange;
use crate::series::SegmentSeries;
use crate::trie::TrieKey;

#[derive(Debug, Clone)]
pub struct Address {
    section: Section,
    trie_key: OnceLock<TrieKey>,
}

fn is_address_length(family: Family, segment_count: usize) -> bool {
    match family {
        Family::Mac => segment_count == 6 || segment_count == 8,
        other => segment_count == other.address_segment_count(),
    }
}

impl Address {
    /// Wraps a section whose segment count is a full address for its family.
    pub fn from_section(section: Section) -> Result<Self, AddressValueError> {
        if !is_address_length(section.family(), section.segment_count()) {
            return Err(AddressValueError::SegmentCount {
                family: section.family(),
                actual: section.segment_count(),
            });
        }
        Ok(Self::from_section_unchecked(section))
    }

    pub(crate) fn from_section_unchecked(section: Section) -> Self {
        Self {
            section,
            trie_key: OnceLock::new(),
        }
    }

    /// The zero-segment sentinel address.
    pub fn empty() -> Self {
        Self::from_section_unchecked(Section::empty())
    }

    /// Builds an address of the family's standard length from a packed value.
    pub fn from_value(family: Family, value: u128, prefix_len: Option<BitCount>) -> Result<Self, AddressValueError> {
        let section = Section::from_value(family, family.address_segment_count(), value, prefix_len)?;
        Ok(Self::from_section_unchecked(section))
    }

    pub(crate) fn from_bounds_unchecked(
        family: Family,
        segment_count: usize,
        lower: u128,
        upper: u128,
        prefix_len: Option<BitCount>,
    ) -> Self {
        Self::from_section_unchecked(Section::from_bounds_unchecked(
            family,
            segment_count,
            lower,
            upper,
            prefix_len,
        ))
    }

    /// A MAC address from 6 bytes, or an EUI-64 from 8.
    pub fn from_mac_bytes(bytes: &[u8]) -> Result<Self, AddressValueError> {
        let segments = bytes.len();
        if segments != 6 && segments != 8 {
            return Err(AddressValueError::ByteLength {
                family: Family::Mac,
                segments: 6,
                actual: segments,
            });
        }
        let section = Section::from_bytes(Family::Mac, segments, bytes, None)?;
        Ok(Self::from_section_unchecked(section))
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn into_section(self) -> Section {
        self.section
    }

    pub(crate) fn cached_trie_key(&self, build: impl FnOnce() -> TrieKey) -> &TrieKey {
        self.trie_key.get_or_init(build)
    }

    /// The IPv4 view, when this is an IPv4 address.
    pub fn as_ipv4(&self) -> Option<Ipv4View<'_>> {
        (self.family() == Family::Ipv4).then_some(Ipv4View(self))
    }

    pub fn as_ipv6(&self) -> Option<Ipv6View<'_>> {
        (self.family() == Family::Ipv6).then_some(Ipv6View(self))
    }

    pub fn as_mac(&self) -> Option<MacView<'_>> {
        (self.family() == Family::Mac).then_some(MacView(self))
    }

    fn wrap(&self, section: Section) -> Address {
        Self::from_section_unchecked(section)
    }

    pub fn lower(&self) -> Address {
        self.wrap(self.section.lower())
    }

    pub fn upper(&self) -> Address {
        self.wrap(self.section.upper())
    }

    pub fn to_prefix_block(&self) -> Address {
        self.wrap(self.section.to_prefix_block())
    }

    pub fn to_prefix_block_len(&self, prefix: BitCount) -> Address {
        self.wrap(self.section.to_prefix_block_len(prefix))
    }

    pub fn without_prefix_len(&self) -> Address {
        self.wrap(self.section.without_prefix_len())
    }

    pub fn set_prefix_len(&self, prefix: BitCount) -> Result<Address, AddressValueError> {
        Ok(self.wrap(self.section.set_prefix_len(prefix)?))
    }

    pub fn adjust_prefix_len(&self, delta: i32) -> Address {
        self.wrap(self.section.adjust_prefix_len(delta))
    }

    pub fn assign_min_prefix_for_block(&self) -> Address {
        self.wrap(self.section.assign_min_prefix_for_block())
    }

    pub fn assign_prefix_for_single_block(&self) -> Option<Address> {
        self.section
            .assign_prefix_for_single_block()
            .map(Self::from_section_unchecked)
    }

    pub fn to_block(&self, index: usize, lower: SegInt, upper: SegInt) -> Result<Address, AddressValueError> {
        Ok(self.wrap(self.section.to_block(index, lower, upper)?))
    }

    pub fn increment(&self, n: i64) -> Option<Address> {
        self.section.increment(n).map(Self::from_section_unchecked)
    }

    pub fn mask(&self, mask: &Address) -> Result<Address, AddressError> {
        Ok(self.wrap(self.section.mask(&mask.section)?))
    }

    pub fn cover_with_prefix_block(&self) -> Address {
        self.wrap(self.section.cover_with_prefix_block())
    }

    pub fn span_with_prefix_blocks(&self) -> Vec<Address> {
        self.section
            .span_with_prefix_blocks()
            .into_iter()
            .map(Self::from_section_unchecked)
            .collect()
    }

    pub fn span_with_sequential_blocks(&self) -> Vec<Address> {
        self.section
            .span_with_sequential_blocks()
            .into_iter()
            .map(Self::from_section_unchecked)
            .collect()
    }

    pub fn intersect(&self, other: &Address) -> Result<Option<Address>, AddressError> {
        Ok(self
            .section
            .intersect(&other.section)?
            .map(Self::from_section_unchecked))
    }

    pub fn subtract(&self, other: &Address) -> Result<Vec<Address>, AddressError> {
        Ok(self.wrap_all(self.section.subtract(&other.section)?))
    }

    pub fn network_mask(&self) -> Address {
        self.wrap(self.section.network_mask())
    }

    pub fn host_mask(&self) -> Address {
        self.wrap(self.section.host_mask())
    }

    pub fn to_zero_host(&self) -> Result<Address, IncompatibleAddressError> {
        Ok(self.wrap(self.section.to_zero_host()?))
    }

    pub fn to_zero_host_len(&self, prefix: BitCount) -> Result<Address, IncompatibleAddressError> {
        Ok(self.wrap(self.section.to_zero_host_len(prefix)?))
    }

    pub fn to_max_host(&self) -> Result<Address, IncompatibleAddressError> {
        Ok(self.wrap(self.section.to_max_host()?))
    }

    pub fn to_max_host_len(&self, prefix: BitCount) -> Result<Address, IncompatibleAddressError> {
        Ok(self.wrap(self.section.to_max_host_len(prefix)?))
    }

    pub fn to_zero_network(&self) -> Address {
        self.wrap(self.section.to_zero_network())
    }

    /// The sequential range from the lowest to the highest value of
    /// either operand.
    pub fn span_with_range(&self, other: &Address) -> Result<SequentialRange, AddressError> {
        SequentialRange::new(self, other)
    }

    pub fn cover_with_prefix_block_to(&self, other: &Address) -> Result<Address, AddressError> {
        Ok(self.wrap(self.section.cover_with_prefix_block_to(&other.section)?))
    }

    pub fn span_with_prefix_blocks_to(&self, other: &Address) -> Result<Vec<Address>, AddressError> {
        Ok(self.wrap_all(self.section.span_with_prefix_blocks_to(&other.section)?))
    }

    pub fn span_with_sequential_blocks_to(&self, other: &Address) -> Result<Vec<Address>, AddressError> {
        Ok(self.wrap_all(self.section.span_with_sequential_blocks_to(&other.section)?))
    }

    fn wrap_all(&self, sections: Vec<Section>) -> Vec<Address> {
        sections.into_iter().map(Self::from_section_unchecked).collect()
    }

    /// The sequential range from the lower to the upper value.
    ///
    /// For a non-sequential address such as `1.2.*.4` the range also
    /// holds values outside the address.
    pub fn to_sequential_range(&self) -> SequentialRange {
        SequentialRange::from_bounds(self.family(), self.segment_count(), self.value(), self.upper_value())
    }

    pub fn iter(&self) -> AddressIter {
        AddressIter(self.section.iter())
    }

    pub fn iter_excluding<F>(&self, exclude: F) -> AddressIter
    where
        F: Fn(&[SegmentRange]) -> bool + Send + 'static,
    {
        AddressIter(self.section.iter_excluding(exclude))
    }

    pub fn non_zero_host_iter(&self) -> AddressIter {
        AddressIter(self.section.non_zero_host_iter())
    }

    pub fn prefix_iter(&self) -> AddressIter {
        AddressIter(self.section.prefix_iter())
    }

    pub fn prefix_block_iter(&self) -> AddressIter {
        AddressIter(self.section.prefix_block_iter())
    }

    pub fn block_iter(&self, segment_count: usize) -> AddressIter {
        AddressIter(self.section.block_iter(segment_count))
    }

    pub fn sequential_block_iter(&self) -> AddressIter {
        AddressIter(self.section.sequential_block_iter())
    }

    /// Merges the operands into the fewest prefix blocks covering exactly
    /// the same values.
    pub fn merge_to_prefix_blocks(addresses: &[Address]) -> Result<Vec<Address>, AddressError> {
        let ranges = Self::merged_ranges(addresses)?;
        let blocks: Vec<Address> = ranges
            .iter()
            .flat_map(SequentialRange::span_with_prefix_blocks)
            .collect();
        debug!(inputs = addresses.len(), blocks = blocks.len(), "merged to prefix blocks");
        Ok(blocks)
    }

    /// Merges the operands into the fewest sequential blocks covering
    /// exactly the same values.
    pub fn merge_to_sequential_blocks(addresses: &[Address]) -> Result<Vec<Address>, AddressError> {
        let ranges = Self::merged_ranges(addresses)?;
        let blocks: Vec<Address> = ranges
            .iter()
            .flat_map(SequentialRange::span_with_sequential_blocks)
            .collect();
        debug!(inputs = addresses.len(), blocks = blocks.len(), "merged to sequential blocks");
        Ok(blocks)
    }

    fn merged_ranges(addresses: &[Address]) -> Result<Vec<SequentialRange>, AddressError> {
        let Some(first) = addresses.first() else {
            return Ok(Vec::new());
        };
        for other in &addresses[1..] {
            if other.family() != first.family() {
                return Err(IncompatibleAddressError::FamilyMismatch {
                    left: first.family(),
                    right: other.family(),
                }
                .into());
            }
            if other.segment_count() != first.segment_count() {
                return Err(SizeMismatchError {
                    expected: first.segment_count(),
                    actual: other.segment_count(),
                }
                .into());
            }
        }
        let ranges: Vec<SequentialRange> = addresses
            .iter()
            .flat_map(|a| a.section.without_prefix_len().sequential_block_iter())
            .map(|block| SequentialRange::from_bounds(block.family(), block.segment_count(), block.value(), block.upper_value()))
            .collect();
        Ok(SequentialRange::join(&ranges))
    }
}

impl Deref for Address {
    type Target = Section;

    fn deref(&self) -> &Section {
        &self.section
    }
}

impl SegmentSeries for Address {
    fn family(&self) -> Family {
        self.section.family()
    }

    fn segment_count(&self) -> usize {
        self.section.segment_count()
    }

    fn segment(&self, index: usize) -> SegmentRange {
        self.section.segment(index)
    }

    fn prefix_len(&self) -> Option<BitCount> {
        self.section.prefix_len()
    }

    fn is_multiple(&self) -> bool {
        self.section.is_multiple()
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.section == other.section
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.section.hash(state);
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Ipv4Addr> for Address {
    fn from(addr: Ipv4Addr) -> Self {
        Self::from_bounds_unchecked(Family::Ipv4, 4, u128::from(addr.to_bits()), u128::from(addr.to_bits()), None)
    }
}

impl From<Ipv6Addr> for Address {
    fn from(addr: Ipv6Addr) -> Self {
        Self::from_bounds_unchecked(Family::Ipv6, 8, addr.to_bits(), addr.to_bits(), None)
    }
}

impl From<IpAddr> for Address {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

/// Iterator over addresses, produced by the iteration methods of [`Address`].
pub struct AddressIter(SectionIter);

impl Iterator for AddressIter {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        self.0.next().map(Address::from_section_unchecked)
    }
}

/// IPv4 accessors of an [`Address`].
#[derive(Debug, Clone, Copy)]
pub struct Ipv4View<'a>(&'a Address);

impl Ipv4View<'_> {
    pub fn to_u32(&self) -> u32 {
        self.0.value() as u32
    }

    pub fn upper_u32(&self) -> u32 {
        self.0.upper_value() as u32
    }

    /// The lower value as a standard library address.
    pub fn to_std(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits(self.to_u32())
    }

    pub fn upper_std(&self) -> Ipv4Addr {
        Ipv4Addr::from_bits(self.upper_u32())
    }

    pub fn octets(&self) -> [u8; 4] {
        self.to_u32().to_be_bytes()
    }
}

/// IPv6 accessors of an [`Address`].
#[derive(Debug, Clone, Copy)]
pub struct Ipv6View<'a>(&'a Address);

impl Ipv6View<'_> {
    pub fn to_u128(&self) -> u128 {
        self.0.value()
    }

    pub fn upper_u128(&self) -> u128 {
        self.0.upper_value()
    }

    pub fn to_std(&self) -> Ipv6Addr {
        Ipv6Addr::from_bits(self.to_u128())
    }

    pub fn upper_std(&self) -> Ipv6Addr {
        Ipv6Addr::from_bits(self.upper_u128())
    }

    /// High and low 64-bit halves of the lower value.
    pub fn to_u64_pair(&self) -> (u64, u64) {
        let value = self.to_u128();
        ((value >> 64) as u64, value as u64)
    }
}

/// MAC accessors of an [`Address`].
#[derive(Debug, Clone, Copy)]
pub struct MacView<'a>(&'a Address);

impl MacView<'_> {
    /// Whether this is the 8-byte EUI-64 form.
    pub fn is_eui64(&self) -> bool {
        self.0.segment_count() == 8
    }

    pub fn to_u64(&self) -> u64 {
        self.0.value() as u64
    }

    pub fn octets(&self) -> Vec<u8> {
        self.0.bytes()
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
