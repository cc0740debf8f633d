//! # Address Families
//!
//! The discriminant carried by every section and address. Per-family
//! geometry (segment width, segment count, rank in the count ordering)
//! lives here so the algebra never has to branch on concrete types.

use std::fmt;

use crate::bits::BitCount;

/// The kind of address a section belongs to.
///
/// `Empty` is the sentinel produced for zero-segment sections; it
/// orders below every real family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Empty,
    Mac,
    Ipv4,
    Ipv6,
}

impl Family {
    /// Bit width of a single segment.
    pub fn bits_per_segment(self) -> BitCount {
        match self {
            Family::Empty => 0,
            Family::Mac | Family::Ipv4 => 8,
            Family::Ipv6 => 16,
        }
    }

    pub fn bytes_per_segment(self) -> usize {
        (self.bits_per_segment() as usize).div_ceil(8)
    }

    /// Segment count of a full address of this family.
    ///
    /// MAC addresses come in 6 and 8 segment flavours, the shorter one is
    /// reported here.
    pub fn address_segment_count(self) -> usize {
        match self {
            Family::Empty => 0,
            Family::Mac => 6,
            Family::Ipv4 => 4,
            Family::Ipv6 => 8,
        }
    }

    /// Structural rank used by the count ordering for sections and addresses.
    pub fn section_rank(self) -> i32 {
        match self {
            Family::Ipv6 => 7,
            Family::Ipv4 => 6,
            Family::Mac => 4,
            Family::Empty => -4,
        }
    }

    /// Structural rank used by the count ordering for sequential ranges.
    pub fn range_rank(self) -> i32 {
        match self {
            Family::Ipv6 => 2,
            Family::Ipv4 => 1,
            Family::Mac | Family::Empty => 0,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Empty => "empty",
            Family::Mac => "MAC",
            Family::Ipv4 => "IPv4",
            Family::Ipv6 => "IPv6",
        };
        f.write_str(name)
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
