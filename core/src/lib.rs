//! # addrkit-core
//!
//! Set algebra over IPv4, IPv6 and MAC addresses, where every segment of
//! an address may hold a contiguous range of values.
//!
//! ## Layout
//! * **[`segment`]**: one segment value range and its bit-level queries.
//! * **[`series`]**: the prefix-block algebra shared by everything made of segments.
//! * **[`section`]** and **[`address`]**: immutable segment sequences, with
//!   prefix lengths, masking, reversal and block decomposition.
//! * **subnet**: intersection, subtraction, host and network parts,
//!   enumeration and spans between two operands.
//! * **[`iter`]**: lazy odometer iterators over values, prefixes and blocks.
//! * **[`range`]**: sequential ranges between two boundary addresses.
//! * **[`compare`]**: the count and value orderings.
//! * **[`trie`]**: trie keys and trie order for an external trie engine.

pub mod address;
mod block;
pub mod compare;
pub mod iter;
pub mod range;
pub mod section;
pub mod segment;
pub mod series;
mod span;
mod subnet;
pub mod trie;

pub use address::Address;
pub use compare::{AddressComparator, AddressItem};
pub use range::SequentialRange;
pub use section::Section;
pub use segment::SegmentRange;
pub use series::SegmentSeries;
pub use trie::{TrieKey, TrieKeyed};
