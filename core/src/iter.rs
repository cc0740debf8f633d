//! # Section Iterators
//!
//! Lazy enumeration of the members, prefixes and blocks of a
//! multi-valued section. A section is a cartesian product of segment
//! ranges, so every iterator here is an **odometer**: one cursor per
//! segment position, the last position turning fastest. Nothing is
//! materialised beyond the element being yielded.
//!
//! Iterators are one-shot. Ask the section for a fresh one to traverse
//! again.

mod odometer;
pub(crate) mod range;
mod segment;

use addrkit_common::bits;
use num_traits::One;
use tracing::trace;

use crate::section::Section;
use crate::segment::SegmentRange;
use crate::series::SegmentSeries;

use odometer::{Exclusion, Odometer};
use segment::SegmentMode;

/// Iterator over sections, produced by the iteration methods of [`Section`].
pub struct SectionIter {
    inner: Inner,
}

enum Inner {
    Single(Option<Section>),
    Odometer(Odometer),
}

impl SectionIter {
    fn single(section: Section) -> Self {
        Self {
            inner: Inner::Single(Some(section)),
        }
    }

    fn empty() -> Self {
        Self {
            inner: Inner::Single(None),
        }
    }

    fn odometer(section: &Section, plan: Vec<(SegmentRange, SegmentMode)>, exclude: Option<Exclusion>) -> Self {
        Self {
            inner: Inner::Odometer(Odometer::new(section.family(), section.prefix_len(), plan, exclude)),
        }
    }
}

impl Iterator for SectionIter {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        match &mut self.inner {
            Inner::Single(section) => section.take(),
            Inner::Odometer(odometer) => odometer.next(),
        }
    }
}

impl Section {
    /// Every individual value, in ascending order.
    pub fn iter(&self) -> SectionIter {
        self.build_iter(None)
    }

    /// Every individual value for which `exclude` returns false.
    ///
    /// The predicate sees the candidate's single-valued segments.
    pub fn iter_excluding<F>(&self, exclude: F) -> SectionIter
    where
        F: Fn(&[SegmentRange]) -> bool + Send + 'static,
    {
        self.build_iter(Some(Box::new(exclude)))
    }

    fn build_iter(&self, exclude: Option<Exclusion>) -> SectionIter {
        if !self.is_multiple() {
            if exclude.as_ref().is_some_and(|f| f(self.segments())) {
                return SectionIter::empty();
            }
            // the clone shares the segment storage
            return SectionIter::single(self.clone());
        }
        let plan = self
            .segments()
            .iter()
            .map(|&s| (s, SegmentMode::Full))
            .collect();
        SectionIter::odometer(self, plan, exclude)
    }

    /// Every value whose host bits are not all zero.
    ///
    /// Without a prefix length, or when the prefix covers every bit, this
    /// is the same as [`iter`](Section::iter).
    pub fn non_zero_host_iter(&self) -> SectionIter {
        let Some(prefix) = self.prefix_len() else {
            return self.iter();
        };
        if prefix >= self.bit_count() {
            return self.iter();
        }
        let bps = self.bits_per_segment();
        let host_index = bits::host_segment_index(prefix, bps);
        self.iter_excluding(move |segments| {
            segments.iter().enumerate().skip(host_index).all(|(i, s)| {
                let local = bits::segment_prefix_len(i, bps, prefix).unwrap_or(bps);
                s.lower() & bits::host_mask(local, bps) == 0
            })
        })
    }

    /// One element per prefix value of the assigned prefix length, each
    /// holding the members of this section that share that prefix.
    ///
    /// The first and last elements need not be full prefix blocks.
    pub fn prefix_iter(&self) -> SectionIter {
        self.prefix_modes(false)
    }

    /// One full prefix block per prefix value of the assigned prefix length.
    pub fn prefix_block_iter(&self) -> SectionIter {
        self.prefix_modes(true)
    }

    fn prefix_modes(&self, blocks: bool) -> SectionIter {
        let Some(prefix) = self.prefix_len() else {
            return self.iter();
        };
        let single = if blocks {
            self.is_single_prefix_block()
        } else {
            self.prefix_count().is_one()
        };
        if single {
            return SectionIter::single(self.clone());
        }
        let bps = self.bits_per_segment();
        let host_index = bits::host_segment_index(prefix, bps);
        trace!(prefix, host_index, blocks, "building prefix iterator");
        let plan = self
            .segments()
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                if i < host_index {
                    return (s, SegmentMode::Full);
                }
                let local = bits::segment_prefix_len(i, bps, prefix).unwrap_or(0);
                if blocks {
                    (s, SegmentMode::PrefixBlock(local))
                } else {
                    (s, SegmentMode::Prefix(local))
                }
            })
            .collect();
        SectionIter::odometer(self, plan, None)
    }

    /// Iterates the first `segment_count` segments value by value and holds
    /// every later segment at its original range.
    pub fn block_iter(&self, segment_count: usize) -> SectionIter {
        if segment_count >= self.segment_count() {
            return self.iter();
        }
        if !self.segments()[..segment_count].iter().any(SegmentRange::is_multiple) {
            return SectionIter::single(self.clone());
        }
        let plan = self
            .segments()
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let mode = if i < segment_count {
                    SegmentMode::Full
                } else {
                    SegmentMode::Identity
                };
                (s, mode)
            })
            .collect();
        SectionIter::odometer(self, plan, None)
    }

    /// The fewest sequential sections whose union is this section.
    pub fn sequential_block_iter(&self) -> SectionIter {
        self.block_iter(self.sequential_block_index())
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
