use addrkit_common::bits::BitCount;
use addrkit_common::family::Family;

use super::segment::{SegmentIter, SegmentMode};
use crate::section::Section;
use crate::segment::SegmentRange;

/// Rejects candidate segment combinations before they are yielded.
pub(crate) type Exclusion = Box<dyn Fn(&[SegmentRange]) -> bool + Send>;

/// Mixed-radix cursor over the cartesian product of per-segment cursors.
///
/// The last position advances first; when it runs out it is rebuilt from
/// its plan and the position to its left advances instead.
pub(crate) struct Odometer {
    family: Family,
    prefix_len: Option<BitCount>,
    plan: Vec<(SegmentRange, SegmentMode)>,
    cursors: Vec<SegmentIter>,
    current: Vec<SegmentRange>,
    started: bool,
    done: bool,
    exclude: Option<Exclusion>,
}

impl Odometer {
    pub(crate) fn new(
        family: Family,
        prefix_len: Option<BitCount>,
        plan: Vec<(SegmentRange, SegmentMode)>,
        exclude: Option<Exclusion>,
    ) -> Self {
        let cursors = plan
            .iter()
            .map(|&(range, mode)| SegmentIter::new(range, mode))
            .collect();
        Self {
            family,
            prefix_len,
            current: Vec::with_capacity(plan.len()),
            plan,
            cursors,
            started: false,
            done: false,
            exclude,
        }
    }

    /// Moves to the next combination, returning false once every
    /// combination has been produced.
    fn advance(&mut self) -> bool {
        if !self.started {
            self.started = true;
            for cursor in &mut self.cursors {
                match cursor.next() {
                    Some(value) => self.current.push(value),
                    None => return false,
                }
            }
            return true;
        }
        let mut position = self.cursors.len();
        loop {
            if position == 0 {
                return false;
            }
            position -= 1;
            if let Some(value) = self.cursors[position].next() {
                self.current[position] = value;
                break;
            }
        }
        // carry: restart every position to the right
        for i in position + 1..self.cursors.len() {
            let (range, mode) = self.plan[i];
            let mut cursor = SegmentIter::new(range, mode);
            match cursor.next() {
                Some(value) => self.current[i] = value,
                None => return false,
            }
            self.cursors[i] = cursor;
        }
        true
    }
}

impl Iterator for Odometer {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        while !self.done {
            if !self.advance() {
                self.done = true;
                break;
            }
            if let Some(exclude) = &self.exclude {
                if exclude(&self.current) {
                    continue;
                }
            }
            return Some(Section::from_parts(self.family, self.current.clone(), self.prefix_len));
        }
        None
    }
}
