use addrkit_common::bits::BitCount;

use crate::span;

/// Steps through the blocks of one prefix length that intersect
/// `[lower, upper]`, yielding each block's bounds clipped to the range
/// and unclipped.
#[derive(Debug, Clone)]
pub(crate) struct BlockSteps {
    lower: u128,
    upper: u128,
    host: BitCount,
    next: Option<u128>,
    last: u128,
}

/// One step of [`BlockSteps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub block_lower: u128,
    pub block_upper: u128,
    pub clipped_lower: u128,
    pub clipped_upper: u128,
}

impl BlockSteps {
    pub(crate) fn new(lower: u128, upper: u128, bit_count: BitCount, prefix: BitCount) -> Self {
        let host = bit_count - prefix.min(bit_count);
        Self {
            lower,
            upper,
            host,
            next: Some(span::shr(lower, host)),
            last: span::shr(upper, host),
        }
    }
}

impl Iterator for BlockSteps {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let current = self.next?;
        self.next = (current < self.last).then(|| current + 1);
        let block_lower = current.checked_shl(self.host).unwrap_or(0);
        let block_upper = block_lower | span::low_mask(self.host);
        Some(Step {
            block_lower,
            block_upper,
            clipped_lower: block_lower.max(self.lower),
            clipped_upper: block_upper.min(self.upper),
        })
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
