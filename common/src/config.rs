/// Which total order the sorting helpers apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ordering {
    /// Structural rank, then bit count, then number of values, then values.
    #[default]
    Count,
    /// Lower boundary first, upper boundary breaks ties.
    LowValue,
    /// Upper boundary first, lower boundary breaks ties.
    HighValue,
    /// Like `LowValue`, but larger upper boundaries sort first on a tie.
    ReverseLowValue,
    /// Like `HighValue`, but larger lower boundaries sort first on a tie.
    ReverseHighValue,
}

/// Settings for batch operations (sorting, joining, merging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Order used when sorting batches of addresses.
    pub ordering: Ordering,
    /// Drops items comparing equal to their predecessor after sorting.
    pub dedup: bool,
    /// Batches at least this long are sorted on the rayon pool.
    ///
    /// Small batches are always sorted on the calling thread.
    pub parallel_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ordering: Ordering::Count,
            dedup: true,
            parallel_threshold: 4096,
        }
    }
}

impl Config {
    pub fn is_parallel(&self, len: usize) -> bool {
        len >= self.parallel_threshold
    }
}
