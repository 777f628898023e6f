/// Default maximum number of point indices stored in a leaf.
pub const DEFAULT_LEAF_SIZE: usize = 10;

/// Subtrees larger than this are built with `rayon::join`.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 14;

/// Construction parameters of a [`SpatialIndex`](crate::SpatialIndex).
///
/// Both values are fixed once the index is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Maximum number of point indices held by a non-root leaf.
    pub leaf_size: usize,
    /// Minimum subtree population at which the two child builds run in parallel.
    /// `usize::MAX` forces a sequential build.
    pub parallel_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            leaf_size: DEFAULT_LEAF_SIZE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl IndexConfig {
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    /// Configuration that never forks during construction.
    pub fn sequential(self) -> Self {
        self.with_parallel_threshold(usize::MAX)
    }
}
