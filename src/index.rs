use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::kdtree::KdTree;
use crate::points::PointSet;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::trace;

/// Query results together with the rows of the matched points.
#[derive(Clone, Debug, PartialEq)]
pub struct Neighbors {
    /// Indices of the matched points.
    pub indices: Vec<usize>,
    /// Full rows of the matched points, flattened row-major in the order of `indices`.
    pub rows: Vec<f64>,
    /// Width of each row in `rows`.
    pub dims: usize,
}

impl Neighbors {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Row of the `i`-th match, or `None` past the end.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        let start = i.checked_mul(self.dims)?;
        let end = start.checked_add(self.dims)?;
        self.rows.get(start..end)
    }
}

/// An immutable k-nearest-neighbor index over a [`PointSet`].
///
/// The tree is built eagerly and completely by the constructor and never changes afterwards,
/// so a `SpatialIndex` can be shared freely between threads.
///
/// Two search routines are offered:
///
/// - [`query`](Self::query) follows the close side of each split and never tests the splitting
///   plane. It is fast but approximate: a true neighbor just across a split can be missed.
/// - [`query_exact`](Self::query_exact) backtracks into the far side whenever the plane lies
///   within the current k-th best distance, and returns the true k nearest points.
pub struct SpatialIndex {
    points: Arc<PointSet>,
    config: IndexConfig,
    tree: KdTree,
}

impl SpatialIndex {
    /// Builds an index with the default leaf size of 10.
    pub fn new(points: impl Into<Arc<PointSet>>) -> Result<Self> {
        Self::with_config(points, IndexConfig::default())
    }

    pub fn build(points: impl Into<Arc<PointSet>>, leaf_size: usize) -> Result<Self> {
        Self::with_config(points, IndexConfig::default().with_leaf_size(leaf_size))
    }

    pub fn with_config(points: impl Into<Arc<PointSet>>, config: IndexConfig) -> Result<Self> {
        let points = points.into();
        let tree = KdTree::build(&points, config.leaf_size, config.parallel_threshold)?;
        Ok(Self { points, config, tree })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn leaf_size(&self) -> usize {
        self.config.leaf_size
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn points(&self) -> &Arc<PointSet> {
        &self.points
    }

    pub fn tree(&self) -> &KdTree {
        &self.tree
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    /// Approximate `k` nearest points to `target`, in unspecified order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `k` exceeds the number of points, which includes any
    /// `k > 0` against an empty index.
    pub fn query(&self, target: [f64; 3], k: usize) -> Result<Vec<usize>> {
        self.check_k(k)?;
        let mut out = Vec::with_capacity(k);
        self.tree.nearest_approx(&self.points, target, k, &mut out);
        Ok(out)
    }

    /// Approximate neighbors of the member point `index`. The point itself is a candidate.
    ///
    /// `k` is validated before `index`, so an empty index reports
    /// [`Error::InvalidArgument`] rather than [`Error::OutOfRange`].
    pub fn query_index(&self, index: usize, k: usize) -> Result<Vec<usize>> {
        self.check_k(k)?;
        let target = self.member(index)?;
        self.query(target, k)
    }

    /// Exact `k` nearest points to `target` as `(index, squared distance)` pairs, closest
    /// first with ties broken by the lower index.
    pub fn query_exact(&self, target: [f64; 3], k: usize) -> Result<Vec<(usize, f64)>> {
        self.check_k(k)?;
        Ok(self
            .tree
            .nearest_exact(&self.points, target, k)
            .into_iter()
            .map(|(d2, idx)| (idx, d2))
            .collect())
    }

    pub fn query_index_exact(&self, index: usize, k: usize) -> Result<Vec<(usize, f64)>> {
        self.check_k(k)?;
        let target = self.member(index)?;
        self.query_exact(target, k)
    }

    /// Like [`query`](Self::query), also returning the full rows of the matches.
    pub fn query_rows(&self, target: [f64; 3], k: usize) -> Result<Neighbors> {
        let indices = self.query(target, k)?;
        let dims = self.points.dims();
        let mut rows = Vec::with_capacity(indices.len() * dims);
        for &idx in &indices {
            if let Some(row) = self.points.row(idx) {
                rows.extend_from_slice(row);
            }
        }
        Ok(Neighbors { indices, rows, dims })
    }

    /// Runs [`query`](Self::query) for every target in parallel.
    pub fn query_many(&self, targets: &[[f64; 3]], k: usize) -> Result<Vec<Vec<usize>>> {
        self.check_k(k)?;
        trace!(targets = targets.len(), k, "bulk approximate query");
        Ok(targets
            .par_iter()
            .map(|&target| {
                let mut out = Vec::with_capacity(k);
                self.tree.nearest_approx(&self.points, target, k, &mut out);
                out
            })
            .collect())
    }

    /// Runs [`query_exact`](Self::query_exact) for every target in parallel.
    pub fn query_exact_many(&self, targets: &[[f64; 3]], k: usize) -> Result<Vec<Vec<(usize, f64)>>> {
        self.check_k(k)?;
        trace!(targets = targets.len(), k, "bulk exact query");
        Ok(targets
            .par_iter()
            .map(|&target| {
                self.tree
                    .nearest_exact(&self.points, target, k)
                    .into_iter()
                    .map(|(d2, idx)| (idx, d2))
                    .collect()
            })
            .collect())
    }

    fn check_k(&self, k: usize) -> Result<()> {
        if k == 0 {
            return Ok(());
        }
        if self.is_empty() {
            return Err(Error::invalid_argument("query against an empty index"));
        }
        if k > self.len() {
            return Err(Error::invalid_argument(format!(
                "k = {} exceeds the {} indexed points",
                k,
                self.len()
            )));
        }
        Ok(())
    }

    fn member(&self, index: usize) -> Result<[f64; 3]> {
        if index >= self.len() {
            return Err(Error::OutOfRange { index, len: self.len() });
        }
        Ok(self.points.position(index))
    }
}
