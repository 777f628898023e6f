//! Point clouds with per-point tangent directions, compared through NBLAST scores.
//!
//! The tangent of a point is the principal axis of its `k` nearest neighbors (the point
//! itself included), found through the cloud's own [`SpatialIndex`]. Tangents are unit
//! vectors whose sign is arbitrary, so similarity is measured by the absolute dot product.

use crate::error::{Error, Result};
use crate::index::SpatialIndex;
use crate::points::PointSet;
use crate::score::ScoreTable;
use crate::select::dist_sq;
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

pub struct VectorCloud {
    index: SpatialIndex,
    tangents: Vec<[f64; 3]>,
}

impl VectorCloud {
    /// Indexes `points` with the given leaf size and estimates every tangent from
    /// `neighbors` nearest points.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `neighbors` is 0 or exceeds the point count of a
    /// non-empty cloud.
    pub fn new(points: impl Into<Arc<PointSet>>, leaf_size: usize, neighbors: usize) -> Result<Self> {
        let index = SpatialIndex::build(points, leaf_size)?;
        if neighbors == 0 && !index.is_empty() {
            return Err(Error::invalid_argument("tangents need at least one neighbor"));
        }

        let tangents = (0..index.len())
            .into_par_iter()
            .map(|i| -> Result<[f64; 3]> {
                let found = index.query_index(i, neighbors)?;
                Ok(principal_direction(index.points(), &found))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(points = index.len(), neighbors, "estimated tangents");
        Ok(Self { index, tangents })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn points(&self) -> &Arc<PointSet> {
        self.index.points()
    }

    /// Unit tangent of every point, in point order.
    pub fn tangents(&self) -> &[[f64; 3]] {
        &self.tangents
    }

    /// NBLAST score of `query` against this cloud.
    ///
    /// Every point of `query` is matched to its nearest point here; the distance and the
    /// absolute dot product of both tangents are looked up in `table` and summed.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if this cloud is empty while `query` is not.
    pub fn query_by(&self, query: &VectorCloud, table: &ScoreTable) -> Result<f32> {
        let query_points = query.points();
        let scores = (0..query.len())
            .into_par_iter()
            .map(|j| -> Result<f32> {
                let target = query_points.position(j);
                let found = self.index.query(target, 1)?;
                let nearest = found[0];

                let dist = dist_sq(self.index.points().position(nearest), target).sqrt();
                let adp = dot(self.tangents[nearest], query.tangents[j]).abs();
                Ok(table.score(dist as f32, adp as f32))
            })
            .collect::<Result<Vec<f32>>>()?;

        Ok(scores.iter().sum())
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Eigenvector of the largest eigenvalue of the covariance of `members`.
fn principal_direction(points: &PointSet, members: &[usize]) -> [f64; 3] {
    let n = members.len().max(1) as f64;
    let mut mean = Vector3::<f64>::zeros();
    for &idx in members {
        mean += Vector3::from(points.position(idx));
    }
    mean /= n;

    let mut cov = Matrix3::<f64>::zeros();
    for &idx in members {
        let d = Vector3::from(points.position(idx)) - mean;
        cov += d * d.transpose();
    }
    cov /= n;

    let eigen = cov.symmetric_eigen();
    let principal = eigen.eigenvalues.imax();
    let axis = eigen.eigenvectors.column(principal).normalize();
    [axis[0], axis[1], axis[2]]
}
