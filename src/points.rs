use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An immutable, row-major collection of points.
///
/// Each row holds `dims >= 3` coordinates. Only the first three take part in the spatial
/// index; further columns (radii, tangent vectors, ...) travel along for downstream consumers.
/// Row indices are stable handles: rows are never reordered after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet {
    coords: Vec<f64>,
    dims: usize,
}

impl PointSet {
    /// Creates a point set from a flat row-major buffer with `dims` values per row.
    pub fn from_flat(coords: Vec<f64>, dims: usize) -> Result<Self> {
        if dims < 3 {
            return Err(Error::invalid_argument(format!(
                "points need at least 3 coordinates, got {}",
                dims
            )));
        }
        if coords.len() % dims != 0 {
            return Err(Error::invalid_argument(format!(
                "buffer of {} values is not a whole number of {}-wide rows",
                coords.len(),
                dims
            )));
        }
        Ok(Self { coords, dims })
    }

    pub fn from_points(points: &[[f64; 3]]) -> Self {
        Self {
            coords: points.iter().flatten().copied().collect(),
            dims: 3,
        }
    }

    /// Uniformly distributed points inside `bounds`, reproducible through `seed`.
    pub fn random(count: usize, bounds: &BoundingBox, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut coords = Vec::with_capacity(count * 3);
        for _ in 0..count {
            for axis in 0..3 {
                let extent = bounds.max[axis] - bounds.min[axis];
                coords.push(bounds.min[axis] + rng.r#gen::<f64>() * extent);
            }
        }
        Self { coords, dims: 3 }
    }

    pub fn len(&self) -> usize {
        self.coords.len() / self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Number of values per row.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The full row of point `index`, including any columns beyond the third.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.dims)?;
        let end = start.checked_add(self.dims)?;
        self.coords.get(start..end)
    }

    /// The spatial position of point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn position(&self, index: usize) -> [f64; 3] {
        let i = index * self.dims;
        [self.coords[i], self.coords[i + 1], self.coords[i + 2]]
    }

    /// Coordinate of point `index` along `axis`.
    #[inline]
    pub(crate) fn coord(&self, index: usize, axis: usize) -> f64 {
        self.coords[index * self.dims + axis]
    }

    pub fn positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.coords.chunks_exact(self.dims).map(|r| [r[0], r[1], r[2]])
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(self.positions())
    }
}

impl From<&[[f64; 3]]> for PointSet {
    fn from(points: &[[f64; 3]]) -> Self {
        Self::from_points(points)
    }
}

impl From<Vec<[f64; 3]>> for PointSet {
    fn from(points: Vec<[f64; 3]>) -> Self {
        Self::from_points(&points)
    }
}
