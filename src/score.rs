//! NBLAST score lookup.
//!
//! A matched point pair is described by the distance between the two points and the absolute
//! dot product of their unit tangent vectors. Both values are binned and the bin pair indexes
//! a fixed 21 x 10 table of log-odds scores.

use crate::error::{Error, Result};

pub const DIST_BINS: usize = 21;
pub const ADP_BINS: usize = 10;

/// Distance bin boundaries. The last boundary stands in for infinity.
pub const DIST_BOUNDARIES: [f32; DIST_BINS + 1] = [
    0.0, 0.75, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 14.0, 16.0,
    20.0, 25.0, 30.0, 40.0, f32::MAX,
];

/// Absolute dot product bin boundaries.
pub const ADP_BOUNDARIES: [f32; ADP_BINS + 1] = [
    0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0,
];

/// Largest `i` with `boundaries[i] < value`, or 0 when no boundary is smaller.
///
/// Bins are right-closed: a value equal to a boundary falls into the bin below it.
fn find_bin(boundaries: &[f32], value: f32) -> usize {
    let mut start = 0;
    let mut stop = boundaries.len();
    while stop - start > 1 {
        let middle = start + (stop - start) / 2;
        if value > boundaries[middle] {
            start = middle;
        } else {
            stop = middle;
        }
    }
    start.min(boundaries.len().saturating_sub(2))
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreTable {
    table: [[f32; ADP_BINS]; DIST_BINS],
}

impl ScoreTable {
    pub fn new(table: [[f32; ADP_BINS]; DIST_BINS]) -> Self {
        Self { table }
    }

    /// Creates a table from 210 values laid out row by row, one row per distance bin.
    pub fn from_rows(values: &[f32]) -> Result<Self> {
        if values.len() != DIST_BINS * ADP_BINS {
            return Err(Error::invalid_argument(format!(
                "score table needs {} values, got {}",
                DIST_BINS * ADP_BINS,
                values.len()
            )));
        }
        let mut table = [[0.0; ADP_BINS]; DIST_BINS];
        for (row, chunk) in table.iter_mut().zip(values.chunks_exact(ADP_BINS)) {
            row.copy_from_slice(chunk);
        }
        Ok(Self { table })
    }

    /// `(distance bin, adp bin)` of a matched pair.
    pub fn bins(&self, dist: f32, adp: f32) -> (usize, usize) {
        (find_bin(&DIST_BOUNDARIES, dist), find_bin(&ADP_BOUNDARIES, adp))
    }

    pub fn score(&self, dist: f32, adp: f32) -> f32 {
        let (d, a) = self.bins(dist, adp);
        self.table[d][a]
    }

    pub fn values(&self) -> &[[f32; ADP_BINS]; DIST_BINS] {
        &self.table
    }
}
