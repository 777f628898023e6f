//! Leaf-level selection primitives.
//!
//! All ranking uses the squared Euclidean distance over the first three coordinates; square
//! roots are never taken since only relative order matters.

use crate::points::PointSet;
use std::cmp::Ordering;

#[inline]
pub fn dist_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Total order on `(distance, index)` pairs, NaN distances treated as equal.
#[inline]
pub(crate) fn cmp_candidates(a: &(f64, usize), b: &(f64, usize)) -> Ordering {
    a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1))
}

/// Index in `indices` closest to `target`. Ties keep the first one encountered.
pub fn nearest_one(points: &PointSet, indices: &[usize], target: [f64; 3]) -> Option<usize> {
    let mut best = None;
    let mut best_d2 = f64::INFINITY;
    for &idx in indices {
        let d2 = dist_sq(points.position(idx), target);
        if best.is_none() || d2 < best_d2 {
            best = Some(idx);
            best_d2 = d2;
        }
    }
    best
}

/// Appends the `k` indices of `indices` closest to `target` to `out`, in unspecified order.
///
/// Uses a partial selection, so the cost is linear in `indices.len()`.
pub fn nearest_k(points: &PointSet, indices: &[usize], target: [f64; 3], k: usize, out: &mut Vec<usize>) {
    debug_assert!(k <= indices.len());
    match k {
        0 => {}
        k if k >= indices.len() => out.extend_from_slice(indices),
        1 => out.extend(nearest_one(points, indices, target)),
        k => {
            let mut scored: Vec<(f64, usize)> = indices
                .iter()
                .map(|&idx| (dist_sq(points.position(idx), target), idx))
                .collect();
            scored.select_nth_unstable_by(k - 1, cmp_candidates);
            out.extend(scored[..k].iter().map(|&(_, idx)| idx));
        }
    }
}

/// Position in `candidates` of the entry farthest from `target`, with its squared distance.
pub(crate) fn farthest(points: &PointSet, candidates: &[usize], target: [f64; 3]) -> Option<(usize, f64)> {
    let mut worst: Option<(usize, f64)> = None;
    for (slot, &idx) in candidates.iter().enumerate() {
        let d2 = dist_sq(points.position(idx), target);
        match worst {
            Some((_, w)) if d2 <= w => {}
            _ => worst = Some((slot, d2)),
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> PointSet {
        PointSet::from_points(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
        ])
    }

    #[test]
    fn test_nearest_one_prefers_first_tie() {
        let points = line();
        // 1 and 3 are both at distance 1 from x = 2, 2 excluded.
        assert_eq!(nearest_one(&points, &[3, 1, 0], [2.0, 0.0, 0.0]), Some(3));
        assert_eq!(nearest_one(&points, &[], [2.0, 0.0, 0.0]), None);
    }

    #[test]
    fn test_nearest_k_partial_selection() {
        let points = line();
        let mut out = Vec::new();
        nearest_k(&points, &[4, 0, 3, 1, 2], [0.2, 0.0, 0.0], 3, &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1, 2]);
    }

    #[test]
    fn test_nearest_k_whole_leaf_and_zero() {
        let points = line();
        let mut out = vec![9];
        nearest_k(&points, &[2, 4], [0.0, 0.0, 0.0], 2, &mut out);
        nearest_k(&points, &[2, 4], [0.0, 0.0, 0.0], 0, &mut out);
        assert_eq!(out, vec![9, 2, 4]);
    }

    #[test]
    fn test_farthest() {
        let points = line();
        assert_eq!(farthest(&points, &[1, 4, 2], [0.0, 0.0, 0.0]), Some((1, 16.0)));
        assert_eq!(farthest(&points, &[], [0.0, 0.0, 0.0]), None);
    }

    #[test]
    fn test_dist_sq() {
        assert_eq!(dist_sq([1.0, 2.0, 3.0], [1.0, 2.0, 3.0]), 0.0);
        assert_eq!(dist_sq([0.0, 0.0, 0.0], [1.0, 2.0, 2.0]), 9.0);
    }
}
