use crate::error::{Error, Result};
use crate::points::PointSet;
use crate::select::{self, cmp_candidates, dist_sq};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::debug;

/// Handle of a node inside the tree arena.
pub type NodeId = u32;

pub const ROOT: NodeId = 0;

/// A tree node. Both variants refer to a contiguous range `start..start + size` of the
/// permuted index buffer; a branch's range holds its left subtree, its pivot, then its right
/// subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf {
        start: u32,
        end: u32,
    },
    Branch {
        pivot: usize,
        axis: u8,
        left: NodeId,
        right: NodeId,
        start: u32,
        size: u32,
    },
}

impl Node {
    const EMPTY: Node = Node::Leaf { start: 0, end: 0 };

    #[inline]
    pub fn size(&self) -> usize {
        match *self {
            Node::Leaf { start, end } => (end - start) as usize,
            Node::Branch { size, .. } => size as usize,
        }
    }

    /// Range of the permuted index buffer covered by this subtree.
    #[inline]
    fn range(&self) -> std::ops::Range<usize> {
        match *self {
            Node::Leaf { start, end } => start as usize..end as usize,
            Node::Branch { start, size, .. } => start as usize..(start + size) as usize,
        }
    }
}

/// Arena-backed median-split tree over the first three coordinates of a [`PointSet`].
///
/// Nodes are stored in pre-order with the root at [`ROOT`]. The split axis at depth `d` is
/// `d % 3`. Every non-root subtree with at most `leaf_size` points is a leaf; the root always
/// branches as long as there is at least one point.
#[derive(Clone, Debug, PartialEq)]
pub struct KdTree {
    nodes: Vec<Node>,
    indices: Vec<usize>,
    leaf_size: usize,
    depth: usize,
}

impl KdTree {
    pub fn build(points: &PointSet, leaf_size: usize, parallel_threshold: usize) -> Result<Self> {
        let count = points.len();
        if count > u32::MAX as usize / 2 {
            return Err(Error::invalid_argument(format!(
                "{} points exceed the index capacity",
                count
            )));
        }

        let mut indices: Vec<usize> = (0..count).collect();
        if count == 0 {
            return Ok(KdTree { nodes: Vec::new(), indices, leaf_size, depth: 0 });
        }

        let counts = NodeCounts::new(count, leaf_size);
        let mut nodes = vec![Node::EMPTY; counts.root(count)];

        let builder = Builder { points, counts: &counts, leaf_size, parallel_threshold };
        let depth = builder.build(&mut nodes, 0, &mut indices, 0, 0, true);

        debug!(
            points = count,
            nodes = nodes.len(),
            leaf_size,
            depth,
            "built kd-tree"
        );

        Ok(KdTree { nodes, indices, leaf_size, depth })
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest node, the root being at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Point indices held by a leaf, or the whole subtree (pivots included) for a branch.
    ///
    /// Returns `None` for a handle outside the arena, which includes [`ROOT`] of an empty tree.
    pub fn subtree_indices(&self, id: NodeId) -> Option<&[usize]> {
        self.nodes.get(id as usize).map(|node| &self.indices[node.range()])
    }

    /// Approximate k-nearest search, appending `k` indices to `out`.
    ///
    /// At each branch the child on the query's side of the split is searched alone whenever it
    /// holds at least `k` points. Otherwise the whole close subtree and the pivot are taken and
    /// the remainder is requested from the far child. The splitting plane is never tested, so
    /// neighbors just across a boundary can be missed.
    ///
    /// `k` must not exceed [`len`](Self::len).
    pub fn nearest_approx(&self, points: &PointSet, target: [f64; 3], k: usize, out: &mut Vec<usize>) {
        debug_assert!(k <= self.len());
        if k == 0 || self.nodes.is_empty() {
            return;
        }
        self.approx_recursive(ROOT, 0, points, target, k, out);
    }

    fn approx_recursive(
        &self,
        id: NodeId,
        depth: usize,
        points: &PointSet,
        target: [f64; 3],
        k: usize,
        out: &mut Vec<usize>,
    ) {
        if k == 0 {
            return;
        }
        match self.nodes[id as usize] {
            Node::Leaf { start, end } => {
                let leaf = &self.indices[start as usize..end as usize];
                select::nearest_k(points, leaf, target, k, out);
            }
            Node::Branch { pivot, axis, left, right, .. } => {
                debug_assert_eq!(axis as usize, depth % 3);
                let axis = axis as usize;
                let (close, far) = if target[axis] < points.coord(pivot, axis) {
                    (left, right)
                } else {
                    (right, left)
                };

                let close_size = self.nodes[close as usize].size();
                if close_size >= k {
                    let first = out.len();
                    self.approx_recursive(close, depth + 1, points, target, k, out);

                    // The pivot competes with the worst candidate found below it.
                    if let Some((slot, worst)) = select::farthest(points, &out[first..], target) {
                        if dist_sq(points.position(pivot), target) < worst {
                            out[first + slot] = pivot;
                        }
                    }
                } else {
                    out.extend_from_slice(&self.indices[self.nodes[close as usize].range()]);
                    out.push(pivot);
                    self.approx_recursive(far, depth + 1, points, target, k - close_size - 1, out);
                }
            }
        }
    }

    /// Exact k-nearest search.
    ///
    /// Returns `(squared distance, index)` pairs sorted by distance, ties broken by index.
    /// The far child of a branch is visited only while fewer than `k` candidates are known or
    /// while the splitting plane lies within the current k-th best distance.
    pub fn nearest_exact(&self, points: &PointSet, target: [f64; 3], k: usize) -> Vec<(f64, usize)> {
        if k == 0 || self.nodes.is_empty() {
            return Vec::new();
        }
        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.exact_recursive(ROOT, points, target, k, &mut heap);

        let mut found: Vec<(f64, usize)> = heap.into_iter().map(|c| (c.dist_sq, c.index)).collect();
        found.sort_unstable_by(cmp_candidates);
        found
    }

    fn exact_recursive(
        &self,
        id: NodeId,
        points: &PointSet,
        target: [f64; 3],
        k: usize,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        match self.nodes[id as usize] {
            Node::Leaf { start, end } => {
                for &idx in &self.indices[start as usize..end as usize] {
                    offer(heap, k, Candidate { dist_sq: dist_sq(points.position(idx), target), index: idx });
                }
            }
            Node::Branch { pivot, axis, left, right, .. } => {
                let axis = axis as usize;
                offer(heap, k, Candidate { dist_sq: dist_sq(points.position(pivot), target), index: pivot });

                let diff = target[axis] - points.coord(pivot, axis);
                let (first, second) = if diff < 0.0 { (left, right) } else { (right, left) };

                self.exact_recursive(first, points, target, k, heap);

                let worst = heap.peek().map_or(f64::INFINITY, |c| c.dist_sq);
                if heap.len() < k || diff * diff <= worst {
                    self.exact_recursive(second, points, target, k, heap);
                }
            }
        }
    }
}

/// Keeps the `k` best candidates in a max-heap keyed on distance.
fn offer(heap: &mut BinaryHeap<Candidate>, k: usize, candidate: Candidate) {
    if heap.len() < k {
        heap.push(candidate);
    } else if let Some(top) = heap.peek() {
        if candidate < *top {
            heap.pop();
            heap.push(candidate);
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    dist_sq: f64,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_candidates(&(self.dist_sq, self.index), &(other.dist_sq, other.index))
    }
}

/// Number of arena nodes needed for a subtree of a given population.
///
/// A subtree of `n` points always splits into `n / 2` and `n - n / 2 - 1`, so only a couple of
/// distinct populations occur per level and the table stays small.
struct NodeCounts {
    leaf_size: usize,
    counts: HashMap<usize, usize>,
}

impl NodeCounts {
    fn new(count: usize, leaf_size: usize) -> Self {
        let mut table = NodeCounts { leaf_size, counts: HashMap::new() };
        let mid = count / 2;
        table.fill(mid);
        table.fill(count - mid - 1);
        table
    }

    fn fill(&mut self, n: usize) -> usize {
        if n <= self.leaf_size {
            return 1;
        }
        if let Some(&c) = self.counts.get(&n) {
            return c;
        }
        let mid = n / 2;
        let c = 1 + self.fill(mid) + self.fill(n - mid - 1);
        self.counts.insert(n, c);
        c
    }

    fn subtree(&self, n: usize) -> usize {
        if n <= self.leaf_size { 1 } else { self.counts[&n] }
    }

    /// Node count of the whole tree, whose root branches regardless of `leaf_size`.
    fn root(&self, count: usize) -> usize {
        let mid = count / 2;
        1 + self.subtree(mid) + self.subtree(count - mid - 1)
    }
}

struct Builder<'a> {
    points: &'a PointSet,
    counts: &'a NodeCounts,
    leaf_size: usize,
    parallel_threshold: usize,
}

impl Builder<'_> {
    /// Builds the subtree over `indices` into `nodes`, whose first slot receives the subtree
    /// root. `node_base` and `index_base` are the absolute offsets of both slices.
    /// Returns the depth of the deepest node written.
    fn build(
        &self,
        nodes: &mut [Node],
        node_base: usize,
        indices: &mut [usize],
        index_base: usize,
        depth: usize,
        is_root: bool,
    ) -> usize {
        let count = indices.len();
        if !is_root && count <= self.leaf_size {
            nodes[0] = Node::Leaf {
                start: index_base as u32,
                end: (index_base + count) as u32,
            };
            return depth;
        }

        let axis = depth % 3;
        let mid = count / 2;
        let points = self.points;
        indices.select_nth_unstable_by(mid, |&a, &b| {
            points.coord(a, axis)
                .partial_cmp(&points.coord(b, axis))
                .unwrap_or(Ordering::Equal)
        });
        let pivot = indices[mid];

        let left_nodes = self.counts.subtree(mid);
        let (head, children) = nodes.split_at_mut(1);
        let (left_slots, right_slots) = children.split_at_mut(left_nodes);
        let (left_indices, rest) = indices.split_at_mut(mid);
        let right_indices = &mut rest[1..];

        let left = node_base + 1;
        let right = left + left_nodes;

        let (left_depth, right_depth) = if count > self.parallel_threshold {
            rayon::join(
                || self.build(left_slots, left, left_indices, index_base, depth + 1, false),
                || self.build(right_slots, right, right_indices, index_base + mid + 1, depth + 1, false),
            )
        } else {
            (
                self.build(left_slots, left, left_indices, index_base, depth + 1, false),
                self.build(right_slots, right, right_indices, index_base + mid + 1, depth + 1, false),
            )
        };

        head[0] = Node::Branch {
            pivot,
            axis: axis as u8,
            left: left as NodeId,
            right: right as NodeId,
            start: index_base as u32,
            size: count as u32,
        };
        left_depth.max(right_depth)
    }
}
