use nearthree::kdtree::ROOT;
use nearthree::select::dist_sq;
use nearthree::{IndexConfig, KdTree, Node, NodeId, PointSet, SpatialIndex};
use proptest::prelude::*;

/// Visits every node, checking axis cycling and cached sizes. Returns the subtree size.
fn walk(tree: &KdTree, id: NodeId, depth: usize, seen: &mut Vec<usize>) -> usize {
    match *tree.node(id).expect("dangling node handle") {
        Node::Leaf { .. } => {
            let leaf = tree.subtree_indices(id).expect("leaf without indices");
            seen.extend_from_slice(leaf);
            leaf.len()
        }
        Node::Branch { pivot, axis, left, right, size, .. } => {
            assert_eq!(axis as usize, depth % 3);
            seen.push(pivot);
            let l = walk(tree, left, depth + 1, seen);
            let r = walk(tree, right, depth + 1, seen);
            assert_eq!(size as usize, l + r + 1);
            size as usize
        }
    }
}

// Integer-valued coordinates make ties on the split axis common.
fn cloud() -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec(
        prop::array::uniform3((-6i32..6).prop_map(|v| v as f64)),
        1..120,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_point_is_indexed_once(raw in cloud(), leaf_size in 0usize..16) {
        let points = PointSet::from_points(&raw);
        let index = SpatialIndex::build(points, leaf_size).unwrap();

        let mut seen = Vec::new();
        let total = walk(index.tree(), ROOT, 0, &mut seen);
        seen.sort_unstable();

        prop_assert_eq!(total, raw.len());
        prop_assert_eq!(seen, (0..raw.len()).collect::<Vec<_>>());
    }

    #[test]
    fn k_equal_to_n_returns_all(raw in cloud(), leaf_size in 0usize..16, target in prop::array::uniform3(-8.0f64..8.0)) {
        let index = SpatialIndex::build(PointSet::from_points(&raw), leaf_size).unwrap();

        let mut found = index.query(target, raw.len()).unwrap();
        found.sort_unstable();
        prop_assert_eq!(found, (0..raw.len()).collect::<Vec<_>>());
    }

    #[test]
    fn approximate_results_are_distinct(raw in cloud(), k_frac in 0.0f64..1.0, target in prop::array::uniform3(-8.0f64..8.0)) {
        let index = SpatialIndex::new(PointSet::from_points(&raw)).unwrap();
        let k = ((raw.len() as f64 * k_frac) as usize).min(raw.len());

        let mut found = index.query(target, k).unwrap();
        prop_assert_eq!(found.len(), k);
        found.sort_unstable();
        found.dedup();
        prop_assert_eq!(found.len(), k);
    }

    #[test]
    fn exact_matches_brute_force(raw in cloud(), k in 1usize..12, target in prop::array::uniform3(-8.0f64..8.0)) {
        let k = k.min(raw.len());
        let index = SpatialIndex::build(PointSet::from_points(&raw), 3).unwrap();

        let mut brute: Vec<(f64, usize)> = raw
            .iter()
            .enumerate()
            .map(|(i, p)| (dist_sq(*p, target), i))
            .collect();
        brute.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let found = index.query_exact(target, k).unwrap();
        let expected: Vec<(usize, f64)> = brute[..k].iter().map(|&(d, i)| (i, d)).collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn parallel_build_is_deterministic(raw in cloud(), leaf_size in 0usize..8) {
        let points = PointSet::from_points(&raw);
        let sequential = KdTree::build(&points, leaf_size, usize::MAX).unwrap();
        let parallel = KdTree::build(&points, leaf_size, 0).unwrap();
        prop_assert_eq!(&sequential, &parallel);

        let config = IndexConfig::default().with_leaf_size(leaf_size).with_parallel_threshold(0);
        let index = SpatialIndex::with_config(points, config).unwrap();
        prop_assert_eq!(index.node_count(), parallel.node_count());
    }
}
