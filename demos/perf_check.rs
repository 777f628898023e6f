use nearthree::{BoundingBox, PointSet, SpatialIndex};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Initialize Rayon explicitly so thread creation happens
    // before the work we want to profile.
    rayon::ThreadPoolBuilder::new().build_global().unwrap();

    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [100.0, 100.0, 100.0]);

    // One million points for the index, a second cloud to match against it.
    let index = SpatialIndex::new(PointSet::random(1_000_000, &bounds, 1)).unwrap();
    let targets: Vec<[f64; 3]> = PointSet::random(100_000, &bounds, 2).positions().collect();

    println!("nodes: {}, depth: {}", index.node_count(), index.depth());

    let approx = index.query_many(&targets, 1).unwrap();
    let exact = index.query_exact_many(&targets, 1).unwrap();

    let hits = approx
        .iter()
        .zip(&exact)
        .filter(|(a, e)| a[0] == e[0].0)
        .count();
    println!("approximate hit rate: {:.3}", hits as f64 / targets.len() as f64);
}
