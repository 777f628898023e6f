use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId};
use nearthree::{BoundingBox, IndexConfig, PointSet, SpatialIndex};

const SIZES: [usize; 4] = [1000, 10_000, 100_000, 1_000_000];
const LEAF_SIZES: [usize; 5] = [1, 4, 10, 20, 40];

fn benchmark_build(c: &mut Criterion) {
    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [100.0, 100.0, 100.0]);

    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for &size in &SIZES {
        let points = std::sync::Arc::new(PointSet::random(size, &bounds, size as u64));

        group.bench_with_input(BenchmarkId::new("sequential", size), &size, |b, &_| {
            let config = IndexConfig::default().sequential();
            b.iter(|| SpatialIndex::with_config(points.clone(), config).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("parallel", size), &size, |b, &_| {
            b.iter(|| SpatialIndex::new(points.clone()).unwrap())
        });
    }
    group.finish();
}

fn benchmark_leaf_size(c: &mut Criterion) {
    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [100.0, 100.0, 100.0]);
    let points = std::sync::Arc::new(PointSet::random(100_000, &bounds, 1));

    let mut group = c.benchmark_group("leaf_size_100k");
    group.sample_size(10);

    for &leaf_size in &LEAF_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(leaf_size), &leaf_size, |b, &leaf_size| {
            b.iter(|| SpatialIndex::build(points.clone(), leaf_size).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_leaf_size);
criterion_main!(benches);
