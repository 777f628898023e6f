use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId};
use nearthree::{BoundingBox, PointSet, SpatialIndex};

const N_POINTS: usize = 100_000;
const N_QUERIES: usize = 10_000;
const KS: [usize; 4] = [1, 5, 20, 100];

fn benchmark_query(c: &mut Criterion) {
    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [100.0, 100.0, 100.0]);
    let index = SpatialIndex::new(PointSet::random(N_POINTS, &bounds, 1)).unwrap();
    let targets: Vec<[f64; 3]> = PointSet::random(N_QUERIES, &bounds, 2).positions().collect();

    let mut group = c.benchmark_group(format!("query_{}k", N_POINTS / 1000));
    group.sample_size(20);

    for &k in &KS {
        group.bench_with_input(BenchmarkId::new("approx", k), &k, |b, &k| {
            b.iter(|| {
                for &target in &targets {
                    index.query(target, k).unwrap();
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("exact", k), &k, |b, &k| {
            b.iter(|| {
                for &target in &targets {
                    index.query_exact(target, k).unwrap();
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("approx_many", k), &k, |b, &k| {
            b.iter(|| index.query_many(&targets, k).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_query);
criterion_main!(benches);
