//! Benchmark index construction and track matching.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use route_coverage::{
    first_pass, match_track, segment_track, GpsPoint, MatchConfig, ReferenceRoute, RouteIndex,
};

fn create_routes(count: usize) -> Vec<ReferenceRoute> {
    (0..count)
        .map(|k| {
            let lat = 45.0 + k as f64 * 0.01;
            let points: Vec<GpsPoint> = (0..50)
                .map(|i| {
                    let t = i as f64;
                    GpsPoint::new(lat + 0.004 * (t * 0.1).sin(), -93.0 + t * 0.0006)
                })
                .collect();
            ReferenceRoute::single(format!("route-{}", k), points)
        })
        .collect()
}

fn create_track(n: usize) -> Vec<GpsPoint> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            // Drifts slowly north across the corpus
            GpsPoint::new(45.0 + t * 0.0002, -93.0 + (t * 0.03).sin().abs() * 0.029)
        })
        .collect()
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for n in [10, 50, 200].iter() {
        let routes = create_routes(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| {
                let index = RouteIndex::build(black_box(routes.clone()));
                black_box(index)
            })
        });
    }

    group.finish();
}

fn bench_first_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_pass");
    let index = RouteIndex::build(create_routes(50)).expect("valid corpus");
    let config = MatchConfig::default();

    for n in [100, 1000, 5000].iter() {
        let track = create_track(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| black_box(first_pass(black_box(&track), &index, &config)))
        });
    }

    group.finish();
}

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");
    let index = RouteIndex::build(create_routes(50)).expect("valid corpus");
    let config = MatchConfig::default();

    for n in [100, 1000, 5000].iter() {
        let track = create_track(*n);
        let matches = first_pass(&track, &index, &config);
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| black_box(segment_track(black_box(&track), &matches, &config)))
        });
    }

    group.finish();
}

fn bench_full_match(c: &mut Criterion) {
    let index = RouteIndex::build(create_routes(50)).expect("valid corpus");
    let config = MatchConfig::default();
    let track = create_track(2000);

    c.bench_function("match_track_2000", |b| {
        b.iter(|| black_box(match_track(black_box(&track), &index, &config)))
    });
}

criterion_group!(
    benches,
    bench_index_build,
    bench_first_pass,
    bench_segmentation,
    bench_full_match,
);
criterion_main!(benches);
