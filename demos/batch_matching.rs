//! Match many synthetic tracks in parallel against a shared index.
//!
//! Run with: `cargo run --release --example batch_matching --features parallel`

use std::time::Instant;

use route_coverage::{
    match_tracks, match_tracks_parallel, GpsPoint, MatchConfig, ReferenceRoute, RouteIndex,
};

fn corpus(count: usize) -> Vec<ReferenceRoute> {
    (0..count)
        .map(|k| {
            let lat = 45.0 + k as f64 * 0.01;
            ReferenceRoute::single(
                format!("Route {}", k + 1),
                vec![
                    GpsPoint::new(lat, -93.000),
                    GpsPoint::new(lat, -92.970),
                    GpsPoint::new(lat + 0.008, -92.975),
                ],
            )
        })
        .collect()
}

fn synthetic_track(seed: usize, len: usize) -> Vec<GpsPoint> {
    let base = 45.0003 + (seed % 20) as f64 * 0.005;
    (0..len)
        .map(|i| {
            let t = i as f64;
            GpsPoint::new(base + 0.002 * (t * 0.05).sin(), -92.999 + t * 0.0001)
        })
        .collect()
}

fn main() -> route_coverage::Result<()> {
    env_logger::init();

    let config = MatchConfig::default();
    let index = RouteIndex::build(corpus(20))?;
    let tracks: Vec<Vec<GpsPoint>> = (0..200).map(|s| synthetic_track(s, 250)).collect();

    let start = Instant::now();
    let sequential = match_tracks(&tracks, &index, &config);
    let sequential_ms = start.elapsed().as_millis();

    let start = Instant::now();
    let parallel = match_tracks_parallel(&tracks, &index, &config);
    let parallel_ms = start.elapsed().as_millis();

    assert_eq!(sequential, parallel);

    let total: f64 = parallel.iter().map(|c| c.on_route_distance).sum();
    println!(
        "{} tracks: {:.1} km on route (sequential {} ms, parallel {} ms)",
        tracks.len(),
        total / 1000.0,
        sequential_ms,
        parallel_ms
    );

    Ok(())
}
