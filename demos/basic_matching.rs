//! Match one encoded track against a small route corpus and print the result.
//!
//! Run with: `cargo run --example basic_matching`
//! Verbose: `RUST_LOG=debug cargo run --example basic_matching`

use route_coverage::{
    decode_track, encode_track, export_features, heat_points, match_track, ActivityInfo,
    GpsPoint, MatchConfig, ReferenceRoute, RouteIndex,
};

fn loop_route(name: &str, base_lat: f64) -> ReferenceRoute {
    ReferenceRoute::single(
        name,
        vec![
            GpsPoint::new(base_lat, -93.000),
            GpsPoint::new(base_lat, -92.970),
            GpsPoint::new(base_lat + 0.008, -92.975),
        ],
    )
}

fn main() -> route_coverage::Result<()> {
    env_logger::init();

    let config = MatchConfig::default();
    config.validate()?;
    let index = RouteIndex::build(vec![
        loop_route("Cedar", 45.000),
        loop_route("Lake", 45.010),
    ])?;
    println!("Indexed {} routes", index.len());

    // Rides along Cedar, then cuts north onto Lake
    let mut ride: Vec<GpsPoint> = (0..8)
        .map(|i| GpsPoint::new(45.0003, -92.998 + i as f64 * 0.001))
        .collect();
    ride.extend((0..8).map(|i| GpsPoint::new(45.0103, -92.990 + i as f64 * 0.001)));

    // Tracks usually arrive encoded; go through the same path here
    let encoded = encode_track(&ride)?;
    let track = decode_track(&encoded)?;

    let coverage = match_track(&track, &index, &config);
    println!(
        "{} points, {} segments, {:.0} m on route",
        track.len(),
        coverage.segments.len(),
        coverage.on_route_distance
    );
    for segment in &coverage.segments {
        let route = index.route_name(segment.route_id()).unwrap_or("off");
        println!(
            "  [{:>3}, {:>3})  {:<6} {:>7.1} m",
            segment.start, segment.end, route, segment.distance_m
        );
    }

    let heat = heat_points(&track, &coverage.matches, &config);
    println!("{} heat points", heat.len());

    let activity = ActivityInfo {
        id: 1,
        name: "Demo ride".to_string(),
        avatar: String::new(),
        start_date: 1_561_939_200,
    };
    let collection = export_features(&coverage.segments, &index, &activity, &config)?;
    println!("{}", collection.to_json()?);

    Ok(())
}
