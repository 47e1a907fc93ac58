//! First-pass matching of a track against the route index.
//!
//! This module provides:
//! - [`first_pass`]: per-point distance and id of the nearest plausible route
//! - [`match_track`]: first pass plus segmentation, the full result for one track
//! - [`match_tracks`] / [`match_tracks_parallel`]: batch entry points
//!
//! Matching never fails. Points no route's oriented box contains get an
//! infinite distance and route id 0, and short tracks produce no segments.

use log::debug;
use serde::Serialize;

use crate::geo_utils::point_deltas;
use crate::route_index::RouteIndex;
use crate::segments::{segment_track, Segment};
use crate::{GpsPoint, MatchConfig};

/// Per-point output of the first pass. All three vectors have one entry per track point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Meters to the nearest candidate route, `f64::INFINITY` when no route was plausible
    pub distance_to_route_m: Vec<f64>,
    /// 1-based id of the nearest candidate route, 0 when none
    pub nearest_route_id: Vec<u32>,
    /// Meters from the previous point (0 for the first point)
    pub delta_m: Vec<f64>,
}

impl MatchResult {
    pub fn len(&self) -> usize {
        self.delta_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delta_m.is_empty()
    }
}

/// Full matching output for one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackCoverage {
    pub matches: MatchResult,
    pub segments: Vec<Segment>,
    /// Sum of `distance_m` over on-route segments
    pub on_route_distance: f64,
}

/// Find the nearest plausible route for every point of `track`.
///
/// A route is only measured against points inside its oriented box
/// (scaled by `config.coarse_overscale`). Equal distances resolve to the
/// lowest route id.
///
/// # Example
/// ```
/// use route_coverage::{first_pass, GpsPoint, MatchConfig, ReferenceRoute, RouteIndex};
///
/// let route = ReferenceRoute::single(
///     "Loop",
///     vec![
///         GpsPoint::new(45.000, -93.000),
///         GpsPoint::new(45.000, -92.990),
///         GpsPoint::new(45.005, -92.990),
///     ],
/// );
/// let index = RouteIndex::build(vec![route]).unwrap();
///
/// let track = vec![GpsPoint::new(45.0001, -92.995), GpsPoint::new(46.0, -92.0)];
/// let result = first_pass(&track, &index, &MatchConfig::default());
/// assert_eq!(result.nearest_route_id, vec![1, 0]);
/// assert!(result.distance_to_route_m[1].is_infinite());
/// ```
pub fn first_pass(track: &[GpsPoint], index: &RouteIndex, config: &MatchConfig) -> MatchResult {
    let n = track.len();
    let mut distance_to_route_m = vec![f64::INFINITY; n];
    let mut nearest_route_id = vec![0u32; n];
    let mut candidates = 0usize;

    for route in index.routes() {
        for (j, point) in track.iter().enumerate() {
            if !route.may_contain(point, config.coarse_overscale) {
                continue;
            }
            candidates += 1;
            let d = route.distance_to(point);
            // Strict comparison keeps the lowest id on ties and never lets NaN win
            if d < distance_to_route_m[j] {
                distance_to_route_m[j] = d;
                nearest_route_id[j] = route.id();
            }
        }
    }

    debug!(
        "[Matching] {} points x {} routes: {} candidate pairs after coarse filter",
        n,
        index.len(),
        candidates
    );

    MatchResult {
        distance_to_route_m,
        nearest_route_id,
        delta_m: point_deltas(track),
    }
}

/// Match one track: first pass followed by segmentation.
pub fn match_track(track: &[GpsPoint], index: &RouteIndex, config: &MatchConfig) -> TrackCoverage {
    let matches = first_pass(track, index, config);
    let (segments, on_route_distance) = segment_track(track, &matches, config);

    debug!(
        "[Matching] {} points -> {} segments, {:.0}m on route",
        track.len(),
        segments.len(),
        on_route_distance
    );

    TrackCoverage {
        matches,
        segments,
        on_route_distance,
    }
}

/// Match a batch of tracks sequentially. Output order equals input order.
pub fn match_tracks(
    tracks: &[Vec<GpsPoint>],
    index: &RouteIndex,
    config: &MatchConfig,
) -> Vec<TrackCoverage> {
    tracks
        .iter()
        .map(|track| match_track(track, index, config))
        .collect()
}

/// Match a batch of tracks using parallel processing.
///
/// This is the same as `match_tracks` but uses rayon to match tracks
/// concurrently against the shared index. Output order equals input order.
#[cfg(feature = "parallel")]
pub fn match_tracks_parallel(
    tracks: &[Vec<GpsPoint>],
    index: &RouteIndex,
    config: &MatchConfig,
) -> Vec<TrackCoverage> {
    use rayon::prelude::*;

    tracks
        .par_iter()
        .map(|track| match_track(track, index, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReferenceRoute;

    fn pt(lon: f64, lat: f64) -> GpsPoint {
        GpsPoint::from_lon_lat(lon, lat)
    }

    /// Two east-west routes 0.01° (~1.1 km) apart in latitude.
    fn two_route_index() -> RouteIndex {
        let south = ReferenceRoute::single(
            "south",
            vec![pt(0.0, 0.0), pt(0.01, 0.0), pt(0.02, 0.001)],
        );
        let north = ReferenceRoute::single(
            "north",
            vec![pt(0.0, 0.01), pt(0.01, 0.01), pt(0.02, 0.011)],
        );
        RouteIndex::build(vec![south, north]).unwrap()
    }

    #[test]
    fn test_first_pass_lengths_match_track() {
        let index = two_route_index();
        let track = vec![pt(0.005, 0.0), pt(0.006, 0.0), pt(0.007, 0.0)];
        let result = first_pass(&track, &index, &MatchConfig::default());
        assert_eq!(result.len(), 3);
        assert_eq!(result.distance_to_route_m.len(), 3);
        assert_eq!(result.nearest_route_id.len(), 3);
        assert_eq!(result.delta_m[0], 0.0);
    }

    #[test]
    fn test_first_pass_picks_nearest_route() {
        let index = two_route_index();
        let track = vec![pt(0.005, 0.0001), pt(0.005, 0.0099)];
        let result = first_pass(&track, &index, &MatchConfig::default());
        assert_eq!(result.nearest_route_id, vec![1, 2]);
        assert!(result.distance_to_route_m[0] < 20.0);
        assert!(result.distance_to_route_m[1] < 20.0);
    }

    #[test]
    fn test_ties_go_to_lowest_route_id() {
        let shape = vec![pt(0.0, 0.0), pt(0.01, 0.0), pt(0.01, 0.01)];
        let index = RouteIndex::build(vec![
            ReferenceRoute::single("a", shape.clone()),
            ReferenceRoute::single("b", shape),
        ])
        .unwrap();
        let result = first_pass(&[pt(0.005, 0.0001)], &index, &MatchConfig::default());
        assert_eq!(result.nearest_route_id, vec![1]);
    }

    #[test]
    fn test_far_points_have_no_route() {
        let index = two_route_index();
        let track = vec![pt(10.0, 10.0), pt(10.001, 10.0)];
        let result = first_pass(&track, &index, &MatchConfig::default());
        assert_eq!(result.nearest_route_id, vec![0, 0]);
        assert!(result.distance_to_route_m.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_invalid_points_do_not_match() {
        let index = two_route_index();
        let track = vec![pt(f64::NAN, 0.0), pt(0.005, 0.0)];
        let result = first_pass(&track, &index, &MatchConfig::default());
        assert_eq!(result.nearest_route_id[0], 0);
        assert_eq!(result.nearest_route_id[1], 1);
    }

    #[test]
    fn test_empty_track() {
        let index = two_route_index();
        let coverage = match_track(&[], &index, &MatchConfig::default());
        assert!(coverage.matches.is_empty());
        assert!(coverage.segments.is_empty());
        assert_eq!(coverage.on_route_distance, 0.0);
    }

    #[test]
    fn test_match_tracks_preserves_order() {
        let index = two_route_index();
        let on = vec![pt(0.001, 0.0), pt(0.002, 0.0), pt(0.003, 0.0)];
        let off = vec![pt(5.0, 5.0), pt(5.001, 5.0)];
        let results = match_tracks(&[on, off], &index, &MatchConfig::default());
        assert_eq!(results.len(), 2);
        assert!(results[0].on_route_distance > 200.0);
        assert_eq!(results[1].on_route_distance, 0.0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let index = two_route_index();
        let tracks: Vec<Vec<GpsPoint>> = (0..8)
            .map(|k| {
                (0..30)
                    .map(|i| pt(i as f64 * 0.0007, k as f64 * 0.0015))
                    .collect()
            })
            .collect();
        let config = MatchConfig::default();
        assert_eq!(
            match_tracks(&tracks, &index, &config),
            match_tracks_parallel(&tracks, &index, &config)
        );
    }
}
