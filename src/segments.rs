//! # Segmenter
//!
//! Splits a matched track into contiguous runs that are uniformly on one
//! route or off-route.
//!
//! ## Breakpoints
//!
//! Each point gets a signed route id: `+id` when it is within
//! `on_route_threshold_m` of its nearest route, `-id` otherwise. Two kinds of
//! breakpoints split the track:
//!
//! - **Route change**: index `i + 1` wherever the signed id changes between `i` and `i + 1`
//! - **Gap**: index `j` wherever the step into `j` exceeds `gap_threshold_m`
//!
//! ## Boundary Attribution
//!
//! At a route-change breakpoint the boundary point is shared by both
//! neighbouring segments. Segment distance skips the first point's delta, so
//! the seam is never counted twice. A gap breakpoint shares nothing.
//!
//! Short segments are not merged into their neighbours.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::matching::MatchResult;
use crate::{GpsPoint, MatchConfig};

/// A contiguous run of track points classified as one route or off-route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// First track index (inclusive)
    pub start: usize,
    /// Last track index (exclusive)
    pub end: usize,
    /// Track points in `start..end`
    pub coordinates: Vec<GpsPoint>,
    /// Median signed route id over the range. Positive means on-route.
    pub route_num: f64,
    /// Most common positive route id in the range, 0 if none is on-route
    pub dominant_route: u32,
    /// Meters covered, excluding the step into the first point
    pub distance_m: f64,
    /// Per-point distance to the nearest route over the range
    pub distance_to_route_m: Vec<f64>,
}

impl Segment {
    pub fn is_on_route(&self) -> bool {
        self.route_num > 0.0
    }

    /// Route id this segment is attributed to, 0 for off-route.
    ///
    /// Always one of the routes the segment's points are on, never an id
    /// interpolated from the median.
    pub fn route_id(&self) -> u32 {
        if self.is_on_route() {
            self.dominant_route
        } else {
            0
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Signed route id per point: positive when within `threshold_m` of the route.
pub(crate) fn signed_route_ids(
    route_ids: &[u32],
    distances: &[f64],
    threshold_m: f64,
) -> Vec<i64> {
    route_ids
        .iter()
        .zip(distances)
        .map(|(&id, &d)| {
            let id = id as i64;
            if d <= threshold_m {
                id
            } else {
                -id
            }
        })
        .collect()
}

/// Indices where the step from the previous point exceeds `threshold_m`.
pub(crate) fn gap_breakpoints(deltas: &[f64], threshold_m: f64) -> Vec<usize> {
    deltas
        .iter()
        .enumerate()
        .filter(|(_, &d)| d > threshold_m)
        .map(|(j, _)| j)
        .collect()
}

/// Median of the values; the mean of the two middle values for even counts.
fn median(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Most frequent positive id, lowest id on ties. 0 when nothing is positive.
fn dominant_route(signed: &[i64]) -> u32 {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &id in signed.iter().filter(|&&id| id > 0) {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(id, count)| (count, Reverse(id)))
        .and_then(|(id, _)| u32::try_from(id).ok())
        .unwrap_or(0)
}

/// Split a matched track into segments.
///
/// Returns the segments in track order and the total on-route distance in
/// meters. Tracks with fewer than 2 points yield no segments. If `points`
/// and the match vectors disagree in length the shortest one wins.
///
/// # Example
/// ```
/// use route_coverage::{
///     first_pass, segment_track, GpsPoint, MatchConfig, ReferenceRoute, RouteIndex,
/// };
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
/// let config = MatchConfig::default();
///
/// let track: Vec<GpsPoint> = (0..5)
///     .map(|i| GpsPoint::new(45.0, -93.0 + i as f64 * 0.001))
///     .collect();
/// let matches = first_pass(&track, &index, &config);
/// let (segments, on_route) = segment_track(&track, &matches, &config);
///
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].route_id(), 1);
/// assert!((on_route - segments[0].distance_m).abs() < 1e-9);
/// ```
pub fn segment_track(
    points: &[GpsPoint],
    matches: &MatchResult,
    config: &MatchConfig,
) -> (Vec<Segment>, f64) {
    let n = points
        .len()
        .min(matches.nearest_route_id.len())
        .min(matches.distance_to_route_m.len())
        .min(matches.delta_m.len());
    if n < 2 {
        return (Vec::new(), 0.0);
    }

    let distances = &matches.distance_to_route_m[..n];
    let deltas = &matches.delta_m[..n];
    let signed = signed_route_ids(
        &matches.nearest_route_id[..n],
        distances,
        config.on_route_threshold_m,
    );

    let gaps = gap_breakpoints(deltas, config.gap_threshold_m);
    let mut breakpoints: Vec<usize> = signed
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] != w[1])
        .map(|(i, _)| i + 1)
        .chain(gaps.iter().copied())
        .collect();
    breakpoints.sort_unstable();
    breakpoints.dedup();
    breakpoints.push(n);

    let mut segments = Vec::with_capacity(breakpoints.len());
    let mut on_route_distance = 0.0;
    let mut last = 0;

    for br in breakpoints {
        let (start, end) = if gaps.binary_search(&br).is_ok() {
            let range = (last, br);
            last = br;
            range
        } else if signed[br - 1] > 0 {
            let range = (last, br);
            last = br - 1;
            range
        } else {
            let range = (last, (br + 1).min(n));
            last = br;
            range
        };

        let segment = Segment {
            start,
            end,
            coordinates: points[start..end].to_vec(),
            route_num: median(&signed[start..end]),
            dominant_route: dominant_route(&signed[start..end]),
            distance_m: deltas[start..end].iter().skip(1).sum(),
            distance_to_route_m: distances[start..end].to_vec(),
        };
        if segment.is_on_route() {
            on_route_distance += segment.distance_m;
        }
        segments.push(segment);
    }

    (segments, on_route_distance)
}
