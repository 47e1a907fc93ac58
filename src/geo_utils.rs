//! # Geographic Utilities
//!
//! Distance helpers shared by the matcher, segmenter and heat-point sampler.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`distance_meters`] | Equirectangular distance between two GPS points |
//! | [`point_deltas`] | Per-point distance from the previous point |
//! | [`cumulative_distance`] | Running distance along a track |
//! | [`polyline_length`] | Total length of a GPS track in meters |
//!
//! ## Example
//!
//! ```rust
//! use route_coverage::{GpsPoint, geo_utils};
//!
//! let track = vec![
//!     GpsPoint::new(44.9778, -93.2650),
//!     GpsPoint::new(44.9787, -93.2650),
//!     GpsPoint::new(44.9796, -93.2650),
//! ];
//!
//! let length = geo_utils::polyline_length(&track);
//! assert!((length - 200.0).abs() < 1.0);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Equirectangular Approximation
//!
//! Longitude differences are scaled by the cosine of the mean latitude and the
//! planar hypotenuse is multiplied by 111,320 m per degree. This is only valid
//! for short distances (tens of kilometers). The on-route (200 m) and gap
//! (2 km) thresholds in [`crate::MatchConfig`] are tuned to this formula, so
//! it must not be swapped for haversine without re-validating them.

use crate::GpsPoint;

/// Meters per degree of latitude used by [`distance_meters`].
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Squared planar distance in degrees, longitude scaled by cos(mean latitude).
#[inline]
fn scaled_distance_squared(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let mean_lat = (p1.latitude + p2.latitude) / 2.0;
    let dlat = p2.latitude - p1.latitude;
    let dlon = (p2.longitude - p1.longitude) * mean_lat.to_radians().cos();
    dlat * dlat + dlon * dlon
}

/// Distance in meters between two GPS points (equirectangular approximation).
///
/// # Example
///
/// ```rust
/// use route_coverage::{GpsPoint, geo_utils};
///
/// let a = GpsPoint::new(0.0, 0.0);
/// let b = GpsPoint::new(1.0, 0.0);
/// assert!((geo_utils::distance_meters(&a, &b) - 111_320.0).abs() < 1e-6);
/// ```
#[inline]
pub fn distance_meters(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    METERS_PER_DEGREE * scaled_distance_squared(p1, p2).sqrt()
}

/// Distance from each point to its predecessor. The first entry is 0.
pub fn point_deltas(points: &[GpsPoint]) -> Vec<f64> {
    let mut deltas = Vec::with_capacity(points.len());
    if points.is_empty() {
        return deltas;
    }
    deltas.push(0.0);
    deltas.extend(points.windows(2).map(|w| distance_meters(&w[0], &w[1])));
    deltas
}

/// Running sum of `deltas`, same length as the input.
pub fn cumulative_distance(deltas: &[f64]) -> Vec<f64> {
    deltas
        .iter()
        .scan(0.0, |acc, d| {
            *acc += d;
            Some(*acc)
        })
        .collect()
}

/// Total length of a polyline in meters. Empty or single-point tracks return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| distance_meters(&w[0], &w[1]))
        .sum()
}
