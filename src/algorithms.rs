//! # Algorithm Toolbox
//!
//! This module provides direct access to the coverage algorithms.
//! Use these for integrating specific steps into your own pipeline
//! without going through [`crate::match_track`].
//!
//! ## Core Algorithms
//!
//! - **First Pass**: nearest plausible route per track point
//! - **Segmentation**: on-route / off-route runs with breakpoint attribution
//! - **Heat Points**: distance-weighted resampling of a matched track
//!
//! ## Geometry
//!
//! - **Convex Hull**: monotone chain
//! - **Oriented Box**: minimum-area rectangle by rotating calipers
//! - **Point in Quadrilateral**: triangle-area containment test
//! - **Douglas-Peucker**: Line simplification
//!
//! # Example
//!
//! ```rust
//! use route_coverage::algorithms::{
//!     convex_hull, distance_meters, minimum_area_bounding_box, point_in_quadrilateral, GpsPoint,
//! };
//!
//! let square = vec![
//!     GpsPoint::new(45.0, -93.0),
//!     GpsPoint::new(45.0, -92.875),
//!     GpsPoint::new(45.125, -92.875),
//!     GpsPoint::new(45.125, -93.0),
//! ];
//! let hull = convex_hull(&square);
//! let bbox = minimum_area_bounding_box(&hull).unwrap();
//! assert!(point_in_quadrilateral(&GpsPoint::new(45.0625, -92.9375), &bbox.corners, 1.0));
//!
//! let d = distance_meters(&square[0], &square[3]);
//! assert!((d - 13_915.0).abs() < 1e-6);
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{
    Bounds,
    GpsPoint,
    IndexedRoute,
    MatchConfig,
    MatchResult,
    OrientedBox,
    ReferenceRoute,
    RouteIndex,
    Segment,
};

// =============================================================================
// Geographic Utilities
// =============================================================================

pub use crate::geo_utils::{
    cumulative_distance,
    distance_meters,
    point_deltas,
    polyline_length,
};

// =============================================================================
// Geometry Kernel
// =============================================================================

pub use crate::geometry::{
    approx_distance_to_segment,
    convex_hull,
    distance_to_polyline,
    minimum_area_bounding_box,
    point_in_quadrilateral,
    triangle_area,
    DEFAULT_OVERSCALE,
};

// =============================================================================
// Matching Pipeline
// =============================================================================

/// Per-point nearest route with the oriented-box coarse filter.
pub use crate::first_pass;

/// Split a matched track into on-route / off-route segments.
///
/// Returns the segments and the total on-route distance in meters.
pub use crate::segment_track;

/// Distance-weighted heat points along a matched track.
pub use crate::heat_points;

// =============================================================================
// Line Simplification
// =============================================================================

/// Douglas-Peucker line simplification algorithm.
///
/// Reduces the number of points in a polyline while preserving shape.
/// Uses the geo crate's implementation.
///
/// # Arguments
/// * `points` - Input polyline
/// * `tolerance` - Maximum deviation from original line (in degrees)
///
/// # Returns
/// Simplified polyline with fewer points
///
/// # Example
/// ```rust
/// use route_coverage::algorithms::{douglas_peucker, GpsPoint};
///
/// let track = vec![
///     GpsPoint::new(45.0000, -93.0000),
///     GpsPoint::new(45.0000, -92.9990),
///     GpsPoint::new(45.0000, -92.9980),
/// ];
/// let simplified = douglas_peucker(&track, 0.0003);
/// assert_eq!(simplified.len(), 2);
/// ```
pub fn douglas_peucker(points: &[GpsPoint], tolerance: f64) -> Vec<GpsPoint> {
    use geo::{algorithm::simplify::Simplify, Coord, LineString};

    if points.len() < 2 {
        return points.to_vec();
    }

    let coords: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();

    let line = LineString::new(coords);
    let simplified = line.simplify(&tolerance);

    simplified
        .coords()
        .map(|c| GpsPoint::new(c.y, c.x))
        .collect()
}

/// Linear interpolation of `ys` sampled at increasing positions `xs`.
///
/// Targets outside `[xs[0], xs[last]]` clamp to the end values. If either
/// neighbouring sample is infinite the result is infinite.
///
/// # Example
/// ```rust
/// use route_coverage::algorithms::interpolate;
///
/// let out = interpolate(&[0.0, 10.0, 20.0], &[0.0, 100.0, f64::INFINITY], &[5.0, 15.0]);
/// assert_eq!(out[0], 50.0);
/// assert!(out[1].is_infinite());
/// ```
pub fn interpolate(xs: &[f64], ys: &[f64], targets: &[f64]) -> Vec<f64> {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return vec![f64::NAN; targets.len()];
    }

    let mut out = Vec::with_capacity(targets.len());
    let mut k = 0;
    for &t in targets {
        // Targets arrive in ascending order, so the bracket only moves forward
        while k + 2 < n && xs[k + 1] < t {
            k += 1;
        }
        if n == 1 || t <= xs[0] {
            out.push(ys[0]);
            continue;
        }
        let (x0, x1, y0, y1) = (xs[k], xs[k + 1], ys[k], ys[k + 1]);
        let value = if t >= x1 {
            y1
        } else if y0.is_infinite() || y1.is_infinite() {
            f64::INFINITY
        } else if x1 == x0 {
            y0
        } else {
            y0 + (t - x0) / (x1 - x0) * (y1 - y0)
        };
        out.push(value);
    }
    out
}
