//! # Geometry Kernel
//!
//! Planar geometry on (longitude, latitude) pairs used to index reference
//! routes and to measure how far track points are from them.
//!
//! All functions are pure and operate directly in degrees. Distances that are
//! reported in meters go through [`distance_meters`].
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`convex_hull`] | Monotone-chain convex hull, counter-clockwise |
//! | [`minimum_area_bounding_box`] | Rotating-calipers oriented bounding box |
//! | [`point_in_quadrilateral`] | Triangle-area inclusion test for convex quads |
//! | [`approx_distance_to_segment`] | Point-to-segment distance with a far-point shortcut |
//! | [`distance_to_polyline`] | Minimum distance to any segment of a polyline |

use serde::{Deserialize, Serialize};

use crate::geo_utils::distance_meters;
use crate::GpsPoint;

/// Default slack for [`point_in_quadrilateral`] at the box boundary.
pub const DEFAULT_OVERSCALE: f64 = 1.0001;

/// A rectangle at arbitrary rotation, corners in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub corners: [GpsPoint; 4],
}

impl OrientedBox {
    /// Area in square degrees, computed as the product of two adjacent sides.
    pub fn area(&self) -> f64 {
        let [a, b, c, _] = &self.corners;
        side_length(a, b) * side_length(b, c)
    }

    /// Inclusion test with the given boundary slack.
    #[inline]
    pub fn contains(&self, point: &GpsPoint, overscale: f64) -> bool {
        point_in_quadrilateral(point, &self.corners, overscale)
    }
}

#[inline]
fn side_length(a: &GpsPoint, b: &GpsPoint) -> f64 {
    let dx = b.longitude - a.longitude;
    let dy = b.latitude - a.latitude;
    (dx * dx + dy * dy).sqrt()
}

/// Z component of (a - o) x (b - o). Positive for a counter-clockwise turn.
#[inline]
fn cross(o: &GpsPoint, a: &GpsPoint, b: &GpsPoint) -> f64 {
    (a.longitude - o.longitude) * (b.latitude - o.latitude)
        - (a.latitude - o.latitude) * (b.longitude - o.longitude)
}

/// Sort by longitude then latitude and drop exact duplicates.
pub(crate) fn distinct_points(points: &[GpsPoint]) -> Vec<GpsPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| {
        a.longitude
            .total_cmp(&b.longitude)
            .then(a.latitude.total_cmp(&b.latitude))
    });
    sorted.dedup();
    sorted
}

/// Convex hull using Andrew's monotone chain.
///
/// The hull starts at the point with the lowest longitude (then lowest
/// latitude) and proceeds counter-clockwise. Points lying on a hull edge are
/// dropped. Input with fewer than 3 distinct points is returned unchanged.
/// Fully collinear input yields its two extreme points.
///
/// # Example
///
/// ```rust
/// use route_coverage::{GpsPoint, geometry::convex_hull};
///
/// let points = vec![
///     GpsPoint::from_lon_lat(0.0, 0.0),
///     GpsPoint::from_lon_lat(2.0, 0.0),
///     GpsPoint::from_lon_lat(1.0, 0.5),
///     GpsPoint::from_lon_lat(2.0, 2.0),
///     GpsPoint::from_lon_lat(0.0, 2.0),
/// ];
/// let hull = convex_hull(&points);
/// assert_eq!(hull.len(), 4);
/// ```
pub fn convex_hull(points: &[GpsPoint]) -> Vec<GpsPoint> {
    let sorted = distinct_points(points);
    if sorted.len() < 3 {
        return points.to_vec();
    }

    let mut lower: Vec<GpsPoint> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2
            && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<GpsPoint> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2
            && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }

    // Last point of each chain is the first point of the other
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Area of triangle ABC in square degrees.
#[inline]
pub fn triangle_area(a: &GpsPoint, b: &GpsPoint, c: &GpsPoint) -> f64 {
    (a.longitude * (b.latitude - c.latitude)
        + b.longitude * (c.latitude - a.latitude)
        + c.longitude * (a.latitude - b.latitude))
        .abs()
        / 2.0
}

/// Test whether `point` lies inside a convex rectangle.
///
/// Sums the areas of the four triangles formed by the point and each edge and
/// compares that sum with the rectangle's own area (`|side1| * |side2|`)
/// scaled by `overscale`. Interior points sum to exactly the rectangle area;
/// exterior points sum to more. `overscale` above 1.0 admits points slightly
/// outside the boundary.
pub fn point_in_quadrilateral(point: &GpsPoint, quad: &[GpsPoint; 4], overscale: f64) -> bool {
    let summed = triangle_area(point, &quad[0], &quad[1])
        + triangle_area(point, &quad[1], &quad[2])
        + triangle_area(point, &quad[2], &quad[3])
        + triangle_area(point, &quad[3], &quad[0]);

    let h_lon = quad[1].longitude - quad[0].longitude;
    let h_lat = quad[1].latitude - quad[0].latitude;
    let w_lon = quad[2].longitude - quad[1].longitude;
    let w_lat = quad[2].latitude - quad[1].latitude;
    let rect_area = ((h_lon * h_lon + h_lat * h_lat) * (w_lon * w_lon + w_lat * w_lat)).sqrt();

    summed <= rect_area * overscale
}

/// Axis-aligned box of `points` with corners (W,S), (W,N), (E,N), (E,S).
fn axis_aligned_box(points: &[GpsPoint]) -> Option<OrientedBox> {
    if points.is_empty() {
        return None;
    }
    let (mut west, mut east) = (f64::MAX, f64::MIN);
    let (mut south, mut north) = (f64::MAX, f64::MIN);
    for p in points {
        west = west.min(p.longitude);
        east = east.max(p.longitude);
        south = south.min(p.latitude);
        north = north.max(p.latitude);
    }
    Some(OrientedBox {
        corners: [
            GpsPoint::from_lon_lat(west, south),
            GpsPoint::from_lon_lat(west, north),
            GpsPoint::from_lon_lat(east, north),
            GpsPoint::from_lon_lat(east, south),
        ],
    })
}

/// Unit direction (cos, sin) of the edge from `a` to `b`.
#[inline]
fn edge_direction(a: &GpsPoint, b: &GpsPoint) -> (f64, f64) {
    let dx = b.longitude - a.longitude;
    let dy = b.latitude - a.latitude;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        (1.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

/// Bounding box of `hull` in the frame where direction (cos, sin) is the x axis.
/// Returns the box corners in the original frame and its area.
fn rotated_box(hull: &[GpsPoint], cos: f64, sin: f64) -> (OrientedBox, f64) {
    let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
    let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
    for p in hull {
        let x = p.longitude * cos + p.latitude * sin;
        let y = -p.longitude * sin + p.latitude * cos;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let unrotate = |x: f64, y: f64| GpsPoint::from_lon_lat(x * cos - y * sin, x * sin + y * cos);
    let corners = [
        unrotate(min_x, min_y),
        unrotate(min_x, max_y),
        unrotate(max_x, max_y),
        unrotate(max_x, min_y),
    ];
    let area = (max_x - min_x) * (max_y - min_y);
    (OrientedBox { corners }, area)
}

/// Minimum-area oriented bounding rectangle of a convex hull (rotating calipers).
///
/// Every hull edge is tried as a box side: the closing edge (last to first)
/// first, then each edge `i -> i+1` in hull order. The first rotation with
/// the strictly smallest area wins, so ties resolve to the earliest edge in
/// that order.
///
/// Hulls with fewer than 3 points (collinear routes) have no well-defined
/// orientation and get their own axis-aligned box. Returns `None` only for an
/// empty hull.
pub fn minimum_area_bounding_box(hull: &[GpsPoint]) -> Option<OrientedBox> {
    if hull.len() < 3 {
        return axis_aligned_box(hull);
    }

    let last = hull.len() - 1;
    let (cos, sin) = edge_direction(&hull[last], &hull[0]);
    let (mut best, mut best_area) = rotated_box(hull, cos, sin);

    for w in hull.windows(2) {
        let (cos, sin) = edge_direction(&w[0], &w[1]);
        let (candidate, area) = rotated_box(hull, cos, sin);
        if area < best_area {
            best_area = area;
            best = candidate;
        }
    }

    Some(best)
}

/// Distance in meters from `point` to segment `[v1, v2]`, with a shortcut.
///
/// When the point is farther from the segment midpoint than `sqrt(2)` times
/// the segment length (compared in squared planar degrees), the midpoint
/// distance is returned instead of the true distance. The result is an upper
/// bound that is only suitable for minimum searches over many segments, not
/// as a reported point-to-segment distance.
///
/// Otherwise the point is projected onto the segment, clamped to its
/// endpoints. A zero-length segment returns the distance to its vertex.
pub fn approx_distance_to_segment(point: &GpsPoint, v1: &GpsPoint, v2: &GpsPoint) -> f64 {
    let seg_lon = v2.longitude - v1.longitude;
    let seg_lat = v2.latitude - v1.latitude;
    let len_sq = seg_lon * seg_lon + seg_lat * seg_lat;

    let mid = GpsPoint::from_lon_lat(
        (v1.longitude + v2.longitude) / 2.0,
        (v1.latitude + v2.latitude) / 2.0,
    );
    let mid_lon = point.longitude - mid.longitude;
    let mid_lat = point.latitude - mid.latitude;
    if mid_lon * mid_lon + mid_lat * mid_lat > 2.0 * len_sq {
        return distance_meters(point, &mid);
    }

    if len_sq == 0.0 {
        return distance_meters(point, v1);
    }

    let t = ((point.longitude - v1.longitude) * seg_lon + (point.latitude - v1.latitude) * seg_lat)
        / len_sq;
    let projected = if t <= 0.0 {
        *v1
    } else if t >= 1.0 {
        *v2
    } else {
        GpsPoint::from_lon_lat(v1.longitude + t * seg_lon, v1.latitude + t * seg_lat)
    };
    distance_meters(point, &projected)
}

/// Minimum of [`approx_distance_to_segment`] over consecutive vertex pairs.
///
/// Returns `f64::INFINITY` for polylines with fewer than 2 vertices.
pub fn distance_to_polyline(point: &GpsPoint, polyline: &[GpsPoint]) -> f64 {
    polyline
        .windows(2)
        .map(|w| approx_distance_to_segment(point, &w[0], &w[1]))
        .fold(f64::INFINITY, f64::min)
}
