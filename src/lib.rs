//! # Route Coverage
//!
//! Measure how much of a GPS track rides along a fixed set of reference routes.
//!
//! This library provides:
//! - A build-once route index with convex hulls and oriented bounding boxes
//! - A first-pass matcher giving per-point distance to the nearest route
//! - A segmenter that splits tracks into on-route and off-route runs
//! - GeoJSON export of segments grouped by route
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch matching with rayon
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_coverage::{match_track, GpsPoint, MatchConfig, ReferenceRoute, RouteIndex};
//!
//! let route = ReferenceRoute::single(
//!     "Greenway",
//!     vec![
//!         GpsPoint::new(44.9500, -93.3000),
//!         GpsPoint::new(44.9500, -93.2800),
//!         GpsPoint::new(44.9520, -93.2600),
//!     ],
//! );
//! let index = RouteIndex::build(vec![route]).unwrap();
//!
//! let track: Vec<GpsPoint> = (0..20)
//!     .map(|i| GpsPoint::new(44.9501, -93.3000 + i as f64 * 0.001))
//!     .collect();
//!
//! let coverage = match_track(&track, &index, &MatchConfig::default());
//! assert!(coverage.on_route_distance > 1000.0);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, RouteMatchError};

// Geographic utilities (distance, deltas, cumulative distance)
pub mod geo_utils;

// Planar geometry kernel (hull, oriented box, point-to-segment distance)
pub mod geometry;
pub use geometry::OrientedBox;

// Immutable index over the reference routes
pub mod route_index;
pub use route_index::{IndexedRoute, ReferenceRoute, RouteIndex};

// First-pass matching and batch entry points
pub mod matching;
#[cfg(feature = "parallel")]
pub use matching::match_tracks_parallel;
pub use matching::{first_pass, match_track, match_tracks, MatchResult, TrackCoverage};

// Segmentation into on-route / off-route runs
pub mod segments;
pub use segments::{segment_track, Segment};

// GeoJSON feature export
pub mod export;
pub use export::{export_features, ActivityInfo, Feature, FeatureCollection};

// Heat point sampling along a matched track
pub mod heatmap;
pub use heatmap::{heat_points, HeatPoint};

// Encoded polyline input
pub mod track;
pub use track::{decode_track, encode_track};

// Algorithm toolbox - modular access to all algorithms
// Use route_coverage::algorithms::{...} for standalone algorithm access
pub mod algorithms;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use route_coverage::GpsPoint;
/// let point = GpsPoint::new(44.9778, -93.2650); // Minneapolis
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a point from GeoJSON axis order (longitude first).
    pub fn from_lon_lat(longitude: f64, latitude: f64) -> Self {
        Self::new(latitude, longitude)
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// GeoJSON bbox order: `[west, south, east, north]`.
    pub fn to_bbox(&self) -> [f64; 4] {
        [self.min_lng, self.min_lat, self.max_lng, self.max_lat]
    }
}

/// Configuration for matching, segmentation and export.
///
/// Loadable from JSON; missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Slack applied to the oriented-box containment test in the coarse filter.
    /// Default: 1.3
    pub coarse_overscale: f64,

    /// A point within this distance of its nearest route is on-route.
    /// Default: 200.0 meters
    pub on_route_threshold_m: f64,

    /// Consecutive points further apart than this force a segment break.
    /// Default: 2000.0 meters
    pub gap_threshold_m: f64,

    /// Tolerance for Douglas-Peucker simplification of exported segments (in degrees).
    /// Default: 0.0003 (~33 meters)
    pub simplification_tolerance: f64,

    /// Spacing between sampled heat points.
    /// Default: 200.0 meters
    pub heat_sample_spacing_m: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            coarse_overscale: 1.3,
            on_route_threshold_m: 200.0,
            gap_threshold_m: 2000.0,
            simplification_tolerance: 0.0003,
            heat_sample_spacing_m: 200.0,
        }
    }
}

impl MatchConfig {
    /// Reject values that would make matching meaningless.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("coarse_overscale", self.coarse_overscale, 1.0),
            ("on_route_threshold_m", self.on_route_threshold_m, 0.0),
            ("gap_threshold_m", self.gap_threshold_m, 0.0),
            ("simplification_tolerance", self.simplification_tolerance, 0.0),
            (
                "heat_sample_spacing_m",
                self.heat_sample_spacing_m,
                heatmap::MIN_SAMPLE_SPACING_M,
            ),
        ];
        for (field, value, min) in checks {
            if !value.is_finite() || value < min {
                return Err(RouteMatchError::ConfigError {
                    message: format!("{} must be a finite value >= {}, got {}", field, min, value),
                });
            }
        }
        if self.gap_threshold_m < self.on_route_threshold_m {
            return Err(RouteMatchError::ConfigError {
                message: format!(
                    "gap_threshold_m ({}) is smaller than on_route_threshold_m ({})",
                    self.gap_threshold_m, self.on_route_threshold_m
                ),
            });
        }
        Ok(())
    }

    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
