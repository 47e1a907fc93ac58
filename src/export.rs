//! GeoJSON export of a matched track.
//!
//! Segments are simplified with Douglas-Peucker, grouped by the route they
//! were attributed to, and emitted as one `MultiLineString` feature per
//! group. The off-route group (id 0) comes first, then routes in ascending id.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::algorithms::douglas_peucker;
use crate::error::{OptionExt, Result};
use crate::route_index::RouteIndex;
use crate::segments::Segment;
use crate::{Bounds, GpsPoint, MatchConfig};

/// Route name used for the off-route group.
pub const OFF_ROUTE_NAME: &str = "off";

/// Activity metadata copied into every exported feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub id: i64,
    pub name: String,
    /// Avatar image URL of the athlete
    pub avatar: String,
    /// Unix timestamp (seconds since epoch)
    pub start_date: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }

    /// Serialize to a compact GeoJSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: MultiLineString,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLineString {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lng, lat]` pairs, rounded to 5 decimals
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub name: String,
    pub avatar: String,
    pub id: i64,
    /// `[west, south, east, north]`
    pub bbox: [f64; 4],
    pub start_date: i64,
    /// Route display name, or `"off"`
    pub route: String,
    /// Meters, summed over the grouped segments
    pub distance: f64,
    pub on_route: bool,
}

/// Round a coordinate to 5 decimals (~1 m).
#[inline]
fn round5(v: f64) -> f64 {
    (v * 1e5).round() / 1e5
}

struct RouteGroup {
    lines: Vec<Vec<GpsPoint>>,
    distance: f64,
}

/// Build the GeoJSON features for one matched activity.
///
/// Segments whose simplified line has fewer than 2 points are dropped. A
/// group only exists if at least one of its segments survives.
pub fn export_features(
    segments: &[Segment],
    index: &RouteIndex,
    activity: &ActivityInfo,
    config: &MatchConfig,
) -> Result<FeatureCollection> {
    let mut groups: BTreeMap<u32, RouteGroup> = BTreeMap::new();

    for segment in segments {
        let simplified = douglas_peucker(&segment.coordinates, config.simplification_tolerance);
        if simplified.len() < 2 {
            continue;
        }
        let rounded: Vec<GpsPoint> = simplified
            .iter()
            .map(|p| GpsPoint::new(round5(p.latitude), round5(p.longitude)))
            .collect();

        let group = groups.entry(segment.route_id()).or_insert_with(|| RouteGroup {
            lines: Vec::new(),
            distance: 0.0,
        });
        group.lines.push(rounded);
        group.distance += segment.distance_m;
    }

    let mut features = Vec::with_capacity(groups.len());
    for (route_id, group) in groups {
        let route = if route_id == 0 {
            OFF_ROUTE_NAME.to_string()
        } else {
            index
                .route_name(route_id)
                .ok_or_internal(&format!("segment attributed to unknown route {}", route_id))?
                .to_string()
        };

        let all_points: Vec<GpsPoint> = group.lines.iter().flatten().copied().collect();
        let bounds = Bounds::from_points(&all_points).ok_or_internal("empty route group")?;

        features.push(Feature {
            kind: "Feature".to_string(),
            geometry: MultiLineString {
                kind: "MultiLineString".to_string(),
                coordinates: group
                    .lines
                    .iter()
                    .map(|line| line.iter().map(|p| [p.longitude, p.latitude]).collect())
                    .collect(),
            },
            properties: FeatureProperties {
                name: activity.name.clone(),
                avatar: activity.avatar.clone(),
                id: activity.id,
                bbox: bounds.to_bbox(),
                start_date: activity.start_date,
                route,
                distance: group.distance,
                on_route: route_id > 0,
            },
        });
    }

    debug!(
        "[Export] Activity {}: {} segments -> {} features",
        activity.id,
        segments.len(),
        features.len()
    );

    Ok(FeatureCollection::new(features))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReferenceRoute;

    fn index() -> RouteIndex {
        let a = ReferenceRoute::single(
            "Cedar",
            vec![
                GpsPoint::new(45.0, -93.0),
                GpsPoint::new(45.0, -92.99),
                GpsPoint::new(45.01, -92.99),
            ],
        );
        let b = ReferenceRoute::single(
            "Lake",
            vec![
                GpsPoint::new(45.1, -93.0),
                GpsPoint::new(45.1, -92.99),
                GpsPoint::new(45.11, -92.99),
            ],
        );
        RouteIndex::build(vec![a, b]).unwrap()
    }

    fn activity() -> ActivityInfo {
        ActivityInfo {
            id: 42,
            name: "Morning ride".to_string(),
            avatar: "https://example.org/a.png".to_string(),
            start_date: 1_560_000_000,
        }
    }

    fn segment(route_num: f64, coords: Vec<GpsPoint>, distance_m: f64) -> Segment {
        let n = coords.len();
        Segment {
            start: 0,
            end: n,
            coordinates: coords,
            route_num,
            dominant_route: route_num.max(0.0) as u32,
            distance_m,
            distance_to_route_m: vec![0.0; n],
        }
    }

    fn line(lat: f64, n: usize) -> Vec<GpsPoint> {
        (0..n)
            .map(|i| GpsPoint::new(lat, -93.0 + i as f64 * 0.001))
            .collect()
    }

    #[test]
    fn test_groups_by_route_in_ascending_order() {
        let segments = vec![
            segment(2.0, line(45.1, 5), 300.0),
            segment(-1.0, line(45.05, 5), 100.0),
            segment(1.0, line(45.0, 5), 200.0),
            segment(2.0, line(45.1001, 5), 50.0),
        ];
        let fc =
            export_features(&segments, &index(), &activity(), &MatchConfig::default()).unwrap();

        let routes: Vec<&str> = fc
            .features
            .iter()
            .map(|f| f.properties.route.as_str())
            .collect();
        assert_eq!(routes, vec!["off", "Cedar", "Lake"]);

        let lake = &fc.features[2];
        assert_eq!(lake.geometry.coordinates.len(), 2);
        assert_eq!(lake.properties.distance, 350.0);
        assert!(lake.properties.on_route);
        assert!(!fc.features[0].properties.on_route);
        assert_eq!(fc.features[1].properties.id, 42);
    }

    #[test]
    fn test_simplified_and_rounded_coordinates() {
        let coords = vec![
            GpsPoint::new(45.000001, -93.000004),
            GpsPoint::new(45.000002, -92.999),
            GpsPoint::new(45.000003, -92.998),
        ];
        let fc = export_features(
            &[segment(1.0, coords, 150.0)],
            &index(),
            &activity(),
            &MatchConfig::default(),
        )
        .unwrap();

        let lines = &fc.features[0].geometry.coordinates;
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[0][0], [-93.0, 45.0]);
        assert_eq!(fc.features[0].properties.bbox, [-93.0, 45.0, -92.998, 45.0]);
    }

    #[test]
    fn test_boundary_segment_filed_under_route_it_touches() {
        // Signed ids [-1, 2] have median 0.5, but only route 2 is present
        let mut boundary = segment(0.5, line(45.1, 2), 80.0);
        boundary.dominant_route = 2;
        let fc =
            export_features(&[boundary], &index(), &activity(), &MatchConfig::default()).unwrap();
        assert_eq!(fc.features.len(), 1);
        assert_eq!(fc.features[0].properties.route, "Lake");
    }

    #[test]
    fn test_degenerate_segments_dropped() {
        let single = segment(1.0, line(45.0, 1), 0.0);
        let fc =
            export_features(&[single], &index(), &activity(), &MatchConfig::default()).unwrap();
        assert!(fc.features.is_empty());
    }

    #[test]
    fn test_unknown_route_is_internal_error() {
        let fc = export_features(
            &[segment(9.0, line(45.0, 3), 10.0)],
            &index(),
            &activity(),
            &MatchConfig::default(),
        );
        assert!(matches!(fc, Err(crate::RouteMatchError::Internal { .. })));
    }

    #[test]
    fn test_geojson_shape() {
        let fc = export_features(
            &[segment(1.0, line(45.0, 3), 160.0)],
            &index(),
            &activity(),
            &MatchConfig::default(),
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&fc.to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        let feature = &json["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "MultiLineString");
        assert_eq!(feature["properties"]["route"], "Cedar");
        assert_eq!(feature["properties"]["on_route"], true);
        assert_eq!(feature["properties"]["start_date"], 1_560_000_000);
        assert_eq!(feature["properties"]["bbox"].as_array().unwrap().len(), 4);
    }
}
