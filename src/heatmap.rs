//! Heat points along a matched track.
//!
//! The track is resampled at a fixed spacing along its own length and every
//! sample carries an intensity derived from its distance to the nearest
//! route. Output is meant for client-side heat layers such as simpleheat,
//! which take `[lat, lng, intensity]` triples.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::algorithms::interpolate;
use crate::geo_utils::cumulative_distance;
use crate::matching::MatchResult;
use crate::segments::gap_breakpoints;
use crate::{GpsPoint, MatchConfig};

/// Smallest sample spacing accepted, in meters.
pub const MIN_SAMPLE_SPACING_M: f64 = 1.0;

/// A resampled track position weighted by its distance to the nearest route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// 1.0 on route, fading to 0.2 beyond 1 km
    pub intensity: f64,
}

impl HeatPoint {
    /// `[lat, lng, intensity]`, the layout heat layers expect.
    pub fn to_array(&self) -> [f64; 3] {
        [self.latitude, self.longitude, self.intensity]
    }
}

/// Intensity for a sample `distance_m` meters from its nearest route.
pub fn intensity_for_distance(distance_m: f64) -> f64 {
    if distance_m > 1000.0 {
        0.2
    } else if distance_m > 500.0 {
        0.5
    } else if distance_m > 200.0 {
        0.8
    } else {
        1.0
    }
}

/// Resample a matched track into heat points.
///
/// The track is split at gap breakpoints and every piece with at least 3
/// points is sampled every `config.heat_sample_spacing_m` meters from its
/// start, excluding its end. Position and route distance are linearly
/// interpolated between neighbouring track points.
pub fn heat_points(
    points: &[GpsPoint],
    matches: &MatchResult,
    config: &MatchConfig,
) -> Vec<HeatPoint> {
    let n = points
        .len()
        .min(matches.distance_to_route_m.len())
        .min(matches.delta_m.len());
    let spacing = config.heat_sample_spacing_m;
    if !spacing.is_finite() || spacing < MIN_SAMPLE_SPACING_M {
        warn!(
            "[Heatmap] Sample spacing {} m is below {} m, skipping",
            spacing, MIN_SAMPLE_SPACING_M
        );
        return Vec::new();
    }
    if n == 0 {
        return Vec::new();
    }

    let along = cumulative_distance(&matches.delta_m[..n]);
    let gaps = gap_breakpoints(&matches.delta_m[..n], config.gap_threshold_m);

    let mut bounds = Vec::with_capacity(gaps.len() + 2);
    bounds.push(0);
    bounds.extend(gaps);
    bounds.push(n);

    let mut heat = Vec::new();
    for piece in bounds.windows(2) {
        let (start, end) = (piece[0], piece[1]);
        if end - start < 3 {
            continue;
        }

        let xs = &along[start..end];
        let (first, last) = (xs[0], xs[xs.len() - 1]);
        let count = ((last - first) / spacing).ceil() as usize;
        let targets: Vec<f64> = (0..count)
            .map(|k| first + k as f64 * spacing)
            .take_while(|&x| x < last)
            .collect();

        let lats: Vec<f64> = points[start..end].iter().map(|p| p.latitude).collect();
        let lons: Vec<f64> = points[start..end].iter().map(|p| p.longitude).collect();
        let lat_s = interpolate(xs, &lats, &targets);
        let lon_s = interpolate(xs, &lons, &targets);
        let dist_s = interpolate(xs, &matches.distance_to_route_m[start..end], &targets);

        heat.extend(
            lat_s
                .into_iter()
                .zip(lon_s)
                .zip(dist_s)
                .map(|((latitude, longitude), d)| HeatPoint {
                    latitude,
                    longitude,
                    intensity: intensity_for_distance(d),
                }),
        );
    }

    debug!("[Heatmap] {} track points -> {} heat points", n, heat.len());
    heat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(n: usize, step_deg: f64) -> (Vec<GpsPoint>, Vec<f64>) {
        let points: Vec<GpsPoint> = (0..n)
            .map(|i| GpsPoint::new(i as f64 * step_deg, 0.0))
            .collect();
        let deltas = crate::geo_utils::point_deltas(&points);
        (points, deltas)
    }

    fn result(distances: Vec<f64>, deltas: Vec<f64>) -> MatchResult {
        MatchResult {
            nearest_route_id: vec![1; distances.len()],
            distance_to_route_m: distances,
            delta_m: deltas,
        }
    }

    #[test]
    fn test_intensity_bands() {
        assert_eq!(intensity_for_distance(0.0), 1.0);
        assert_eq!(intensity_for_distance(200.0), 1.0);
        assert_eq!(intensity_for_distance(201.0), 0.8);
        assert_eq!(intensity_for_distance(501.0), 0.5);
        assert_eq!(intensity_for_distance(1001.0), 0.2);
        assert_eq!(intensity_for_distance(f64::INFINITY), 0.2);
    }

    #[test]
    fn test_samples_every_spacing_excluding_end() {
        // 0.009° of latitude is ~1002 m per step, below the gap threshold
        let (points, deltas) = straight(3, 0.009);
        assert!(deltas[1] < 2000.0);
        let m = result(vec![0.0; 3], deltas);
        let heat = heat_points(&points, &m, &MatchConfig::default());

        // 2004 m sampled every 200 m from 0: 0, 200, ..., 2000
        assert_eq!(heat.len(), 11);
        assert_eq!(heat[0].latitude, 0.0);
        assert!(heat.iter().all(|h| h.intensity == 1.0));
        for pair in heat.windows(2) {
            assert!(pair[1].latitude > pair[0].latitude);
        }
    }

    #[test]
    fn test_pieces_split_at_gaps() {
        let mut points: Vec<GpsPoint> = (0..4)
            .map(|i| GpsPoint::new(i as f64 * 0.004, 0.0))
            .collect();
        points.extend((0..4).map(|i| GpsPoint::new(1.0 + i as f64 * 0.004, 0.0)));
        let deltas = crate::geo_utils::point_deltas(&points);
        let m = result(vec![0.0; 8], deltas);
        let heat = heat_points(&points, &m, &MatchConfig::default());

        // Nothing is sampled across the ~110 km jump
        assert!(heat.iter().all(|h| h.latitude < 0.013 || h.latitude >= 1.0));
        assert!(heat.iter().any(|h| h.latitude >= 1.0));
    }

    #[test]
    fn test_short_pieces_skipped() {
        let (points, deltas) = straight(2, 0.009);
        let m = result(vec![0.0; 2], deltas);
        assert!(heat_points(&points, &m, &MatchConfig::default()).is_empty());
        assert!(heat_points(&[], &result(vec![], vec![]), &MatchConfig::default()).is_empty());
    }

    #[test]
    fn test_tiny_spacing_is_rejected() {
        let (points, deltas) = straight(3, 0.009);
        let m = result(vec![0.0; 3], deltas);
        for spacing in [1e-300, 0.0, -5.0, f64::NAN, f64::INFINITY] {
            let config = MatchConfig {
                heat_sample_spacing_m: spacing,
                ..MatchConfig::default()
            };
            assert!(heat_points(&points, &m, &config).is_empty());
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_sample_count_bounded_by_length() {
        // Minimum spacing over ~2 km yields one sample per meter
        let (points, deltas) = straight(3, 0.009);
        let length = deltas.iter().sum::<f64>();
        let m = result(vec![0.0; 3], deltas);
        let config = MatchConfig {
            heat_sample_spacing_m: MIN_SAMPLE_SPACING_M,
            ..MatchConfig::default()
        };
        let heat = heat_points(&points, &m, &config);
        assert_eq!(heat.len(), length.ceil() as usize);
    }

    #[test]
    fn test_unmatched_points_fade() {
        let (points, deltas) = straight(4, 0.002);
        let m = result(vec![f64::INFINITY, f64::INFINITY, 600.0, 600.0], deltas);
        let heat = heat_points(&points, &m, &MatchConfig::default());
        assert_eq!(heat[0].intensity, 0.2);
        assert_eq!(heat.last().unwrap().intensity, 0.5);
        assert_eq!(heat[0].to_array(), [0.0, 0.0, 0.2]);
    }
}
