//! Encoded polyline tracks (Google Polyline Algorithm, precision 5).
//!
//! Tracks usually arrive as encoded polyline strings. Decoded points are
//! returned as-is: out-of-range coordinates are not filtered here, the
//! matcher simply never finds a route for them.

use geo::LineString;

use crate::error::{Result, RouteMatchError};
use crate::GpsPoint;

/// Decimal places used by the encoding.
pub const POLYLINE_PRECISION: u32 = 5;

/// Decode an encoded polyline into track points.
///
/// # Example
/// ```
/// use route_coverage::decode_track;
///
/// let track = decode_track("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
/// assert_eq!(track.len(), 3);
/// assert!((track[0].latitude - 38.5).abs() < 1e-9);
/// assert!((track[0].longitude + 120.2).abs() < 1e-9);
/// ```
pub fn decode_track(encoded: &str) -> Result<Vec<GpsPoint>> {
    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION).map_err(|e| {
        RouteMatchError::PolylineDecode {
            message: e.to_string(),
        }
    })?;

    // geo coordinates are (x, y) = (lng, lat)
    Ok(line.coords().map(|c| GpsPoint::new(c.y, c.x)).collect())
}

/// Encode track points as a polyline string.
pub fn encode_track(points: &[GpsPoint]) -> Result<String> {
    let line: LineString<f64> = points.iter().map(|p| (p.longitude, p.latitude)).collect();

    polyline::encode_coordinates(line, POLYLINE_PRECISION).map_err(|e| {
        RouteMatchError::PolylineDecode {
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reference_polyline() {
        let track = decode_track("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
        for (p, (lat, lng)) in track.iter().zip(expected) {
            assert!((p.latitude - lat).abs() < 1e-9);
            assert!((p.longitude - lng).abs() < 1e-9);
        }
    }

    #[test]
    fn test_encode_matches_reference() {
        let points = vec![
            GpsPoint::new(38.5, -120.2),
            GpsPoint::new(40.7, -120.95),
            GpsPoint::new(43.252, -126.453),
        ];
        assert_eq!(encode_track(&points).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn test_empty_polyline() {
        assert!(decode_track("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_polyline() {
        // Space is below the encoding's character range
        let err = decode_track("_p~iF ~ps|U").unwrap_err();
        assert!(matches!(err, RouteMatchError::PolylineDecode { .. }));
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        let points = vec![GpsPoint::new(95.0, 0.0), GpsPoint::new(0.0, 0.0)];
        assert!(matches!(
            encode_track(&points),
            Err(RouteMatchError::PolylineDecode { .. })
        ));
    }
}
