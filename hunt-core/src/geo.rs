//! Geographic coordinates and great-circle distance.
//!
//! The distance formula reproduces the classic nautical-mile-based
//! haversine approximation, with its exact constants, so results stay
//! numerically compatible with stories authored against it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statute miles per degree of great-circle arc (60 nautical miles,
/// 1.1515 statute miles each).
const MILES_PER_DEGREE: f64 = 60.0 * 1.1515;

/// Meters per statute mile.
const METERS_PER_MILE: f64 = 1.609344 * 1000.0;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, -90 to 90.
    pub lat: f64,
    /// Longitude in degrees, -180 to 180.
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate from decimal degrees.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both components are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// Great-circle surface distance between two coordinates, in meters.
///
/// Pure and deterministic. The intermediate cosine is clamped at 1
/// before the inverse cosine: floating error can push it slightly past
/// 1 for near-identical points, which would produce NaN.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let rad_lat_a = a.lat.to_radians();
    let rad_lat_b = b.lat.to_radians();
    let rad_delta_lng = (a.lng - b.lng).to_radians();

    let mut dist = rad_lat_a.sin() * rad_lat_b.sin()
        + rad_lat_a.cos() * rad_lat_b.cos() * rad_delta_lng.cos();
    if dist > 1.0 {
        dist = 1.0;
    }

    dist.acos().to_degrees() * MILES_PER_DEGREE * METERS_PER_MILE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_for_identical_points() {
        // At the equator the trig sum is exactly 1, so the distance is
        // exactly 0
        let origin = Coordinate::new(0.0, 7.5);
        assert_eq!(distance_meters(origin, origin), 0.0);

        // Elsewhere the sum can round a ulp below 1; the result stays
        // within rounding noise of zero, far under any geofence radius
        let points = [
            Coordinate::new(45.0, 2.0),
            Coordinate::new(46.0, 2.0),
            Coordinate::new(67.891011, 13.5),
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(89.9, -179.9),
        ];
        for p in points {
            let d = distance_meters(p, p);
            assert!(!d.is_nan(), "distance at {p} must not be NaN");
            assert!((0.0..0.2).contains(&d), "distance at {p} was {d}");
        }
    }

    #[test]
    fn test_symmetry() {
        let paris = Coordinate::new(48.8566, 2.3522);
        let berlin = Coordinate::new(52.5200, 13.4050);

        assert_eq!(
            distance_meters(paris, berlin),
            distance_meters(berlin, paris)
        );
    }

    #[test]
    fn test_known_city_distance() {
        let paris = Coordinate::new(48.8566, 2.3522);
        let berlin = Coordinate::new(52.5200, 13.4050);

        // Paris to Berlin is roughly 878 km
        let d = distance_meters(paris, berlin);
        assert!((d - 878_000.0).abs() < 10_000.0, "got {d}");
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinate::new(45.0, 2.0);
        let b = Coordinate::new(46.0, 2.0);

        // One degree of arc under these constants is 60 * 1.1515
        // statute miles, about 111.19 km
        let d = distance_meters(a, b);
        assert!((d - 111_189.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_small_offset_matches_geofence_scale() {
        // The scale a hunt actually operates at: a few meters
        let spot = Coordinate::new(45.0, 2.0);
        let user = Coordinate::new(45.00003, 2.0);

        let d = distance_meters(spot, user);
        assert!(d > 3.0 && d < 3.7, "expected ~3.3 m, got {d}");
    }

    #[test]
    fn test_clamp_guards_against_nan() {
        // Latitudes where sin*sin + cos*cos rounds a ulp above 1 on
        // common libm builds; without the clamp, acos would return NaN
        for lat in [0.01215, 0.0225, 0.0315] {
            let p = Coordinate::new(lat, -122.419_418);
            let d = distance_meters(p, p);
            assert!(!d.is_nan(), "clamp must keep acos in domain at lat {lat}");
            assert!((0.0..0.2).contains(&d));
        }
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(45.0, 2.0).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.1, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
