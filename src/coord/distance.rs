//! Great-circle distance

use crate::constants::geo::EARTH_RADIUS_METERS;
use crate::coord::Coordinate;

/// Calculate the distance between two coordinates in meters (Haversine formula)
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Distance between two optional coordinates
///
/// A missing position counts as no movement, so this returns 0.0 when
/// either side is `None`.
pub fn distance_between(a: Option<Coordinate>, b: Option<Coordinate>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => distance(a, b),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SF: Coordinate = Coordinate {
        latitude: 37.7749,
        longitude: -122.4194,
    };
    const OAKLAND: Coordinate = Coordinate {
        latitude: 37.8044,
        longitude: -122.2712,
    };

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(distance(SF, SF), 0.0);
        assert_eq!(distance(OAKLAND, OAKLAND), 0.0);
        let pole = Coordinate::new(90.0, 0.0);
        assert_eq!(distance(pole, pole), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        assert_relative_eq!(distance(SF, OAKLAND), distance(OAKLAND, SF), epsilon = 1e-9);

        let a = Coordinate::new(-33.8688, 151.2093);
        let b = Coordinate::new(51.5074, -0.1278);
        assert_relative_eq!(distance(a, b), distance(b, a), epsilon = 1e-6);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = Coordinate::new(40.7128, -74.0060);
        let b = Coordinate::new(41.7128, -74.0060);
        let d = distance(a, b);
        assert!((d - 111_195.0).abs() < 50.0, "got {}", d);
    }

    #[test]
    fn test_debounce_scale_distances() {
        // ~11 m and ~111 m north of SF
        let near = Coordinate::new(37.7750, -122.4194);
        let far = Coordinate::new(37.7759, -122.4194);

        assert!((distance(SF, near) - 11.1).abs() < 0.5);
        assert!((distance(SF, far) - 111.2).abs() < 0.5);
    }

    #[test]
    fn test_distance_between_missing_is_zero() {
        assert_eq!(distance_between(None, Some(SF)), 0.0);
        assert_eq!(distance_between(Some(SF), None), 0.0);
        assert_eq!(distance_between(None, None), 0.0);
        assert!(distance_between(Some(SF), Some(OAKLAND)) > 13_000.0);
    }
}
