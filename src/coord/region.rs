//! Viewport computation over a point set

use crate::coord::{Coordinate, Region, Span};

/// Compute the region enclosing all points, padded on every side
///
/// # Arguments
/// * `points` - Coordinates to frame (include the user's own position when tracking)
/// * `padding` - Degrees added on each side of the min/max box
///
/// # Returns
/// A region centered on the midpoint of the padded box, spanning its extent.
/// Empty input yields `Region::default()`; callers should skip the update
/// instead of framing the origin.
pub fn bounding_region<I>(points: I, padding: f64) -> Region
where
    I: IntoIterator<Item = Coordinate>,
{
    let mut points = points.into_iter();
    let Some(first) = points.next() else {
        return Region::default();
    };

    let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
    let (mut min_lng, mut max_lng) = (first.longitude, first.longitude);

    for point in points {
        min_lat = min_lat.min(point.latitude);
        max_lat = max_lat.max(point.latitude);
        min_lng = min_lng.min(point.longitude);
        max_lng = max_lng.max(point.longitude);
    }

    let padding = padding.max(0.0);
    let south = min_lat - padding;
    let north = max_lat + padding;
    let west = min_lng - padding;
    let east = max_lng + padding;

    Region::new(
        Coordinate::new((south + north) / 2.0, (west + east) / 2.0),
        Span::new(north - south, east - west),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_two_points_center_at_midpoint() {
        let sf = Coordinate::new(37.7749, -122.4194);
        let oakland = Coordinate::new(37.8044, -122.2712);

        let region = bounding_region([sf, oakland], 0.005);

        assert_abs_diff_eq!(region.center.latitude, (37.7749 + 37.8044) / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(region.center.longitude, (-122.4194 + -122.2712) / 2.0, epsilon = 1e-9);
        assert!(region.span.lat_delta >= 37.8044 - 37.7749);
        assert!(region.span.lon_delta >= 122.4194 - 122.2712);
        assert_abs_diff_eq!(region.span.lat_delta, 0.0295 + 0.01, epsilon = 1e-9);
        assert_abs_diff_eq!(region.span.lon_delta, 0.1482 + 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_region_contains_every_point() {
        let points = vec![
            Coordinate::new(10.0, 10.0),
            Coordinate::new(12.0, 9.0),
            Coordinate::new(11.0, 14.0),
        ];
        let region = bounding_region(points.iter().copied(), 0.0);
        for point in points {
            assert!(region.contains(point));
        }
    }

    #[test]
    fn test_single_point_span_is_twice_padding() {
        let region = bounding_region([Coordinate::new(1.0, 2.0)], 0.25);
        assert_eq!(region.center, Coordinate::new(1.0, 2.0));
        assert_abs_diff_eq!(region.span.lat_delta, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(region.span.lon_delta, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_points_give_default_region() {
        let region = bounding_region(Vec::<Coordinate>::new(), 0.005);
        assert_eq!(region, Region::default());
    }
}
