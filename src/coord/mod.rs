//! Geographic primitives and pure geometry
//!
//! This module handles:
//! - Coordinates, spans and rectangular map regions
//! - Great-circle distance between coordinates
//! - Viewport computation over a set of points

pub mod distance;
pub mod region;

pub use distance::{distance, distance_between};
pub use region::bounding_region;

use serde::{Deserialize, Serialize};

/// Span used for the default map framing (degrees)
pub const DEFAULT_SPAN_DEGREES: f64 = 0.01;

/// A geographic coordinate (latitude, longitude) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The origin (0, 0), used when no position is known yet
    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Latitude/longitude extent of a region, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub lat_delta: f64,
    pub lon_delta: f64,
}

impl Span {
    /// Create a span; negative deltas are clamped to zero
    pub fn new(lat_delta: f64, lon_delta: f64) -> Self {
        Self {
            lat_delta: lat_delta.max(0.0),
            lon_delta: lon_delta.max(0.0),
        }
    }

    /// Square span with the same delta on both axes
    pub fn uniform(delta: f64) -> Self {
        Self::new(delta, delta)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::uniform(DEFAULT_SPAN_DEGREES)
    }
}

/// A rectangular viewport: center plus latitude/longitude span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub span: Span,
}

impl Region {
    /// Create a region around a center
    pub fn new(center: Coordinate, span: Span) -> Self {
        Self { center, span }
    }

    /// Default framing around a position
    pub fn around(center: Coordinate) -> Self {
        Self::new(center, Span::default())
    }

    /// Region edges as (south, west, north, east)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let half_lat = self.span.lat_delta / 2.0;
        let half_lon = self.span.lon_delta / 2.0;
        (
            self.center.latitude - half_lat,
            self.center.longitude - half_lon,
            self.center.latitude + half_lat,
            self.center.longitude + half_lon,
        )
    }

    /// Check whether a coordinate lies inside the region (edges included)
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        let (south, west, north, east) = self.bounds();
        (south..=north).contains(&coordinate.latitude)
            && (west..=east).contains(&coordinate.longitude)
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::around(Coordinate::origin())
    }
}
