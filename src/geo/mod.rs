//! Geocoding and location providers
//!
//! Provides reverse geocoding (coordinates to address), the Nominatim
//! backend that also serves place searches, and IP-based position fixes.

pub mod ip_location;
pub mod nominatim;

use crate::coord::Coordinate;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

impl GeoLocation {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Address components returned by reverse geocoding
///
/// Every part is optional; providers fill what they know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placemark {
    pub name: Option<String>,
    pub locality: Option<String>,
    pub administrative_area: Option<String>,
    pub country: Option<String>,
}

/// Trait for reverse geocoding backends
pub trait Geocoder: Send + Sync {
    /// Reverse geocode a coordinate to its address components
    ///
    /// Returns `Ok(None)` when the provider knows nothing about the location.
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl std::future::Future<Output = Result<Option<Placemark>>> + Send;
}

/// Get the default geocoding and search backend
pub fn get_geocoder() -> Result<nominatim::NominatimBackend> {
    nominatim::NominatimBackend::new()
}

/// Get the IP location service
pub fn get_ip_locator() -> ip_location::IpLocator {
    ip_location::IpLocator::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_location_serialization() {
        let loc = GeoLocation {
            lat: 37.7749,
            lng: -122.4194,
            display_name: "San Francisco".to_string(),
        };

        let json = serde_json::to_string(&loc).unwrap();
        let parsed: GeoLocation = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.coordinate(), Coordinate::new(37.7749, -122.4194));
        assert_eq!(parsed.display_name, "San Francisco");
    }

    #[test]
    fn test_placemark_default_is_empty() {
        let placemark = Placemark::default();
        assert!(placemark.name.is_none());
        assert!(placemark.country.is_none());
    }
}
