//! Centralized constants for the place-finder crate
//!
//! Values shared across modules live here so the coordinator, tracker and
//! CLI agree on them.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters (WGS84 approximation)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding and search API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// User-Agent sent to Nominatim (required by its usage policy)
    pub const USER_AGENT: &str = concat!("place-finder/", env!("CARGO_PKG_VERSION"));
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}

/// User-facing strings published by the tracker
pub mod labels {
    /// Address shown before the first reverse geocode completes
    pub const ADDRESS_PENDING: &str = "Fetching address...";

    /// Address shown when reverse geocoding fails or finds nothing
    pub const ADDRESS_NOT_FOUND: &str = "Address not found";

    /// Altitude shown before the first fix with altitude arrives
    pub const ALTITUDE_PENDING: &str = "Fetching altitude...";

    /// Name given to places the provider returns without one
    pub const UNKNOWN_PLACE: &str = "Unknown";
}
