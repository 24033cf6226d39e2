//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Query sent for the automatic nearby search
pub const DEFAULT_NEARBY_QUERY: &str = "Hotel";

/// Places closer than this to the search center are dropped
pub const DEFAULT_MIN_DISTANCE_METERS: f64 = 10.0;

/// Maximum number of nearby results kept
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Span of the region sent with searches, in degrees
pub const DEFAULT_SEARCH_SPAN_DEGREES: f64 = 0.02;

/// Fixes closer than this to the last accepted one are discarded
pub const DEFAULT_MOVEMENT_THRESHOLD_METERS: f64 = 50.0;

/// Padding added on each side of a framed viewport, in degrees
pub const DEFAULT_VIEWPORT_PADDING_DEGREES: f64 = 0.005;

/// Span of the default region around the current position, in degrees
pub const DEFAULT_REGION_SPAN_DEGREES: f64 = 0.01;

/// Seconds between IP location polls when tracking without a fix stream
pub const DEFAULT_IP_POLL_INTERVAL_SECS: u64 = 60;

/// Favorites identity key
pub const DEFAULT_FAVORITES_KEY: &str = "place_id";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Favorites file name
pub const FAVORITES_FILE_NAME: &str = "favorites.json";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "place-finder";
