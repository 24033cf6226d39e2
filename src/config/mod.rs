//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/place-finder/config.toml

pub mod defaults;

use crate::constants::api::{NOMINATIM_URL, USER_AGENT};
use crate::error::{Error, Result};
use crate::favorites::repository::JsonFileRepository;
use crate::favorites::{FavoriteKey, FavoritesStore};
use crate::geo::nominatim::NominatimBackend;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Nearby and text search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Position tracking and viewport settings
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Favorites storage
    #[serde(default)]
    pub favorites: FavoritesConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Search and geocoding provider
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Query sent for the automatic nearby search
    #[serde(default = "default_nearby_query")]
    pub nearby_query: String,

    /// Nearby results closer than this to the center are dropped
    #[serde(default = "default_min_distance")]
    pub min_distance_meters: f64,

    /// Maximum number of nearby results
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Span of the search region in degrees
    #[serde(default = "default_search_span")]
    pub search_span_degrees: f64,
}

/// Tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Minimum movement before a fix is accepted
    #[serde(default = "default_movement_threshold")]
    pub movement_threshold_meters: f64,

    /// Padding around framed results
    #[serde(default = "default_viewport_padding")]
    pub viewport_padding_degrees: f64,

    /// Span of the region around the current position
    #[serde(default = "default_region_span")]
    pub default_span_degrees: f64,

    /// Poll interval of IP-based tracking
    #[serde(default = "default_ip_poll_interval")]
    pub ip_poll_interval_secs: u64,
}

/// Favorites settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoritesConfig {
    /// Identity used to match favorites ("place_id" or "name")
    #[serde(default)]
    pub key: FavoriteKey,

    /// Favorites file; defaults to the XDG data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the Nominatim instance
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// User-Agent sent with provider requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// Default value functions for serde
fn default_nearby_query() -> String {
    DEFAULT_NEARBY_QUERY.to_string()
}
fn default_min_distance() -> f64 {
    DEFAULT_MIN_DISTANCE_METERS
}
fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
fn default_search_span() -> f64 {
    DEFAULT_SEARCH_SPAN_DEGREES
}
fn default_movement_threshold() -> f64 {
    DEFAULT_MOVEMENT_THRESHOLD_METERS
}
fn default_viewport_padding() -> f64 {
    DEFAULT_VIEWPORT_PADDING_DEGREES
}
fn default_region_span() -> f64 {
    DEFAULT_REGION_SPAN_DEGREES
}
fn default_ip_poll_interval() -> u64 {
    DEFAULT_IP_POLL_INTERVAL_SECS
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_nominatim_url() -> String {
    NOMINATIM_URL.to_string()
}
fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            nearby_query: default_nearby_query(),
            min_distance_meters: default_min_distance(),
            max_results: default_max_results(),
            search_span_degrees: default_search_span(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            movement_threshold_meters: default_movement_threshold(),
            viewport_padding_degrees: default_viewport_padding(),
            default_span_degrees: default_region_span(),
            ip_poll_interval_secs: default_ip_poll_interval(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key". Returns None for unknown keys.
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["search", "nearby_query"] => Some(self.search.nearby_query.clone()),
            ["search", "min_distance_meters"] => Some(self.search.min_distance_meters.to_string()),
            ["search", "max_results"] => Some(self.search.max_results.to_string()),
            ["search", "search_span_degrees"] => Some(self.search.search_span_degrees.to_string()),

            ["tracking", "movement_threshold_meters"] => {
                Some(self.tracking.movement_threshold_meters.to_string())
            }
            ["tracking", "viewport_padding_degrees"] => {
                Some(self.tracking.viewport_padding_degrees.to_string())
            }
            ["tracking", "default_span_degrees"] => {
                Some(self.tracking.default_span_degrees.to_string())
            }
            ["tracking", "ip_poll_interval_secs"] => {
                Some(self.tracking.ip_poll_interval_secs.to_string())
            }

            ["favorites", "key"] => Some(self.favorites.key.to_string()),
            ["favorites", "path"] => Some(
                self.favorites
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["provider", "nominatim_url"] => Some(self.provider.nominatim_url.clone()),
            ["provider", "user_agent"] => Some(self.provider.user_agent.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["search", "nearby_query"] => {
                if value.trim().is_empty() {
                    return Err(Error::Config("Nearby query cannot be empty".to_string()));
                }
                self.search.nearby_query = value.to_string();
            }
            ["search", "min_distance_meters"] => {
                self.search.min_distance_meters = parse_value(key, value)?;
            }
            ["search", "max_results"] => {
                self.search.max_results = parse_value(key, value)?;
            }
            ["search", "search_span_degrees"] => {
                self.search.search_span_degrees = parse_value(key, value)?;
            }

            ["tracking", "movement_threshold_meters"] => {
                self.tracking.movement_threshold_meters = parse_value(key, value)?;
            }
            ["tracking", "viewport_padding_degrees"] => {
                self.tracking.viewport_padding_degrees = parse_value(key, value)?;
            }
            ["tracking", "default_span_degrees"] => {
                self.tracking.default_span_degrees = parse_value(key, value)?;
            }
            ["tracking", "ip_poll_interval_secs"] => {
                let secs: u64 = parse_value(key, value)?;
                if secs == 0 {
                    return Err(Error::Config("Poll interval must be positive".to_string()));
                }
                self.tracking.ip_poll_interval_secs = secs;
            }

            ["favorites", "key"] => {
                self.favorites.key = parse_value(key, value)?;
            }
            ["favorites", "path"] => {
                self.favorites.path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(key, value)?;
            }

            ["provider", "nominatim_url"] => {
                self.provider.nominatim_url = value.trim_end_matches('/').to_string();
            }
            ["provider", "user_agent"] => {
                self.provider.user_agent = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "search.nearby_query",
            "search.min_distance_meters",
            "search.max_results",
            "search.search_span_degrees",
            "tracking.movement_threshold_meters",
            "tracking.viewport_padding_degrees",
            "tracking.default_span_degrees",
            "tracking.ip_poll_interval_secs",
            "favorites.key",
            "favorites.path",
            "server.host",
            "server.port",
            "provider.nominatim_url",
            "provider.user_agent",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// IP polling period
    pub fn ip_poll_interval(&self) -> Duration {
        Duration::from_secs(self.tracking.ip_poll_interval_secs.max(1))
    }

    /// Favorites file, either configured or under the XDG data directory
    pub fn favorites_path(&self) -> Result<PathBuf> {
        match &self.favorites.path {
            Some(path) => Ok(path.clone()),
            None => JsonFileRepository::default_path(),
        }
    }

    /// Open the file-backed favorites store
    pub fn open_favorites(&self) -> Result<FavoritesStore<JsonFileRepository>> {
        let repo = JsonFileRepository::load_from(self.favorites_path()?)?;
        Ok(FavoritesStore::new(repo, self.favorites.key))
    }

    /// Build the Nominatim backend from the provider settings
    pub fn geocoder(&self) -> Result<NominatimBackend> {
        NominatimBackend::with_base_url(&self.provider.nominatim_url, &self.provider.user_agent)
    }
}
