//! IP-based geolocation
//!
//! Uses ip-api.com for a coarse position with file-based caching, and can
//! poll it as a `LocationSource` for tracking without a GPS receiver.

use crate::constants::api::IP_API_URL;
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::error::{Error, Result};
use crate::geo::GeoLocation;
use crate::tracker::{Fix, LocationSource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::warn;

/// IP location service with caching
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

/// Cached location data
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedLocation {
    location: GeoLocation,
    timestamp: u64,
}

impl IpLocator {
    /// Create a new IP locator with default cache path
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir()
            .map(|p| p.join(crate::config::defaults::APP_DIR_NAME).join(IP_LOCATION_CACHE_FILE));

        Self {
            client: reqwest::Client::new(),
            cache_path,
        }
    }

    /// Create an IP locator with a specific cache path
    pub fn with_cache_path(cache_path: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: Some(cache_path),
        }
    }

    /// Create an IP locator without caching
    pub fn without_cache() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: None,
        }
    }

    /// Get current location based on IP address
    pub async fn locate(&self) -> Result<GeoLocation> {
        if let Some(cached) = self.load_cache() {
            return Ok(cached);
        }

        let location = self.fetch_location().await?;
        self.save_cache(&location);

        Ok(location)
    }

    /// Poll the locator as a fix source
    ///
    /// The cache is bypassed so every tick asks the service again.
    pub fn poll(every: Duration) -> IpLocationSource {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        IpLocationSource {
            locator: Self::without_cache(),
            ticker,
        }
    }

    /// Fetch location from ip-api.com
    async fn fetch_location(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(IP_API_URL)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse IP location response: {}", e)))?;

        location_from_response(data)
    }

    /// Load cached location if valid
    fn load_cache(&self) -> Option<GeoLocation> {
        let cache_path = self.cache_path.as_ref()?;

        if !cache_path.exists() {
            return None;
        }

        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedLocation = serde_json::from_str(&content).ok()?;

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()?
            .as_secs();

        if now.saturating_sub(cached.timestamp) < IP_LOCATION_TTL_SECS {
            Some(cached.location)
        } else {
            None
        }
    }

    /// Save location to cache
    fn save_cache(&self, location: &GeoLocation) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let cached = CachedLocation {
            location: location.clone(),
            timestamp,
        };

        if let Ok(content) = serde_json::to_string_pretty(&cached) {
            let _ = fs::write(cache_path, content);
        }
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

fn location_from_response(data: IpApiResponse) -> Result<GeoLocation> {
    if data.status != "success" {
        return Err(Error::Geocoding("IP location lookup failed".to_string()));
    }

    let lat = data
        .lat
        .ok_or_else(|| Error::Geocoding("No latitude in response".to_string()))?;
    let lng = data
        .lon
        .ok_or_else(|| Error::Geocoding("No longitude in response".to_string()))?;

    let display_name = [data.city, data.region_name, data.country]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    Ok(GeoLocation {
        lat,
        lng,
        display_name: if display_name.is_empty() {
            "Unknown Location".to_string()
        } else {
            display_name
        },
    })
}

/// Periodic IP location fixes
///
/// Lookup failures are logged and retried on the next tick; the stream
/// never ends on its own.
pub struct IpLocationSource {
    locator: IpLocator,
    ticker: Interval,
}

impl LocationSource for IpLocationSource {
    async fn next_fix(&mut self) -> Option<Fix> {
        loop {
            self.ticker.tick().await;
            match self.locator.locate().await {
                Ok(location) => return Some(Fix::new(location.coordinate())),
                Err(e) => warn!("IP location poll failed: {}", e),
            }
        }
    }
}
