//! Nominatim backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for place search, forward geocoding and
//! reverse geocoding.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::constants::api::{NOMINATIM_URL, USER_AGENT};
use crate::coord::{Coordinate, Region};
use crate::error::{Error, Result};
use crate::geo::{GeoLocation, Geocoder, Placemark};
use crate::search::{Place, PlaceId, PlaceSearchProvider};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Upper bound on results requested per search
const SEARCH_LIMIT: usize = 40;

/// Nominatim geocoding and search backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim jsonv2 result item (search and reverse share the shape)
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    osm_type: Option<String>,
    #[serde(default)]
    osm_id: Option<u64>,
    lat: String,
    lon: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    address: HashMap<String, String>,
}

/// Reverse lookups answer 200 with an `error` field when nothing is found
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    NotFound { error: String },
    Found(NominatimPlace),
}

impl NominatimBackend {
    /// Create a new Nominatim backend against the public instance
    pub fn new() -> Result<Self> {
        Self::with_base_url(NOMINATIM_URL, USER_AGENT)
    }

    /// Create a backend against a specific Nominatim instance
    pub fn with_base_url(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Geocode a free-form location string to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    pub async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let url = format!(
            "{}/search?q={}&format=jsonv2&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let results: Vec<NominatimPlace> = self.get_json(&url).await.map_err(Error::Geocoding)?;

        match results.into_iter().next() {
            Some(result) => {
                let (lat, lng) = parse_coords(&result.lat, &result.lon)?;
                Ok(Some(GeoLocation {
                    lat,
                    lng,
                    display_name: result.display_name.unwrap_or_default(),
                }))
            }
            None => Ok(None),
        }
    }

    fn search_url(&self, query: &str, region: Region) -> String {
        let (south, west, north, east) = region.bounds();
        format!(
            "{}/search?q={}&format=jsonv2&viewbox={},{},{},{}&bounded=1&limit={}",
            self.base_url,
            urlencoding::encode(query),
            west,
            north,
            east,
            south,
            SEARCH_LIMIT
        )
    }

    fn reverse_url(&self, coordinate: Coordinate) -> String {
        format!(
            "{}/reverse?lat={}&lon={}&format=jsonv2&addressdetails=1",
            self.base_url, coordinate.latitude, coordinate.longitude
        )
    }

    /// GET a URL and decode its JSON body, describing failures as text
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> std::result::Result<T, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Nominatim request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Nominatim returned status: {}", response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Nominatim response: {}", e))
    }
}

impl PlaceSearchProvider for NominatimBackend {
    async fn search(&self, query: &str, region: Region) -> Result<Vec<Place>> {
        let url = self.search_url(query, region);
        debug!("Nominatim search: {}", url);

        let results: Vec<NominatimPlace> = self.get_json(&url).await.map_err(Error::Search)?;

        results.into_iter().map(place_from_result).collect()
    }
}

impl Geocoder for NominatimBackend {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Option<Placemark>> {
        let url = self.reverse_url(coordinate);
        debug!("Nominatim reverse: {}", url);

        let response: ReverseResponse = self.get_json(&url).await.map_err(Error::Geocoding)?;

        match response {
            ReverseResponse::Found(result) => Ok(Some(placemark_from_result(result))),
            ReverseResponse::NotFound { error } => {
                debug!("Nominatim found no address at {}: {}", coordinate, error);
                Ok(None)
            }
        }
    }
}

/// Parse lat/lng strings to f64
fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
    let lat: f64 = lat
        .parse()
        .map_err(|_| Error::Geocoding(format!("Invalid latitude: {}", lat)))?;
    let lng: f64 = lng
        .parse()
        .map_err(|_| Error::Geocoding(format!("Invalid longitude: {}", lng)))?;
    Ok((lat, lng))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn place_from_result(result: NominatimPlace) -> Result<Place> {
    let (lat, lng) = parse_coords(&result.lat, &result.lon)?;

    let id = match (&result.osm_type, result.osm_id) {
        (Some(osm_type), Some(osm_id)) => PlaceId::new(format!("osm:{}/{}", osm_type, osm_id)),
        _ => PlaceId::random(),
    };

    let mut place = Place::new(id, non_empty(result.name), Coordinate::new(lat, lng));
    if let Some(address) = non_empty(result.display_name) {
        place = place.with_address(address);
    }
    if let Some(kind) = non_empty(result.kind) {
        place = place.with_category(kind);
    }
    Ok(place)
}

/// Remove the first non-empty value among `keys` from an address map
fn take_first(address: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| non_empty(address.remove(*key)))
}

fn placemark_from_result(result: NominatimPlace) -> Placemark {
    let mut address = result.address;

    let street = match (
        take_first(&mut address, &["house_number"]),
        take_first(&mut address, &["road"]),
    ) {
        (Some(number), Some(road)) => Some(format!("{} {}", number, road)),
        (None, road) => road,
        (number, None) => number,
    };

    Placemark {
        name: non_empty(result.name).or(street),
        locality: take_first(&mut address, &["city", "town", "village", "hamlet", "suburb"]),
        administrative_area: take_first(&mut address, &["state", "county"]),
        country: take_first(&mut address, &["country"]),
    }
}
