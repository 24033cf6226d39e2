//! Place search
//!
//! This module defines the `PlaceSearchProvider` trait, the `Place` value it
//! produces, and the `SearchCoordinator` that decides what to search for and
//! how results are filtered and published.
//!
//! ## Flex Point
//! Adding a new search backend only requires implementing
//! `PlaceSearchProvider`; the coordinator is generic over it.

pub mod coordinator;

pub use coordinator::{SearchCoordinator, SearchOutcome, SearchResults, SearchSettings};

use crate::constants::labels::UNKNOWN_PLACE;
use crate::coord::{Coordinate, Region};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a place
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    /// Wrap a provider-issued identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh identifier for results that carry none
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A point of interest returned by a search provider
///
/// Two places are equal iff their ids match. Fields are read through
/// accessors; a place does not change after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    id: PlaceId,
    name: String,
    coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl Place {
    /// Create a place; a missing or blank name becomes "Unknown"
    pub fn new(id: PlaceId, name: Option<String>, coordinate: Coordinate) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_PLACE.to_string());

        Self {
            id,
            name,
            coordinate,
            address: None,
            category: None,
        }
    }

    /// Set the display address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the point-of-interest category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn id(&self) -> &PlaceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Place {}

/// Trait for place search backends
///
/// Implementations must be thread-safe (Send + Sync) so searches can run on
/// spawned tasks. Ordering of the returned places is provider-defined.
pub trait PlaceSearchProvider: Send + Sync {
    /// Search for places matching `query` within `region`
    fn search(
        &self,
        query: &str,
        region: Region,
    ) -> impl std::future::Future<Output = Result<Vec<Place>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_equality_by_id() {
        let coord = Coordinate::new(37.7749, -122.4194);
        let a = Place::new(PlaceId::new("osm:node/1"), Some("Hotel A".into()), coord);
        let b = Place::new(PlaceId::new("osm:node/1"), Some("Renamed".into()), Coordinate::origin());
        let c = Place::new(PlaceId::new("osm:node/2"), Some("Hotel A".into()), coord);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_place_missing_name_is_unknown() {
        let place = Place::new(PlaceId::random(), None, Coordinate::origin());
        assert_eq!(place.name(), "Unknown");

        let place = Place::new(PlaceId::random(), Some("   ".into()), Coordinate::origin());
        assert_eq!(place.name(), "Unknown");
    }

    #[test]
    fn test_random_ids_are_unique() {
        assert_ne!(PlaceId::random(), PlaceId::random());
    }

    #[test]
    fn test_place_serialization_skips_empty_fields() {
        let place = Place::new(
            PlaceId::new("osm:way/42"),
            Some("Test Hotel".into()),
            Coordinate::new(1.0, 2.0),
        )
        .with_category("hotel");

        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["id"], "osm:way/42");
        assert_eq!(json["category"], "hotel");
        assert!(json.get("address").is_none());

        let parsed: Place = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.name(), "Test Hotel");
        assert_eq!(parsed.address(), None);
    }
}
