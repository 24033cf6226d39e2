//! place-finder: location-driven nearby place search
//!
//! A library and CLI tool that follows a user's position, searches for
//! nearby places, frames them in a viewport, reverse geocodes the current
//! address and keeps a list of favorite places.
//!
//! ## Features
//!
//! - Movement-threshold position tracking with last-write-wins lookups
//! - Nearby and free-text search behind a `PlaceSearchProvider` trait
//! - Nominatim backend for search and reverse geocoding
//! - Favorites with toggle semantics over a pluggable repository
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```no_run
//! use place_finder::coord::Coordinate;
//! use place_finder::geo::get_geocoder;
//! use place_finder::search::{SearchCoordinator, SearchSettings};
//!
//! # async fn example() -> place_finder::Result<()> {
//! let coordinator = SearchCoordinator::new(get_geocoder()?, SearchSettings::default());
//! let center = Coordinate::new(40.7128, -74.0060); // NYC
//!
//! let results = coordinator.refresh_nearby(center).await;
//! for place in &results.places {
//!     println!("{} at {}", place.name(), place.coordinate());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod favorites;
pub mod format;
pub mod geo;
pub mod search;
pub mod server;
pub mod tracker;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use coord::{Coordinate, Region, Span};
pub use error::{Error, Result};
pub use favorites::{FavoriteKey, FavoriteRecord, FavoritesStore};
pub use search::{Place, PlaceId, SearchCoordinator, SearchResults};
pub use tracker::{Fix, LocationTracker, TrackerState};
