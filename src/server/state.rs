//! Server shared state
//!
//! Holds the search coordinator, geocoder, favorites and the tracking
//! session shared by all requests.

use crate::config::Config;
use crate::coord::Span;
use crate::error::Result;
use crate::favorites::{FavoritesRepository, FavoritesStore, JsonFileRepository};
use crate::geo::nominatim::NominatimBackend;
use crate::geo::Geocoder;
use crate::search::{PlaceSearchProvider, SearchCoordinator, SearchSettings};
use crate::tracker::{LocationTracker, TrackerSettings};
use std::sync::Arc;
use std::time::Instant;

/// State of the production server
pub type NominatimState = AppState<NominatimBackend, NominatimBackend, JsonFileRepository>;

/// Shared state for the HTTP server
pub struct AppState<P, G, R> {
    pub coordinator: Arc<SearchCoordinator<P>>,
    pub geocoder: Arc<G>,
    pub favorites: FavoritesStore<R>,
    /// Session fed by `POST /api/position`
    pub tracker: LocationTracker<P, G>,
    /// Framing used when a blank search falls back to nearby
    pub default_span: Span,
    started: Instant,
}

impl NominatimState {
    /// Build the state from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.geocoder()?,
            config.geocoder()?,
            config.open_favorites()?,
            config,
        ))
    }
}

impl<P, G, R> AppState<P, G, R>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    /// Create new application state
    pub fn new(provider: P, geocoder: G, favorites: FavoritesStore<R>, config: &Config) -> Self {
        let coordinator = Arc::new(SearchCoordinator::new(provider, SearchSettings::from(config)));
        let geocoder = Arc::new(geocoder);
        let settings = TrackerSettings::from(config);
        let default_span = settings.default_span;
        let tracker = LocationTracker::new(coordinator.clone(), geocoder.clone(), settings);

        Self {
            coordinator,
            geocoder,
            favorites,
            tracker,
            default_span,
            started: Instant::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
