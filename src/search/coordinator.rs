//! Search coordination
//!
//! Wraps a `PlaceSearchProvider` with the nearby-search policy (fixed query,
//! minimum distance filter, result cap), the free-text search contract, and
//! generation-tagged publishing of results to subscribers.

use crate::config::Config;
use crate::coord::{bounding_region, distance, Coordinate, Region, Span};
use crate::search::{Place, PlaceSearchProvider};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Tunables for the coordinator
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Query sent for proximity searches
    pub nearby_query: String,
    /// Candidates closer than this to the search center are dropped
    pub min_distance_meters: f64,
    /// Maximum number of nearby results kept
    pub max_results: usize,
    /// Span of the region searched around a position
    pub search_span: Span,
    /// Degrees of padding around published viewports
    pub viewport_padding: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SearchSettings {
    fn from(config: &Config) -> Self {
        Self {
            nearby_query: config.search.nearby_query.clone(),
            min_distance_meters: config.search.min_distance_meters,
            max_results: config.search.max_results,
            search_span: Span::uniform(config.search.search_span_degrees),
            viewport_padding: config.tracking.viewport_padding_degrees,
        }
    }
}

/// Result of a free-text search request
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The provider was queried; results are unfiltered
    Results(Vec<Place>),
    /// The query was empty. The provider was not called; the caller should
    /// run a nearby search around the last known position and reset the
    /// viewport to the default framing.
    FallbackToNearby,
}

/// Latest published place list and the viewport framing it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Generation of the request that produced these results (0 = none yet)
    pub generation: u64,
    pub places: Vec<Place>,
    /// `None` when there was nothing to frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Region>,
}

/// Decides what to search for and publishes the outcome
pub struct SearchCoordinator<P> {
    provider: P,
    settings: SearchSettings,
    last_query: Mutex<String>,
    in_flight: AtomicUsize,
    generation: AtomicU64,
    results: watch::Sender<SearchResults>,
}

/// Marks a provider call as in flight for as long as it lives, including
/// when the owning task is aborted mid-request.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<P: PlaceSearchProvider> SearchCoordinator<P> {
    /// Create a coordinator around a provider
    pub fn new(provider: P, settings: SearchSettings) -> Self {
        let (results, _) = watch::channel(SearchResults::default());
        Self {
            provider,
            settings,
            last_query: Mutex::new(String::new()),
            in_flight: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            results,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Last free-text query passed to `search`
    pub fn last_query(&self) -> String {
        self.last_query
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// True while at least one provider request is outstanding
    pub fn is_searching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Subscribe to published results
    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.results.subscribe()
    }

    /// Snapshot of the most recently published results
    pub fn latest(&self) -> SearchResults {
        self.results.borrow().clone()
    }

    /// Reserve a generation number for a new request
    ///
    /// Later reservations supersede earlier ones when publishing.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Region searched around a position
    pub fn nearby_region(&self, center: Coordinate) -> Region {
        Region::new(center, self.settings.search_span)
    }

    /// Search the configured nearby query around `center`
    ///
    /// Drops candidates within `min_distance_meters` of the center (the user's
    /// own position is not a "nearby place") and keeps at most `max_results`,
    /// in provider order.
    pub async fn search_nearby(&self, center: Coordinate) -> Vec<Place> {
        let region = self.nearby_region(center);
        let candidates = self
            .query_provider(&self.settings.nearby_query, region)
            .await;

        let total = candidates.len();
        let places: Vec<Place> = candidates
            .into_iter()
            .filter(|place| distance(center, place.coordinate()) >= self.settings.min_distance_meters)
            .take(self.settings.max_results)
            .collect();

        debug!(
            "Nearby search around {} kept {} of {} candidates",
            center,
            places.len(),
            total
        );
        places
    }

    /// Free-text search within `region`
    ///
    /// Blank queries never reach the provider; see `SearchOutcome::FallbackToNearby`.
    pub async fn search(&self, query: &str, region: Region) -> SearchOutcome {
        let query = query.trim();
        *self.last_query.lock().unwrap_or_else(|e| e.into_inner()) = query.to_string();

        if query.is_empty() {
            debug!("Empty query, falling back to nearby search");
            return SearchOutcome::FallbackToNearby;
        }

        SearchOutcome::Results(self.query_provider(query, region).await)
    }

    /// Nearby search around `center`, published with `center` in the frame
    ///
    /// Returns the latest published results, which may come from a newer
    /// request.
    pub async fn refresh_nearby(&self, center: Coordinate) -> SearchResults {
        let generation = self.next_generation();
        let places = self.search_nearby(center).await;
        self.publish(generation, places, Some(center));
        self.latest()
    }

    /// Free-text search around an optional position, then publish
    ///
    /// A blank query runs the nearby search instead and frames the viewport
    /// as `default_span` around the position. Without a position a blank
    /// query clears the published results.
    pub async fn search_around(
        &self,
        query: &str,
        position: Option<Coordinate>,
        default_span: Span,
    ) -> SearchResults {
        let generation = self.next_generation();
        let region = self.nearby_region(position.unwrap_or_else(Coordinate::origin));

        match self.search(query, region).await {
            SearchOutcome::Results(places) => {
                self.publish(generation, places, position);
            }
            SearchOutcome::FallbackToNearby => match position {
                Some(center) => {
                    let places = self.search_nearby(center).await;
                    self.publish_framed(generation, places, Some(Region::new(center, default_span)));
                }
                None => {
                    debug!("Empty query with no known position, clearing results");
                    self.publish_framed(generation, Vec::new(), None);
                }
            },
        }

        self.latest()
    }

    /// Publish results framed around the places and an optional anchor
    ///
    /// The anchor (usually the user's position) is included in the viewport.
    /// Returns false when a newer generation has already been published.
    pub fn publish(&self, generation: u64, places: Vec<Place>, anchor: Option<Coordinate>) -> bool {
        let viewport = self.frame(&places, anchor);
        self.publish_framed(generation, places, viewport)
    }

    /// Padded region enclosing the places and the anchor; `None` without places
    pub fn frame(&self, places: &[Place], anchor: Option<Coordinate>) -> Option<Region> {
        if places.is_empty() {
            return None;
        }
        let points = places.iter().map(Place::coordinate).chain(anchor);
        Some(bounding_region(points, self.settings.viewport_padding))
    }

    /// Publish results with an explicit viewport
    pub fn publish_framed(
        &self,
        generation: u64,
        places: Vec<Place>,
        viewport: Option<Region>,
    ) -> bool {
        let applied = self.results.send_if_modified(|current| {
            if generation <= current.generation {
                return false;
            }
            *current = SearchResults {
                generation,
                places,
                viewport,
            };
            true
        });

        if !applied {
            debug!("Discarded stale search results (generation {})", generation);
        }
        applied
    }

    /// Call the provider, degrading failures to an empty list
    async fn query_provider(&self, query: &str, region: Region) -> Vec<Place> {
        let _in_flight = InFlight::enter(&self.in_flight);

        match self.provider.search(query, region).await {
            Ok(places) => places,
            Err(e) => {
                warn!("Place search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}
