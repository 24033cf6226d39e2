//! Location tracking
//!
//! The tracker consumes position fixes and decides which ones matter. It has
//! two states: idle (no accepted position yet) and tracking. The first fix is
//! always accepted; after that a fix is accepted only when it lies at least
//! the movement threshold away from the last accepted one. GPS jitter below
//! the threshold changes nothing and triggers nothing.
//!
//! An accepted fix starts a nearby search and a reverse geocode on spawned
//! tasks. Both are tagged with generations so a late answer to an old
//! request never overwrites a newer one, and each new request aborts the
//! previous one still in flight.

pub mod format;
pub mod source;

pub use format::{format_address, format_altitude};
pub use source::{Fix, LineSource, LocationSource};

use crate::config::Config;
use crate::constants::labels::{ADDRESS_NOT_FOUND, ADDRESS_PENDING, ALTITUDE_PENDING};
use crate::coord::{distance, Coordinate, Region, Span};
use crate::geo::Geocoder;
use crate::search::{PlaceSearchProvider, SearchCoordinator, SearchResults};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

/// Tunables for the tracker
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSettings {
    /// Minimum movement before a fix is accepted
    pub movement_threshold_meters: f64,
    /// Span of the default framing around the user
    pub default_span: Span,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for TrackerSettings {
    fn from(config: &Config) -> Self {
        Self {
            movement_threshold_meters: config.tracking.movement_threshold_meters,
            default_span: Span::uniform(config.tracking.default_span_degrees),
        }
    }
}

/// Observable state of a tracking session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    pub last_accepted_position: Option<Coordinate>,
    pub current_address: String,
    pub current_altitude_meters: Option<f64>,
    pub is_searching: bool,
}

impl TrackerState {
    fn new() -> Self {
        Self {
            last_accepted_position: None,
            current_address: ADDRESS_PENDING.to_string(),
            current_altitude_meters: None,
            is_searching: false,
        }
    }

    /// True once a position has been accepted
    pub fn is_tracking(&self) -> bool {
        self.last_accepted_position.is_some()
    }

    /// Formatted altitude, or a placeholder until one is known
    pub fn altitude_label(&self) -> String {
        self.current_altitude_meters
            .map(format_altitude)
            .unwrap_or_else(|| ALTITUDE_PENDING.to_string())
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the tracker did with a fix
#[derive(Debug)]
pub enum PositionUpdate {
    /// The fix became the current position; lookups are running
    Accepted(TrackerTasks),
    /// The fix was too close to the current position and was ignored
    Discarded { moved_meters: f64 },
}

impl PositionUpdate {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Handles to the work started by an accepted fix
///
/// Dropping them leaves the tasks running.
#[derive(Debug)]
pub struct TrackerTasks {
    search: JoinHandle<()>,
    address: JoinHandle<()>,
}

impl TrackerTasks {
    /// Wait for both the nearby search and the address lookup to finish
    ///
    /// Tasks aborted because a newer fix superseded them count as finished.
    pub async fn join(self) {
        for handle in [self.search, self.address] {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Tracker task failed: {}", e);
                }
            }
        }
    }
}

/// Mutable session data, guarded by one mutex
struct Session {
    state: TrackerState,
    /// Last address lookup generation handed out
    address_issued: u64,
    /// Generation whose result currently fills `state.current_address`
    address_applied: u64,
    search_task: Option<AbortHandle>,
    address_task: Option<AbortHandle>,
}

impl Session {
    fn new() -> Self {
        Self {
            state: TrackerState::new(),
            address_issued: 0,
            address_applied: 0,
            search_task: None,
            address_task: None,
        }
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tracks the user's position and drives dependent lookups
///
/// Methods that start background work spawn onto the current tokio runtime
/// and must be called from within one.
pub struct LocationTracker<P, G> {
    coordinator: Arc<SearchCoordinator<P>>,
    geocoder: Arc<G>,
    settings: TrackerSettings,
    session: Arc<Mutex<Session>>,
}

impl<P, G> LocationTracker<P, G>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
{
    /// Create an idle tracker
    pub fn new(
        coordinator: Arc<SearchCoordinator<P>>,
        geocoder: Arc<G>,
        settings: TrackerSettings,
    ) -> Self {
        Self {
            coordinator,
            geocoder,
            settings,
            session: Arc::new(Mutex::new(Session::new())),
        }
    }

    pub fn coordinator(&self) -> &Arc<SearchCoordinator<P>> {
        &self.coordinator
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    /// Snapshot of the session state
    pub fn state(&self) -> TrackerState {
        let mut state = lock(&self.session).state.clone();
        state.is_searching = self.coordinator.is_searching();
        state
    }

    /// Default framing around a position
    pub fn default_region(&self, center: Coordinate) -> Region {
        Region::new(center, self.settings.default_span)
    }

    /// Feed one fix into the tracker
    pub fn on_position_update(&self, fix: Fix) -> PositionUpdate {
        {
            let mut session = lock(&self.session);

            if let Some(last) = session.state.last_accepted_position {
                let moved = distance(last, fix.coordinate);
                if moved < self.settings.movement_threshold_meters {
                    debug!("Discarding fix {} ({:.1} m from last)", fix.coordinate, moved);
                    return PositionUpdate::Discarded {
                        moved_meters: moved,
                    };
                }
            }

            session.state.last_accepted_position = Some(fix.coordinate);
            if let Some(meters) = fix.altitude_meters {
                session.state.current_altitude_meters = Some(meters);
            }
        }

        info!("Accepted fix {}", fix.coordinate);

        let search = self.search_nearby(fix.coordinate);
        let address = self.fetch_address(fix.coordinate);
        PositionUpdate::Accepted(TrackerTasks { search, address })
    }

    /// Consume fixes until the source ends
    pub async fn run<S: LocationSource>(&self, mut source: S) {
        info!("Location tracking started");
        while let Some(fix) = source.next_fix().await {
            self.on_position_update(fix);
        }
        info!("Location source ended");
    }

    /// Reverse geocode a coordinate into `current_address`
    ///
    /// The newest lookup wins: starting one aborts the previous lookup, and a
    /// result older than the one already applied is dropped.
    pub fn fetch_address(&self, coordinate: Coordinate) -> JoinHandle<()> {
        let geocoder = self.geocoder.clone();
        let session = self.session.clone();

        let mut guard = lock(&self.session);
        guard.address_issued += 1;
        let generation = guard.address_issued;

        let handle = tokio::spawn(async move {
            let address = match geocoder.reverse_geocode(coordinate).await {
                Ok(Some(placemark)) => format_address(&placemark),
                Ok(None) => ADDRESS_NOT_FOUND.to_string(),
                Err(e) => {
                    warn!("Reverse geocoding {} failed: {}", coordinate, e);
                    ADDRESS_NOT_FOUND.to_string()
                }
            };

            let mut session = lock(&session);
            if generation > session.address_applied {
                session.address_applied = generation;
                session.state.current_address = address;
            } else {
                debug!("Discarded stale address lookup (generation {})", generation);
            }
        });

        if let Some(previous) = guard.address_task.replace(handle.abort_handle()) {
            previous.abort();
        }
        handle
    }

    /// Format an altitude reading
    pub fn fetch_altitude(&self, _coordinate: Coordinate, altitude_meters: f64) -> String {
        format_altitude(altitude_meters)
    }

    /// Run a nearby search around `center` and publish it
    ///
    /// The published viewport frames the results together with `center`.
    pub fn search_nearby(&self, center: Coordinate) -> JoinHandle<()> {
        let coordinator = self.coordinator.clone();
        let generation = coordinator.next_generation();

        let handle = tokio::spawn(async move {
            let places = coordinator.search_nearby(center).await;
            coordinator.publish(generation, places, Some(center));
        });

        let mut guard = lock(&self.session);
        if let Some(previous) = guard.search_task.replace(handle.abort_handle()) {
            previous.abort();
        }
        handle
    }

    /// Free-text search around the current position
    ///
    /// An empty query runs the nearby search instead and resets the viewport
    /// to the default framing around the user. Returns the latest published
    /// results, which may come from a newer request.
    pub async fn search_text(&self, query: &str) -> SearchResults {
        let position = lock(&self.session).state.last_accepted_position;
        self.coordinator
            .search_around(query, position, self.settings.default_span)
            .await
    }

    /// End the session: abort in-flight work and return to idle
    pub fn stop(&self) {
        let mut session = lock(&self.session);
        for task in [session.search_task.take(), session.address_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }

        session.state = TrackerState::new();
        session.address_applied = session.address_issued;
        drop(session);

        let generation = self.coordinator.next_generation();
        self.coordinator.publish_framed(generation, Vec::new(), None);
        info!("Location tracking stopped");
    }
}
