//! HTTP API routes
//!
//! Defines all REST API endpoints for the server. Search and address
//! endpoints take an explicit `lat`/`lng`; without one they act on the
//! tracking session fed by `POST /api/position`.

use crate::constants::labels::ADDRESS_NOT_FOUND;
use crate::coord::{Coordinate, Region};
use crate::error::Error;
use crate::favorites::{FavoriteRecord, FavoritesRepository};
use crate::geo::{Geocoder, Placemark};
use crate::search::{Place, PlaceId, PlaceSearchProvider, SearchOutcome, SearchResults};
use crate::server::state::AppState;
use crate::tracker::{format_address, Fix, PositionUpdate, TrackerState};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type SharedState<P, G, R> = State<Arc<AppState<P, G, R>>>;

/// Create the API router
pub fn create_router<P, G, R>(state: Arc<AppState<P, G, R>>) -> Router
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository + 'static,
{
    Router::new()
        .route("/api/status", get(status_handler::<P, G, R>))
        .route("/api/position", post(position_handler::<P, G, R>))
        .route("/api/results", get(results_handler::<P, G, R>))
        .route("/api/stop", post(stop_handler::<P, G, R>))
        .route("/api/nearby", get(nearby_handler::<P, G, R>))
        .route("/api/search", get(search_handler::<P, G, R>))
        .route("/api/address", get(address_handler::<P, G, R>))
        .route(
            "/api/favorites",
            get(favorites_handler::<P, G, R>).post(save_favorite_handler::<P, G, R>),
        )
        .route("/api/favorites/toggle", post(toggle_favorite_handler::<P, G, R>))
        .route("/api/favorites/:id", delete(delete_favorite_handler::<P, G, R>))
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::Config(_) => (StatusCode::BAD_REQUEST, "CONFIG_ERROR"),
            Error::Geocoding(_) => (StatusCode::BAD_GATEWAY, "GEOCODING_ERROR"),
            Error::Search(_) | Error::Http(_) => (StatusCode::BAD_GATEWAY, "SEARCH_ERROR"),
            Error::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError::new(status, code, err.to_string())
    }
}

/// Optional position in a query string
#[derive(Debug, Default, Deserialize)]
pub struct PositionQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PositionQuery {
    /// Both coordinates, validated, or neither
    fn coordinate(&self) -> Result<Option<Coordinate>, ApiError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                let coordinate = Coordinate::new(lat, lng);
                coordinate.validate()?;
                Ok(Some(coordinate))
            }
            (None, None) => Ok(None),
            _ => Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_COORDINATES",
                "lat and lng must be given together",
            )),
        }
    }
}

fn no_position() -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        "NO_POSITION",
        "No position: pass lat and lng or post a position first",
    )
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub uptime_secs: u64,
    /// Tracking session snapshot
    pub tracker: TrackerState,
    /// Generation of the latest published results
    pub results_generation: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<P, G, R>(State(state): SharedState<P, G, R>) -> Json<StatusResponse>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        tracker: state.tracker.state(),
        results_generation: state.coordinator.latest().generation,
    })
}

/// Position fix request body
#[derive(Debug, Deserialize)]
pub struct FixRequest {
    pub lat: f64,
    pub lng: f64,
    pub altitude: Option<f64>,
}

/// Position update response
#[derive(Debug, Serialize, Deserialize)]
pub struct PositionResponse {
    pub accepted: bool,
    /// Distance from the current position when the fix was discarded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_meters: Option<f64>,
    pub state: TrackerState,
}

/// Feed a fix into the tracking session
///
/// POST /api/position
async fn position_handler<P, G, R>(
    State(state): SharedState<P, G, R>,
    Json(req): Json<FixRequest>,
) -> Result<Json<PositionResponse>, ApiError>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    let coordinate = Coordinate::new(req.lat, req.lng);
    coordinate.validate()?;

    let mut fix = Fix::new(coordinate);
    if let Some(altitude) = req.altitude {
        fix = fix.with_altitude(altitude);
    }

    let moved_meters = match state.tracker.on_position_update(fix) {
        PositionUpdate::Accepted(_) => None,
        PositionUpdate::Discarded { moved_meters } => Some(moved_meters),
    };

    Ok(Json(PositionResponse {
        accepted: moved_meters.is_none(),
        moved_meters,
        state: state.tracker.state(),
    }))
}

/// Latest results published by the session
///
/// GET /api/results
async fn results_handler<P, G, R>(State(state): SharedState<P, G, R>) -> Json<SearchResults>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    Json(state.coordinator.latest())
}

/// End the tracking session
///
/// POST /api/stop
async fn stop_handler<P, G, R>(State(state): SharedState<P, G, R>) -> Json<TrackerState>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    state.tracker.stop();
    Json(state.tracker.state())
}

/// Nearby places around a position, framed but not published
///
/// GET /api/nearby?lat=..&lng=..
async fn nearby_handler<P, G, R>(
    State(state): SharedState<P, G, R>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<SearchResults>, ApiError>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    let center = match query.coordinate()? {
        Some(center) => center,
        None => state
            .tracker
            .state()
            .last_accepted_position
            .ok_or_else(no_position)?,
    };

    let places = state.coordinator.search_nearby(center).await;
    let viewport = state.coordinator.frame(&places, Some(center));

    Ok(Json(SearchResults {
        generation: 0,
        places,
        viewport,
    }))
}

/// Search query string
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Free-text search
///
/// GET /api/search?q=..[&lat=..&lng=..]
///
/// With a position the results are returned without publishing. Without
/// one the search runs in the tracking session and publishes.
async fn search_handler<P, G, R>(
    State(state): SharedState<P, G, R>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, ApiError>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    let position = PositionQuery {
        lat: query.lat,
        lng: query.lng,
    }
    .coordinate()?;

    let Some(center) = position else {
        return Ok(Json(state.tracker.search_text(&query.q).await));
    };

    let coordinator = &state.coordinator;
    let region = coordinator.nearby_region(center);
    let (places, viewport) = match coordinator.search(&query.q, region).await {
        SearchOutcome::Results(places) => {
            let viewport = coordinator.frame(&places, Some(center));
            (places, viewport)
        }
        SearchOutcome::FallbackToNearby => {
            let places = coordinator.search_nearby(center).await;
            (places, Some(Region::new(center, state.default_span)))
        }
    };

    Ok(Json(SearchResults {
        generation: 0,
        places,
        viewport,
    }))
}

/// Address response
#[derive(Debug, Serialize, Deserialize)]
pub struct AddressResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    /// Display label
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placemark: Option<Placemark>,
}

/// Reverse geocode a position, or report the session's current address
///
/// GET /api/address[?lat=..&lng=..]
async fn address_handler<P, G, R>(
    State(state): SharedState<P, G, R>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<AddressResponse>, ApiError>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    let Some(coordinate) = query.coordinate()? else {
        let session = state.tracker.state();
        return Ok(Json(AddressResponse {
            coordinate: session.last_accepted_position,
            address: session.current_address,
            placemark: None,
        }));
    };

    let placemark = state.geocoder.reverse_geocode(coordinate).await?;
    let address = placemark
        .as_ref()
        .map(format_address)
        .unwrap_or_else(|| ADDRESS_NOT_FOUND.to_string());

    Ok(Json(AddressResponse {
        coordinate: Some(coordinate),
        address,
        placemark,
    }))
}

/// A place sent by a client
#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub id: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub category: Option<String>,
}

impl PlaceRequest {
    fn into_place(self) -> Result<Place, ApiError> {
        let coordinate = Coordinate::new(self.lat, self.lng);
        coordinate.validate()?;

        let mut place = Place::new(PlaceId::new(self.id), self.name, coordinate);
        if let Some(address) = self.address {
            place = place.with_address(address);
        }
        if let Some(category) = self.category {
            place = place.with_category(category);
        }
        Ok(place)
    }
}

/// Favorites list response
#[derive(Debug, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteRecord>,
    pub count: usize,
}

/// Membership of one place
#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteStatus {
    pub place_id: PlaceId,
    pub favorite: bool,
}

/// Get favorites list
///
/// GET /api/favorites
async fn favorites_handler<P, G, R>(
    State(state): SharedState<P, G, R>,
) -> Result<Json<FavoritesResponse>, ApiError>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    let favorites = state.favorites.list()?;
    Ok(Json(FavoritesResponse {
        count: favorites.len(),
        favorites,
    }))
}

/// Save a favorite
///
/// POST /api/favorites
async fn save_favorite_handler<P, G, R>(
    State(state): SharedState<P, G, R>,
    Json(req): Json<PlaceRequest>,
) -> Result<(StatusCode, Json<FavoriteStatus>), ApiError>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    let place = req.into_place()?;
    state.favorites.save(&place)?;

    Ok((
        StatusCode::CREATED,
        Json(FavoriteStatus {
            place_id: place.id().clone(),
            favorite: true,
        }),
    ))
}

/// Toggle a favorite
///
/// POST /api/favorites/toggle
async fn toggle_favorite_handler<P, G, R>(
    State(state): SharedState<P, G, R>,
    Json(req): Json<PlaceRequest>,
) -> Result<Json<FavoriteStatus>, ApiError>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    let place = req.into_place()?;
    let favorite = state.favorites.toggle(&place)?;

    Ok(Json(FavoriteStatus {
        place_id: place.id().clone(),
        favorite,
    }))
}

/// Delete a favorite by place id
///
/// DELETE /api/favorites/:id
async fn delete_favorite_handler<P, G, R>(
    State(state): SharedState<P, G, R>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    P: PlaceSearchProvider + 'static,
    G: Geocoder + 'static,
    R: FavoritesRepository,
{
    if state.favorites.remove_id(&PlaceId::new(id.clone()))? > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Favorite not found: {}", id),
        ))
    }
}
