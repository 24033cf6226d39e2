//! Recording test doubles for the provider traits

use crate::coord::{Coordinate, Region};
use crate::error::{Error, Result};
use crate::geo::{Geocoder, Placemark};
use crate::search::{Place, PlaceSearchProvider};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One recorded provider request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub query: String,
    pub region: Region,
}

/// Search provider returning a fixed candidate list
pub struct MockSearchProvider {
    places: Vec<Place>,
    fail: bool,
    delays: Mutex<VecDeque<Duration>>,
    calls: Mutex<Vec<SearchCall>>,
}

impl MockSearchProvider {
    pub fn with_places(places: Vec<Place>) -> Self {
        Self {
            places,
            fail: false,
            delays: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_places(Vec::new())
        }
    }

    /// Delay successive calls by these durations (later calls are immediate)
    pub fn with_delays(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into();
        self
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl PlaceSearchProvider for MockSearchProvider {
    async fn search(&self, query: &str, region: Region) -> Result<Vec<Place>> {
        self.calls.lock().unwrap().push(SearchCall {
            query: query.to_string(),
            region,
        });

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            Err(Error::Search("mock provider unavailable".to_string()))
        } else {
            Ok(self.places.clone())
        }
    }
}

#[derive(Debug, Clone)]
enum GeocodeOutcome {
    Found(Placemark),
    NotFound,
    Fail,
}

/// Scripted answer of the mock geocoder
#[derive(Debug, Clone)]
pub struct GeocodeReply {
    delay: Duration,
    outcome: GeocodeOutcome,
}

impl GeocodeReply {
    pub fn found(placemark: Placemark) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: GeocodeOutcome::Found(placemark),
        }
    }

    pub fn not_found() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: GeocodeOutcome::NotFound,
        }
    }

    pub fn failure() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: GeocodeOutcome::Fail,
        }
    }

    /// Answer only after `delay`
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Geocoder answering per coordinate, with a fallback reply
pub struct MockGeocoder {
    replies: Vec<(Coordinate, GeocodeReply)>,
    fallback: GeocodeReply,
    calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn answering(fallback: GeocodeReply) -> Self {
        Self {
            replies: Vec::new(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn found(placemark: Placemark) -> Self {
        Self::answering(GeocodeReply::found(placemark))
    }

    pub fn failing() -> Self {
        Self::answering(GeocodeReply::failure())
    }

    /// Answer lookups of `coordinate` with `reply`
    pub fn with_reply_at(mut self, coordinate: Coordinate, reply: GeocodeReply) -> Self {
        self.replies.push((coordinate, reply));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for MockGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Option<Placemark>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = self
            .replies
            .iter()
            .find(|(at, _)| *at == coordinate)
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.fallback.clone());

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }

        match reply.outcome {
            GeocodeOutcome::Found(placemark) => Ok(Some(placemark)),
            GeocodeOutcome::NotFound => Ok(None),
            GeocodeOutcome::Fail => Err(Error::Geocoding("mock geocoder unavailable".to_string())),
        }
    }
}
