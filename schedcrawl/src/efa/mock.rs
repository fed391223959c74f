//! Mock timetable provider for running without the live EFA service.
//!
//! Serves stops, departure listings and planned routes from memory. The
//! data can be built up in code (tests) or loaded from a JSON fixture
//! (`SCHEDCRAWL_MOCK`).

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::crawler::TimetableProvider;
use crate::domain::{BoardDeparture, MotType, PlannedRoute, StopId, StopMatch, StopRef};

use super::error::EfaError;

/// On-disk fixture format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockFixture {
    #[serde(default)]
    pub stops: Vec<StopRef>,
    #[serde(default)]
    pub departures: Vec<FixtureBoard>,
    #[serde(default)]
    pub routes: Vec<FixtureRoutes>,
}

/// Departure listing of one stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureBoard {
    pub stop: StopId,
    pub departures: Vec<BoardDeparture>,
}

/// Planned routes between two stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureRoutes {
    pub origin: StopId,
    pub destination: StopId,
    pub routes: Vec<PlannedRoute>,
}

/// A recorded route planning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequest {
    pub origin: StopId,
    pub destination: StopId,
    pub depart_at: NaiveDateTime,
    pub max_routes: usize,
}

/// A recorded departure listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepartureRequest {
    pub stop: StopId,
    pub from: NaiveDateTime,
    pub limit: usize,
    pub mot: MotType,
}

/// In-memory timetable provider.
#[derive(Debug, Default)]
pub struct MockTimetable {
    stops: Vec<StopRef>,
    /// Explicit stop finder answers, overriding the name search.
    name_matches: HashMap<String, StopMatch>,
    departures: HashMap<StopId, Vec<BoardDeparture>>,
    routes: HashMap<(StopId, StopId), Vec<PlannedRoute>>,
    failing_stops: HashSet<StopId>,
    call_count: AtomicUsize,
    departure_requests: Mutex<Vec<DepartureRequest>>,
    route_requests: Mutex<Vec<RouteRequest>>,
}

impl MockTimetable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a provider from a JSON fixture file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EfaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| EfaError::ApiError {
            status: 0,
            message: format!("Failed to read mock fixture {:?}: {}", path, e),
        })?;

        let fixture: MockFixture = serde_json::from_str(&json).map_err(|e| EfaError::Json {
            message: format!("Failed to parse {:?}: {}", path, e),
            body: None,
        })?;

        Ok(Self::from_fixture(fixture))
    }

    pub fn from_fixture(fixture: MockFixture) -> Self {
        let mut mock = Self::new();
        for stop in fixture.stops {
            mock = mock.with_stop(stop.id, stop.name);
        }
        for board in fixture.departures {
            mock = mock.with_departures(board.stop, board.departures);
        }
        for entry in fixture.routes {
            for route in entry.routes {
                mock = mock.with_route(entry.origin, entry.destination, route);
            }
        }
        mock
    }

    /// Register a stop, findable by exact name and by ID.
    pub fn with_stop(mut self, id: StopId, name: impl Into<String>) -> Self {
        self.stops.push(StopRef::new(id, name));
        self
    }

    /// Answer a name lookup with a fixed result.
    pub fn with_name_match(mut self, name: impl Into<String>, result: StopMatch) -> Self {
        self.name_matches.insert(name.into(), result);
        self
    }

    pub fn with_departures(mut self, stop: StopId, departures: Vec<BoardDeparture>) -> Self {
        self.departures.entry(stop).or_default().extend(departures);
        self
    }

    pub fn with_route(mut self, origin: StopId, destination: StopId, route: PlannedRoute) -> Self {
        self.routes
            .entry((origin, destination))
            .or_default()
            .push(route);
        self
    }

    /// Make departure listings for a stop fail with a server error.
    pub fn with_failing_stop(mut self, stop: StopId) -> Self {
        self.failing_stops.insert(stop);
        self
    }

    /// Number of provider calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Departure listing requests made so far, in order.
    pub fn departure_requests(&self) -> Vec<DepartureRequest> {
        self.departure_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Route planning requests made so far, in order.
    pub fn route_requests(&self) -> Vec<RouteRequest> {
        self.route_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn record_call(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    fn match_from(candidates: Vec<StopRef>) -> StopMatch {
        StopMatch {
            identified: candidates.len() == 1,
            candidates,
        }
    }
}

impl TimetableProvider for MockTimetable {
    async fn find_stop(&self, name: &str) -> Result<StopMatch, EfaError> {
        self.record_call();
        if let Some(result) = self.name_matches.get(name) {
            return Ok(result.clone());
        }
        let candidates = self
            .stops
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect();
        Ok(Self::match_from(candidates))
    }

    async fn stop_by_id(&self, id: StopId) -> Result<StopMatch, EfaError> {
        self.record_call();
        let candidates = self.stops.iter().filter(|s| s.id == id).cloned().collect();
        Ok(Self::match_from(candidates))
    }

    /// Listing in time order, starting at `from`. Time parameters are
    /// honoured so that day boundaries behave like the live service.
    async fn departures(
        &self,
        stop: StopId,
        from: NaiveDateTime,
        limit: usize,
        mot: MotType,
    ) -> Result<Vec<BoardDeparture>, EfaError> {
        self.record_call();
        if let Ok(mut requests) = self.departure_requests.lock() {
            requests.push(DepartureRequest {
                stop,
                from,
                limit,
                mot,
            });
        }
        if self.failing_stops.contains(&stop) {
            return Err(EfaError::ApiError {
                status: 503,
                message: format!("No mock departures for stop {stop}"),
            });
        }

        let mut listing: Vec<BoardDeparture> = self
            .departures
            .get(&stop)
            .into_iter()
            .flatten()
            .filter(|d| d.mot == mot && d.departure >= from)
            .cloned()
            .collect();
        listing.sort_by_key(|d| d.departure);
        listing.truncate(limit);
        Ok(listing)
    }

    /// Routes are served as registered, regardless of the requested time.
    async fn routes(
        &self,
        origin: StopId,
        destination: StopId,
        depart_at: NaiveDateTime,
        _mot: MotType,
        max_routes: usize,
    ) -> Result<Vec<PlannedRoute>, EfaError> {
        self.record_call();
        if let Ok(mut requests) = self.route_requests.lock() {
            requests.push(RouteRequest {
                origin,
                destination,
                depart_at,
                max_routes,
            });
        }

        Ok(self
            .routes
            .get(&(origin, destination))
            .map(|routes| routes.iter().take(max_routes).cloned().collect())
            .unwrap_or_default())
    }
}
