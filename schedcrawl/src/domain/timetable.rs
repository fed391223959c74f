//! Timetable provider value types.
//!
//! These are the validated, provider-independent shapes the crawler works
//! with. The EFA client converts its JSON responses into these; the mock
//! provider deserializes them straight from fixtures.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid provider stop ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop ID {input:?}: must be a non-negative integer")]
pub struct InvalidStopId {
    input: String,
}

/// Numeric stop ID assigned by the timetable provider.
///
/// # Examples
///
/// ```
/// use schedcrawl::domain::StopId;
///
/// let id = StopId::parse("1000").unwrap();
/// assert_eq!(id.value(), 1000);
/// assert!(StopId::parse("de:09162:2").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(u64);

impl StopId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parse a stop ID from its decimal string form.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidStopId {
                input: s.to_string(),
            })
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stop as the provider refers to it: numeric ID plus its own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRef {
    pub id: StopId,
    pub name: String,
}

impl StopRef {
    pub fn new(id: StopId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Result of a name or ID based stop lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopMatch {
    /// Whether the provider considers the lookup unambiguous.
    pub identified: bool,
    /// Matching stops, best match first.
    pub candidates: Vec<StopRef>,
}

impl StopMatch {
    /// A lookup that produced exactly one, unambiguous stop.
    pub fn unique(stop: StopRef) -> Self {
        Self {
            identified: true,
            candidates: vec![stop],
        }
    }

    /// The best candidate, if any.
    pub fn first(&self) -> Option<&StopRef> {
        self.candidates.first()
    }

    /// The candidate if the lookup was unique.
    pub fn unique_stop(&self) -> Option<&StopRef> {
        if self.identified && self.candidates.len() == 1 {
            self.candidates.first()
        } else {
            None
        }
    }
}

/// Mode of transport, using the EFA `motType` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotType {
    Train,
    SuburbanRailway,
    Subway,
    CityRail,
    Tram,
    CityBus,
    RegionalBus,
    ExpressBus,
    CableCar,
    Ferry,
    OnDemand,
    Other(u8),
}

impl MotType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => MotType::Train,
            1 => MotType::SuburbanRailway,
            2 => MotType::Subway,
            3 => MotType::CityRail,
            4 => MotType::Tram,
            5 => MotType::CityBus,
            6 => MotType::RegionalBus,
            7 => MotType::ExpressBus,
            8 => MotType::CableCar,
            9 => MotType::Ferry,
            10 => MotType::OnDemand,
            other => MotType::Other(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            MotType::Train => 0,
            MotType::SuburbanRailway => 1,
            MotType::Subway => 2,
            MotType::CityRail => 3,
            MotType::Tram => 4,
            MotType::CityBus => 5,
            MotType::RegionalBus => 6,
            MotType::ExpressBus => 7,
            MotType::CableCar => 8,
            MotType::Ferry => 9,
            MotType::OnDemand => 10,
            MotType::Other(code) => *code,
        }
    }

    /// GTFS `route_type` for this mode.
    pub fn gtfs_route_type(&self) -> u16 {
        match self {
            MotType::Tram | MotType::CityRail => 0,
            MotType::Subway => 1,
            MotType::Train | MotType::SuburbanRailway => 2,
            MotType::CityBus | MotType::RegionalBus | MotType::ExpressBus | MotType::OnDemand => 3,
            MotType::Ferry => 4,
            MotType::CableCar => 6,
            MotType::Other(_) => 3,
        }
    }
}

/// One entry of a station departure listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDeparture {
    /// Serving line designator as given by the provider (e.g. "U3").
    pub line: String,
    pub mot: MotType,
    /// Where the service is heading.
    pub destination: StopRef,
    pub departure: NaiveDateTime,
}

/// One alternative returned by route planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedRoute {
    pub legs: Vec<RouteLeg>,
}

/// A single vehicle ride within a planned route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub mot: MotType,
    /// Line short name (e.g. "U3").
    pub line: String,
    /// Stops served, in travel order.
    pub stops: Vec<RouteStop>,
}

/// A stop within a route leg.
///
/// Either time may be absent: the origin has no arrival, and the provider
/// marks events that never happen with a sentinel which conversion maps to
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStop {
    pub stop: StopRef,
    #[serde(default)]
    pub arrival: Option<NaiveDateTime>,
    #[serde(default)]
    pub departure: Option<NaiveDateTime>,
}

impl RouteStop {
    /// The first known time at this stop (departure preferred).
    pub fn time(&self) -> Option<NaiveDateTime> {
        self.departure.or(self.arrival)
    }
}
