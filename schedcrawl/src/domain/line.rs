//! Lines and the trips that run on them.

use std::cmp::Ordering;
use std::fmt;

use super::{DepartureIdx, StationIdx};

/// Stable handle of a line in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineIdx(pub usize);

/// Line designator shared by topology and timetable (e.g. "U3").
///
/// The empty designator stands for services the provider runs without a
/// line number. Ordering is natural, so "U2" sorts before "U10".
///
/// # Examples
///
/// ```
/// use schedcrawl::domain::LineName;
///
/// assert!(LineName::new("U2") < LineName::new("U10"));
/// assert!(LineName::unnumbered().is_unnumbered());
/// assert!(!LineName::new("U6").is_unnumbered());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineName(String);

impl LineName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    /// The placeholder designator for services without a number.
    pub fn unnumbered() -> Self {
        Self(String::new())
    }

    /// Map a provider designator onto a line of the family `prefix`.
    ///
    /// Returns `None` for services outside the family. A bare prefix or an
    /// empty designator maps to the unnumbered placeholder.
    pub fn from_designator(raw: &str, prefix: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw == prefix {
            return Some(Self::unnumbered());
        }
        if raw.starts_with(prefix) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unnumbered(&self) -> bool {
        self.0.is_empty()
    }

    fn sort_key(&self) -> (&str, Option<u32>, &str) {
        let split = self
            .0
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(self.0.len());
        let (prefix, rest) = self.0.split_at(split);
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let number = rest[..digits_end].parse().ok();
        (prefix, number, &self.0)
    }
}

impl Ord for LineName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for LineName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unnumbered() {
            f.write_str("(unnumbered)")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// One concrete run of a train: a departure per stop, in stop order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trip {
    pub departures: Vec<DepartureIdx>,
}

impl Trip {
    pub fn new(departures: Vec<DepartureIdx>) -> Self {
        Self { departures }
    }

    pub fn len(&self) -> usize {
        self.departures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }
}

/// A line with its ordered stops and the trips found for it.
#[derive(Debug, Clone)]
pub struct Line {
    name: LineName,
    stops: Vec<StationIdx>,
    trips: Vec<Trip>,
}

impl Line {
    pub(crate) fn new(name: LineName) -> Self {
        Self {
            name,
            stops: Vec::new(),
            trips: Vec::new(),
        }
    }

    pub fn name(&self) -> &LineName {
        &self.name
    }

    /// Stops in topology order; first and last are the termini.
    pub fn stops(&self) -> &[StationIdx] {
        &self.stops
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// The first and last stop, if the line has a designator and stops.
    pub fn termini(&self) -> Option<(StationIdx, StationIdx)> {
        if self.name.is_unnumbered() {
            return None;
        }
        Some((*self.stops.first()?, *self.stops.last()?))
    }

    /// Whether `station` is the first or last stop of this line.
    ///
    /// Always false for the unnumbered placeholder line.
    pub fn is_terminus(&self, station: StationIdx) -> bool {
        self.termini()
            .is_some_and(|(first, last)| station == first || station == last)
    }

    /// Append a stop. A station already on the line is not added again, so
    /// the reverse-direction route of a line leaves the sequence unchanged.
    ///
    /// Returns whether the stop was added.
    pub(crate) fn push_stop(&mut self, station: StationIdx) -> bool {
        if self.stops.contains(&station) {
            return false;
        }
        self.stops.push(station);
        true
    }

    /// Append a trip unless an identical one is already recorded.
    ///
    /// Returns whether the trip was added.
    pub(crate) fn push_trip(&mut self, trip: Trip) -> bool {
        if trip.is_empty() || self.trips.contains(&trip) {
            return false;
        }
        self.trips.push(trip);
        true
    }
}
