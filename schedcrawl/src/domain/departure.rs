//! Departure events.

use chrono::NaiveDateTime;

use super::{LineIdx, StationIdx};

/// Stable handle of a departure in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepartureIdx(pub usize);

/// A service leaving (and possibly arriving at) a station.
///
/// The same departure is referenced from its station and from the trip it
/// belongs to; both hold the index, never a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub station: StationIdx,
    pub line: LineIdx,
    pub destination: StationIdx,
    pub arrival: Option<NaiveDateTime>,
    pub departure: Option<NaiveDateTime>,
}

impl Departure {
    pub fn key(&self) -> DepartureKey {
        DepartureKey::new(self.line, self.destination, self.arrival, self.departure)
    }

    /// Fill in an arrival time learned later, never overwriting one.
    pub(crate) fn complete(&mut self, arrival: Option<NaiveDateTime>) {
        if self.arrival.is_none() {
            self.arrival = arrival;
        }
    }
}

/// Identity of a departure at a station: line, destination and time.
///
/// The time is the departure timestamp. A terminal stop has no departure,
/// so it is keyed by its arrival instead; otherwise every arrival at a
/// terminus would collapse into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepartureKey {
    pub line: LineIdx,
    pub destination: StationIdx,
    departure: Option<NaiveDateTime>,
    terminal_arrival: Option<NaiveDateTime>,
}

impl DepartureKey {
    pub fn new(
        line: LineIdx,
        destination: StationIdx,
        arrival: Option<NaiveDateTime>,
        departure: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            line,
            destination,
            departure,
            terminal_arrival: if departure.is_none() { arrival } else { None },
        }
    }
}
