//! The network under construction.
//!
//! Stations, lines and departures live in arenas owned by [`Network`] and
//! refer to each other by index, so the cyclic station/departure/line
//! relationships need no shared ownership.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::{
    Coord, Departure, DepartureIdx, DepartureKey, Line, LineIdx, LineName, Station, StationIdx,
    StopId, Trip,
};

/// Root aggregate: station registry keyed by name, plus all lines.
#[derive(Debug, Clone, Default)]
pub struct Network {
    stations: Vec<Station>,
    by_name: BTreeMap<String, StationIdx>,
    lines: Vec<Line>,
    departures: Vec<Departure>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn station(&self, idx: StationIdx) -> &Station {
        &self.stations[idx.0]
    }

    pub(crate) fn station_mut(&mut self, idx: StationIdx) -> &mut Station {
        &mut self.stations[idx.0]
    }

    /// All stations, ordered by name.
    pub fn stations(&self) -> impl Iterator<Item = (StationIdx, &Station)> {
        self.by_name
            .values()
            .map(|idx| (*idx, &self.stations[idx.0]))
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn station_by_name(&self, name: &str) -> Option<StationIdx> {
        self.by_name.get(name).copied()
    }

    /// Find the station a provider stop ID has been bound to.
    pub fn station_by_stop_id(&self, id: StopId) -> Option<StationIdx> {
        self.stations
            .iter()
            .position(|s| s.stop_id() == Some(id))
            .map(StationIdx)
    }

    /// Look up a station by exact name, registering it if unknown.
    pub fn station_or_insert(&mut self, name: &str, coord: Option<Coord>) -> StationIdx {
        if let Some(idx) = self.station_by_name(name) {
            self.stations[idx.0].fill_coord(coord);
            return idx;
        }
        let idx = StationIdx(self.stations.len());
        self.stations.push(Station::new(name.to_string(), coord));
        self.by_name.insert(name.to_string(), idx);
        idx
    }

    pub fn line(&self, idx: LineIdx) -> &Line {
        &self.lines[idx.0]
    }

    pub(crate) fn line_mut(&mut self, idx: LineIdx) -> &mut Line {
        &mut self.lines[idx.0]
    }

    /// All lines in the order they were registered.
    pub fn lines(&self) -> impl Iterator<Item = (LineIdx, &Line)> {
        self.lines.iter().enumerate().map(|(i, l)| (LineIdx(i), l))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_by_name(&self, name: &LineName) -> Option<LineIdx> {
        self.lines
            .iter()
            .position(|l| l.name() == name)
            .map(LineIdx)
    }

    /// Look up a line by designator, registering it if unknown.
    pub fn line_or_insert(&mut self, name: LineName) -> LineIdx {
        if let Some(idx) = self.line_by_name(&name) {
            return idx;
        }
        let idx = LineIdx(self.lines.len());
        self.lines.push(Line::new(name));
        idx
    }

    pub fn departure(&self, idx: DepartureIdx) -> &Departure {
        &self.departures[idx.0]
    }

    pub fn departure_count(&self) -> usize {
        self.departures.len()
    }

    pub fn trip_count(&self) -> usize {
        self.lines.iter().map(|l| l.trips().len()).sum()
    }

    /// Find a departure at `station` with the given identity.
    pub fn find_departure(&self, station: StationIdx, key: &DepartureKey) -> Option<DepartureIdx> {
        self.station(station)
            .departures()
            .iter()
            .copied()
            .find(|idx| self.departures[idx.0].key() == *key)
    }

    /// Add a departure unless its station already holds one with the same key.
    ///
    /// Check and insert happen in one step. Returns the index of the stored
    /// departure and whether it was newly created.
    pub fn departure_or_insert(&mut self, departure: Departure) -> (DepartureIdx, bool) {
        if let Some(existing) = self.find_departure(departure.station, &departure.key()) {
            return (existing, false);
        }
        let idx = DepartureIdx(self.departures.len());
        let station = departure.station;
        self.departures.push(departure);
        self.stations[station.0].push_departure(idx);
        (idx, true)
    }

    pub(crate) fn complete_departure(&mut self, idx: DepartureIdx, arrival: Option<NaiveDateTime>) {
        self.departures[idx.0].complete(arrival);
    }

    /// Append a trip to a line, skipping exact duplicates.
    pub(crate) fn push_trip(&mut self, line: LineIdx, trip: Trip) -> bool {
        self.lines[line.0].push_trip(trip)
    }
}
