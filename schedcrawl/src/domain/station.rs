//! Stations in the network registry.

use serde::{Deserialize, Serialize};

use super::{DepartureIdx, StopId};

/// Stable handle of a station in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationIdx(pub usize);

/// WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// A station shared by every line that stops there.
///
/// The name is the registry key and never changes. The provider stop ID is
/// learned lazily and, once bound, is fixed for the rest of the run.
#[derive(Debug, Clone)]
pub struct Station {
    name: String,
    stop_id: Option<StopId>,
    coord: Option<Coord>,
    departures: Vec<DepartureIdx>,
}

impl Station {
    pub(crate) fn new(name: String, coord: Option<Coord>) -> Self {
        Self {
            name,
            stop_id: None,
            coord,
            departures: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stop_id(&self) -> Option<StopId> {
        self.stop_id
    }

    pub fn coord(&self) -> Option<Coord> {
        self.coord
    }

    /// Departures at this station, in insertion order.
    pub fn departures(&self) -> &[DepartureIdx] {
        &self.departures
    }

    /// Bind the provider stop ID if none is bound yet.
    ///
    /// Returns `true` if the station now carries `id` (newly bound or
    /// already equal), `false` if a different ID was bound earlier.
    pub fn bind_stop_id(&mut self, id: StopId) -> bool {
        match self.stop_id {
            None => {
                self.stop_id = Some(id);
                true
            }
            Some(bound) => bound == id,
        }
    }

    /// Whether `id` could belong to this station without rebinding.
    pub fn accepts_stop_id(&self, id: StopId) -> bool {
        self.stop_id.is_none_or(|bound| bound == id)
    }

    pub(crate) fn fill_coord(&mut self, coord: Option<Coord>) {
        if self.coord.is_none() {
            self.coord = coord;
        }
    }

    pub(crate) fn push_departure(&mut self, departure: DepartureIdx) {
        self.departures.push(departure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_id_is_write_once() {
        let mut station = Station::new("Marienplatz".into(), None);
        assert_eq!(station.stop_id(), None);
        assert!(station.accepts_stop_id(StopId::new(2)));

        assert!(station.bind_stop_id(StopId::new(2)));
        assert_eq!(station.stop_id(), Some(StopId::new(2)));

        // Same ID again is fine, a different one is refused.
        assert!(station.bind_stop_id(StopId::new(2)));
        assert!(!station.bind_stop_id(StopId::new(7)));
        assert_eq!(station.stop_id(), Some(StopId::new(2)));
        assert!(!station.accepts_stop_id(StopId::new(7)));
    }

    #[test]
    fn coord_is_filled_once() {
        let mut station = Station::new("Sendlinger Tor".into(), None);
        station.fill_coord(Some(Coord {
            lat: 48.13,
            lon: 11.56,
        }));
        station.fill_coord(Some(Coord { lat: 0.0, lon: 0.0 }));
        assert_eq!(
            station.coord(),
            Some(Coord {
                lat: 48.13,
                lon: 11.56
            })
        );
    }
}
