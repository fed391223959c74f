//! JSON representation of the network.
//!
//! Stations are listed by name with their position. Provider IDs and the
//! per-station departure lists are internal and not written; departures
//! appear only inside the trips that contain them.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Departure, Network, Trip};

use super::{OutputError, sorted_lines, sorted_trips};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDto {
    pub stations: Vec<StationDto>,
    pub lines: Vec<LineDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDto {
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDto {
    /// Designator; empty for the unnumbered placeholder line
    pub name: String,
    /// Station names in topology order
    pub stops: Vec<String>,
    pub trips: Vec<TripDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDto {
    pub departures: Vec<DepartureDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartureDto {
    pub station: String,
    pub destination: String,
    pub arrival: Option<NaiveDateTime>,
    pub departure: Option<NaiveDateTime>,
}

impl NetworkDto {
    pub fn from_network(network: &Network) -> Self {
        let stations = network
            .stations()
            .map(|(_, station)| StationDto {
                name: station.name().to_string(),
                lat: station.coord().map(|c| c.lat),
                lng: station.coord().map(|c| c.lon),
            })
            .collect();

        let lines = sorted_lines(network)
            .into_iter()
            .map(|idx| {
                let line = network.line(idx);
                LineDto {
                    name: line.name().as_str().to_string(),
                    stops: line
                        .stops()
                        .iter()
                        .map(|s| network.station(*s).name().to_string())
                        .collect(),
                    trips: sorted_trips(network, idx)
                        .into_iter()
                        .map(|trip| TripDto::from_trip(network, trip))
                        .collect(),
                }
            })
            .collect();

        Self { stations, lines }
    }
}

impl TripDto {
    fn from_trip(network: &Network, trip: &Trip) -> Self {
        Self {
            departures: trip
                .departures
                .iter()
                .map(|idx| DepartureDto::from_departure(network, network.departure(*idx)))
                .collect(),
        }
    }
}

impl DepartureDto {
    fn from_departure(network: &Network, departure: &Departure) -> Self {
        Self {
            station: network.station(departure.station).name().to_string(),
            destination: network.station(departure.destination).name().to_string(),
            arrival: departure.arrival,
            departure: departure.departure,
        }
    }
}

/// Write the network as pretty-printed JSON, creating parent directories.
pub fn write_json(network: &Network, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&NetworkDto::from_network(network))?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;
    use tempfile::tempdir;

    #[test]
    fn stations_by_name_with_position() {
        let dto = NetworkDto::from_network(&fixtures::network());
        let names: Vec<&str> = dto.stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Feldmoching", "Hauptbahnhof", "Messestadt Ost"]);
        assert_eq!(dto.stations[0].lat, Some(48.214));
        assert_eq!(dto.stations[0].lng, Some(11.546));
        assert_eq!(dto.stations[1].lat, None);
    }

    #[test]
    fn lines_carry_stops_and_ordered_trips() {
        let dto = NetworkDto::from_network(&fixtures::network());
        assert_eq!(dto.lines.len(), 2);

        let u2 = &dto.lines[0];
        assert_eq!(u2.name, "U2");
        assert_eq!(u2.stops, ["Feldmoching", "Hauptbahnhof", "Messestadt Ost"]);
        assert_eq!(u2.trips.len(), 3);
        assert_eq!(u2.trips[0].departures[0].departure, Some(fixtures::ts(6, 0)));

        let last = &u2.trips[0].departures[2];
        assert_eq!(last.station, "Messestadt Ost");
        assert_eq!(last.destination, "Messestadt Ost");
        assert_eq!(last.arrival, Some(fixtures::ts(6, 30)));
        assert_eq!(last.departure, None);

        assert!(dto.lines[1].trips.is_empty());
    }

    #[test]
    fn json_field_names() {
        let dto = NetworkDto::from_network(&fixtures::network());
        let value = serde_json::to_value(&dto).unwrap();
        let departure = &value["lines"][0]["trips"][0]["departures"][0];
        assert_eq!(departure["station"], "Feldmoching");
        assert_eq!(departure["departure"], "2024-03-15T06:00:00");
        assert!(departure["arrival"].is_null());
        assert_eq!(value["stations"][0]["lng"], 11.546);
    }

    #[test]
    fn write_is_deterministic() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a").join("network.json");
        let second = dir.path().join("b").join("network.json");

        write_json(&fixtures::network(), &first).unwrap();
        write_json(&fixtures::network(), &second).unwrap();

        let a = std::fs::read_to_string(&first).unwrap();
        let b = std::fs::read_to_string(&second).unwrap();
        assert_eq!(a, b);

        let parsed: NetworkDto = serde_json::from_str(&a).unwrap();
        assert_eq!(parsed, NetworkDto::from_network(&fixtures::network()));
    }
}
