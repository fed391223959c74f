//! Representations of a finished network: JSON, GTFS and plain text.
//!
//! All of them order lines naturally by name and trips by their first
//! timestamp, so two runs over the same timetable produce identical output.

mod gtfs;
mod json;
mod summary;

use chrono::NaiveDateTime;

use crate::domain::{Departure, LineIdx, Network, Trip};

pub use gtfs::{GtfsConfig, write_gtfs};
pub use json::{DepartureDto, LineDto, NetworkDto, StationDto, TripDto, write_json};
pub use summary::{NetworkListing, TripStatistics};

/// Errors writing output files.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Lines in natural name order.
fn sorted_lines(network: &Network) -> Vec<LineIdx> {
    let mut lines: Vec<LineIdx> = network.lines().map(|(idx, _)| idx).collect();
    lines.sort_by(|a, b| network.line(*a).name().cmp(network.line(*b).name()));
    lines
}

/// Trips of a line ordered by when they start.
fn sorted_trips(network: &Network, line: LineIdx) -> Vec<&Trip> {
    let mut trips: Vec<&Trip> = network.line(line).trips().iter().collect();
    trips.sort_by_key(|trip| trip_start(network, trip));
    trips
}

fn trip_start(network: &Network, trip: &Trip) -> Option<NaiveDateTime> {
    trip.departures
        .first()
        .and_then(|idx| event_time(network.departure(*idx)))
}

/// The departure time, or the arrival for a terminal stop.
fn event_time(departure: &Departure) -> Option<NaiveDateTime> {
    departure.departure.or(departure.arrival)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::crawler::build_network;
    use crate::domain::{
        Coord, Departure, LineName, Network, Topology, TopologyRoute, Trip,
    };

    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    pub fn ts(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    /// U10 and U2 over three shared stations, with two U2 trips inserted
    /// out of time order and one trip running past midnight.
    pub fn network() -> Network {
        let mut u2 = TopologyRoute::with_stops("U2", &["Feldmoching", "Hauptbahnhof", "Messestadt Ost"]);
        u2.stops[0].coord = Some(Coord {
            lat: 48.214,
            lon: 11.546,
        });
        let topology = Topology {
            routes: vec![
                TopologyRoute::with_stops("U10", &["Hauptbahnhof", "Messestadt Ost"]),
                u2,
            ],
        };
        let mut net = build_network(&topology);

        let u2 = net.line_by_name(&LineName::new("U2")).unwrap();
        let feld = net.station_by_name("Feldmoching").unwrap();
        let hbf = net.station_by_name("Hauptbahnhof").unwrap();
        let ost = net.station_by_name("Messestadt Ost").unwrap();

        let late = date().succ_opt().unwrap().and_hms_opt(0, 20, 0).unwrap();
        for (start, middle, end) in [
            (ts(9, 0), ts(9, 10), ts(9, 30)),
            (ts(23, 50), ts(23, 59), late),
            (ts(6, 0), ts(6, 10), ts(6, 30)),
        ] {
            let trip = [
                (feld, None, Some(start)),
                (hbf, Some(middle), Some(middle)),
                (ost, Some(end), None),
            ]
            .into_iter()
            .map(|(station, arrival, departure)| {
                net.departure_or_insert(Departure {
                    station,
                    line: u2,
                    destination: ost,
                    arrival,
                    departure,
                })
                .0
            })
            .collect();
            net.push_trip(u2, Trip::new(trip));
        }
        net
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;
    use crate::domain::LineName;

    #[test]
    fn lines_sort_naturally() {
        let net = fixtures::network();
        let names: Vec<String> = sorted_lines(&net)
            .into_iter()
            .map(|l| net.line(l).name().to_string())
            .collect();
        assert_eq!(names, ["U2", "U10"]);
    }

    #[test]
    fn trips_sort_by_start() {
        let net = fixtures::network();
        let u2 = net.line_by_name(&LineName::new("U2")).unwrap();
        let starts: Vec<_> = sorted_trips(&net, u2)
            .into_iter()
            .map(|t| trip_start(&net, t).unwrap())
            .collect();
        assert_eq!(
            starts,
            [fixtures::ts(6, 0), fixtures::ts(9, 0), fixtures::ts(23, 50)]
        );
    }
}
