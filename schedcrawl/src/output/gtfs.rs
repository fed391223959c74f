//! GTFS feed export.
//!
//! Writes a minimal static feed: one agency, a stop per station, a route per
//! line with trips, and a single service that runs on the crawl date only.
//! Times after midnight keep counting from the crawl date (`24:20:00`).

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::domain::{MotType, Network, Station, StationIdx, service_time};

use super::{OutputError, sorted_lines, sorted_trips};

/// Agency and mode details for the feed.
#[derive(Debug, Clone)]
pub struct GtfsConfig {
    pub agency_id: String,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    /// Mode every route is exported as
    pub mot: MotType,
}

impl Default for GtfsConfig {
    fn default() -> Self {
        Self {
            agency_id: "MVG".to_string(),
            agency_name: "Münchner Verkehrsgesellschaft".to_string(),
            agency_url: "https://www.mvg.de".to_string(),
            agency_timezone: "Europe/Berlin".to_string(),
            mot: MotType::Subway,
        }
    }
}

impl GtfsConfig {
    pub fn with_agency(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.agency_id = id.into();
        self.agency_name = name.into();
        self.agency_url = url.into();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.agency_timezone = timezone.into();
        self
    }

    pub fn with_mot(mut self, mot: MotType) -> Self {
        self.mot = mot;
        self
    }
}

#[derive(Debug, Serialize)]
struct Agency<'a> {
    agency_id: &'a str,
    agency_name: &'a str,
    agency_url: &'a str,
    agency_timezone: &'a str,
}

#[derive(Debug, Serialize)]
struct Stop<'a> {
    stop_id: String,
    stop_name: &'a str,
    stop_lat: Option<f64>,
    stop_lon: Option<f64>,
}

#[derive(Debug, Serialize)]
struct Route<'a> {
    route_id: String,
    agency_id: &'a str,
    route_short_name: &'a str,
    route_type: u16,
}

#[derive(Debug, Serialize)]
struct Trip<'a> {
    route_id: &'a str,
    service_id: &'a str,
    trip_id: String,
    trip_headsign: &'a str,
}

#[derive(Debug, Serialize)]
struct StopTime {
    trip_id: String,
    arrival_time: String,
    departure_time: String,
    stop_id: String,
    stop_sequence: u32,
}

#[derive(Debug, Serialize)]
struct CalendarDate<'a> {
    service_id: &'a str,
    date: String,
    exception_type: u8,
}

/// Station stop ID: the provider ID when known, otherwise a synthetic one.
fn stop_id(idx: StationIdx, station: &Station) -> String {
    match station.stop_id() {
        Some(id) => id.to_string(),
        None => format!("station-{}", idx.0),
    }
}

fn route_id(name: &str) -> String {
    if name.is_empty() {
        "unnumbered".to_string()
    } else {
        name.to_string()
    }
}

/// Write the feed files into `dir`, creating it if needed.
pub fn write_gtfs(
    network: &Network,
    service_date: NaiveDate,
    config: &GtfsConfig,
    dir: &Path,
) -> Result<(), OutputError> {
    fs::create_dir_all(dir)?;
    let service_id = service_date.format("%Y%m%d").to_string();

    let mut agency_writer = Writer::from_path(dir.join("agency.txt"))?;
    agency_writer.serialize(Agency {
        agency_id: &config.agency_id,
        agency_name: &config.agency_name,
        agency_url: &config.agency_url,
        agency_timezone: &config.agency_timezone,
    })?;
    agency_writer.flush()?;

    let mut stops_writer = Writer::from_path(dir.join("stops.txt"))?;
    for (idx, station) in network.stations() {
        stops_writer.serialize(Stop {
            stop_id: stop_id(idx, station),
            stop_name: station.name(),
            stop_lat: station.coord().map(|c| c.lat),
            stop_lon: station.coord().map(|c| c.lon),
        })?;
    }
    stops_writer.flush()?;

    let mut routes_writer = Writer::from_path(dir.join("routes.txt"))?;
    let mut trips_writer = Writer::from_path(dir.join("trips.txt"))?;
    let mut stop_times_writer = Writer::from_path(dir.join("stop_times.txt"))?;
    let mut trip_total = 0;

    for line_idx in sorted_lines(network) {
        let line = network.line(line_idx);
        if line.trips().is_empty() {
            continue;
        }
        let route_id = route_id(line.name().as_str());
        routes_writer.serialize(Route {
            route_id: route_id.clone(),
            agency_id: &config.agency_id,
            route_short_name: line.name().as_str(),
            route_type: config.mot.gtfs_route_type(),
        })?;

        for (n, trip) in sorted_trips(network, line_idx).into_iter().enumerate() {
            let trip_id = format!("{route_id}-{}", n + 1);
            let headsign = trip
                .departures
                .first()
                .map(|d| network.station(network.departure(*d).destination).name())
                .unwrap_or_default();
            trips_writer.serialize(Trip {
                route_id: &route_id,
                service_id: &service_id,
                trip_id: trip_id.clone(),
                trip_headsign: headsign,
            })?;

            for (seq, idx) in trip.departures.iter().enumerate() {
                let departure = network.departure(*idx);
                let arrival = departure.arrival.or(departure.departure);
                let leaving = departure.departure.or(departure.arrival);
                let (Some(arrival), Some(leaving)) = (arrival, leaving) else {
                    continue;
                };
                stop_times_writer.serialize(StopTime {
                    trip_id: trip_id.clone(),
                    arrival_time: service_time(arrival, service_date),
                    departure_time: service_time(leaving, service_date),
                    stop_id: stop_id(departure.station, network.station(departure.station)),
                    stop_sequence: seq as u32 + 1,
                })?;
            }
            trip_total += 1;
        }
    }
    routes_writer.flush()?;
    trips_writer.flush()?;
    stop_times_writer.flush()?;

    let mut calendar_writer = Writer::from_path(dir.join("calendar_dates.txt"))?;
    calendar_writer.serialize(CalendarDate {
        service_id: &service_id,
        date: service_id.clone(),
        exception_type: 1,
    })?;
    calendar_writer.flush()?;

    info!(dir = %dir.display(), trips = trip_total, "wrote GTFS feed");
    Ok(())
}
