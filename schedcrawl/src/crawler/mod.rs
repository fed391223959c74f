//! Network assembly.
//!
//! Builds the network skeleton from topology, then crawls the timetable
//! provider from the termini of every line:
//!
//! 1. **Departures** are listed at a terminus for the whole service day
//! 2. Each new departure of a line serving that terminus becomes a **seed**
//! 3. The seed is expanded into **trips** by planning routes to its
//!    destination; every stop on a direct route gets a departure
//!
//! Departures are deduplicated per station by line, destination and time,
//! so later seeds reuse what earlier trips already produced.

mod builder;
mod config;
mod departures;
mod error;
mod resolver;
mod trips;


use chrono::{NaiveDate, NaiveDateTime};
use tracing::{error, info};

use crate::domain::{
    BoardDeparture, DepartureIdx, MotType, Network, PlannedRoute, StationIdx, StopId, StopMatch,
};
use crate::efa::EfaError;

pub use builder::build_network;
pub use config::{CrawlConfig, UnnumberedPolicy};
pub use error::{CrawlError, ErrorKind};
pub use resolver::{StationResolver, sanitize};

/// Source of live timetable data.
///
/// Implemented by the EFA client, the in-memory mock and the caching
/// wrapper.
#[allow(async_fn_in_trait)]
pub trait TimetableProvider {
    /// Identify stops by free-text name.
    async fn find_stop(&self, name: &str) -> Result<StopMatch, EfaError>;

    /// Look up a stop by its numeric ID.
    async fn stop_by_id(&self, id: StopId) -> Result<StopMatch, EfaError>;

    /// List departures at a stop in time order, starting at `from`.
    async fn departures(
        &self,
        stop: StopId,
        from: NaiveDateTime,
        limit: usize,
        mot: MotType,
    ) -> Result<Vec<BoardDeparture>, EfaError>;

    /// Plan up to `max_routes` routes departing `origin` at `depart_at`.
    async fn routes(
        &self,
        origin: StopId,
        destination: StopId,
        depart_at: NaiveDateTime,
        mot: MotType,
        max_routes: usize,
    ) -> Result<Vec<PlannedRoute>, EfaError>;
}

/// A departure to expand into trips, with the provider IDs of where it
/// starts and where it is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripSeed {
    pub departure: DepartureIdx,
    pub origin: StopId,
    pub destination: StopId,
}

/// Counters describing what a crawl did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Stations whose departure listing was processed.
    pub stations: usize,
    /// Stations whose crawl was aborted.
    pub failed_stations: usize,
    /// Entries returned by departure listings.
    pub listed: usize,
    /// New departures used as trip seeds.
    pub seeds: usize,
    /// Listed departures already present in the network.
    pub duplicates: usize,
    /// Listed departures filtered out (other line, not a terminus, ...).
    pub skipped: usize,
    /// Departures or trips abandoned because of an error.
    pub failed: usize,
    /// Trips added to lines.
    pub trips: usize,
}

impl CrawlReport {
    pub fn merge(&mut self, other: &CrawlReport) {
        self.stations += other.stations;
        self.failed_stations += other.failed_stations;
        self.listed += other.listed;
        self.seeds += other.seeds;
        self.duplicates += other.duplicates;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.trips += other.trips;
    }
}

/// Crawls a timetable provider into a network for one service date.
pub struct Crawler<'p, P> {
    provider: &'p P,
    resolver: StationResolver<'p, P>,
    config: CrawlConfig,
    date: NaiveDate,
}

impl<'p, P: TimetableProvider> Crawler<'p, P> {
    pub fn new(provider: &'p P, config: CrawlConfig, date: NaiveDate) -> Self {
        Self {
            provider,
            resolver: StationResolver::new(provider),
            config,
            date,
        }
    }

    /// Crawl both termini of every numbered line.
    ///
    /// A terminus shared by several lines is crawled once. Stations that
    /// fail are logged and counted; the crawl carries on with the rest.
    pub async fn crawl(&self, network: &mut Network) -> CrawlReport {
        let seeds = termini(network);
        info!(stations = seeds.len(), date = %self.date, "crawling termini");

        let mut report = CrawlReport::default();
        for station in seeds {
            match self.crawl_all_departures(network, station).await {
                Ok(station_report) => report.merge(&station_report),
                Err(e) => {
                    error!(
                        station = network.station(station).name(),
                        kind = ?e.kind(),
                        error = %e,
                        "station crawl failed"
                    );
                    report.failed_stations += 1;
                }
            }
        }

        info!(
            stations = report.stations,
            failed_stations = report.failed_stations,
            seeds = report.seeds,
            trips = report.trips,
            departures = network.departure_count(),
            "crawl finished"
        );
        report
    }
}

/// Distinct termini of all numbered lines, in line order.
fn termini(network: &Network) -> Vec<StationIdx> {
    let mut seeds = Vec::new();
    for (_, line) in network.lines() {
        if let Some((first, last)) = line.termini() {
            for station in [first, last] {
                if !seeds.contains(&station) {
                    seeds.push(station);
                }
            }
        }
    }
    seeds
}
