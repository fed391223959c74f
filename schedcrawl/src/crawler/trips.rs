//! Trip building: expanding a seed departure into whole trips.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{
    Departure, LineName, Network, PlannedRoute, RouteLeg, StationIdx, Trip, add_minutes,
    is_after_day,
};

use super::{CrawlError, Crawler, TimetableProvider, TripSeed};

impl<P: TimetableProvider> Crawler<'_, P> {
    /// Plan routes from the seed's origin to its destination and turn every
    /// direct route into a trip of the seed's line.
    ///
    /// Returns the number of trips added. Routes that are not direct, or
    /// that start on a later day than the seed, are ignored.
    pub async fn build_trip(
        &self,
        network: &mut Network,
        seed: &TripSeed,
    ) -> Result<usize, CrawlError> {
        let start = network.departure(seed.departure).clone();
        let Some(seed_time) = start.departure else {
            return Err(CrawlError::MissingDepartureTime(
                network.station(start.station).name().to_string(),
            ));
        };

        let line = network.line(start.line);
        let line_name = line.name().clone();
        // Many alternatives only when running to the end of the line;
        // otherwise later routes would overrun the partial journey.
        let max_routes = if line_name.is_unnumbered() || !line.is_terminus(start.destination) {
            1
        } else {
            self.config.max_routes
        };

        let routes = self
            .provider
            .routes(
                seed.origin,
                seed.destination,
                add_minutes(seed_time, self.config.trip_offset_mins),
                self.config.mot,
                max_routes,
            )
            .await?;

        if routes.is_empty() {
            return Err(CrawlError::NoRouteFound {
                origin: network.station(start.station).name().to_string(),
                destination: network.station(start.destination).name().to_string(),
            });
        }

        let mut added = 0;
        for route in &routes {
            let Some(leg) = self.direct_leg(route, &line_name, seed_time.date()) else {
                continue;
            };
            match self.expand_route(network, &start, leg).await {
                Ok(trip) => {
                    if network.push_trip(start.line, trip) {
                        added += 1;
                    }
                }
                Err(e) => {
                    warn!(line = %line_name, error = %e, "cannot expand route");
                }
            }
        }

        debug!(
            line = %line_name,
            routes = routes.len(),
            added,
            "trip building done"
        );
        Ok(added)
    }

    /// The single leg of a route, if the route is a direct ride on `line`
    /// that starts on the seed's day.
    fn direct_leg<'r>(
        &self,
        route: &'r PlannedRoute,
        line: &LineName,
        seed_day: NaiveDate,
    ) -> Option<&'r RouteLeg> {
        let [leg] = route.legs.as_slice() else {
            return None;
        };
        if leg.mot != self.config.mot {
            return None;
        }
        if LineName::from_designator(&leg.line, &self.config.line_prefix).as_ref() != Some(line) {
            return None;
        }
        let first = leg.stops.first()?.time()?;
        if is_after_day(first, seed_day) {
            debug!(line = %line, at = %first, "route starts on a later day");
            return None;
        }
        Some(leg)
    }

    /// Create or reuse a departure at every stop of the leg.
    ///
    /// All stops are resolved before anything is inserted, so a failing
    /// stop leaves the network untouched.
    async fn expand_route(
        &self,
        network: &mut Network,
        seed: &Departure,
        leg: &RouteLeg,
    ) -> Result<Trip, CrawlError> {
        let mut stations: Vec<StationIdx> = Vec::with_capacity(leg.stops.len());
        for stop in &leg.stops {
            if stop.time().is_none() {
                return Err(CrawlError::MissingDepartureTime(stop.stop.name.clone()));
            }
            stations.push(self.resolver.resolve(network, &stop.stop).await?);
        }

        let mut departures = Vec::with_capacity(stations.len());
        for (i, (stop, station)) in leg.stops.iter().zip(stations).enumerate() {
            let (idx, created) = network.departure_or_insert(Departure {
                station,
                line: seed.line,
                destination: seed.destination,
                arrival: stop.arrival,
                departure: stop.departure,
            });
            if created {
                if i == 0 {
                    debug!(
                        station = network.station(station).name(),
                        "route origin had no matching departure"
                    );
                }
            } else {
                network.complete_departure(idx, stop.arrival);
            }
            departures.push(idx);
        }

        Ok(Trip::new(departures))
    }
}
