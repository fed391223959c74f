//! Departure crawling at a single station.

use tracing::{debug, warn};

use crate::domain::{
    BoardDeparture, Departure, DepartureKey, LineIdx, LineName, Network, StationIdx, time_at_date,
};

use super::{CrawlError, CrawlReport, Crawler, TimetableProvider, TripSeed, UnnumberedPolicy};

impl<P: TimetableProvider> Crawler<'_, P> {
    /// List the station's departures for the crawl date and expand every
    /// new departure of a line ending here into trips.
    ///
    /// Failing to identify the station or to list its departures aborts
    /// the station. Anything going wrong with a single departure is logged
    /// and counted, and the listing carries on.
    pub async fn crawl_all_departures(
        &self,
        network: &mut Network,
        station: StationIdx,
    ) -> Result<CrawlReport, CrawlError> {
        let window_start = time_at_date(self.config.first_train, self.date);
        let name = network.station(station).name().to_string();

        let found = self.provider.find_stop(&name).await?;
        let Some(stop) = found.first().cloned() else {
            return Err(CrawlError::NotFound(name));
        };
        if !found.identified {
            warn!(
                station = %name,
                candidates = found.candidates.len(),
                using = %stop.name,
                "stop was not uniquely identified"
            );
        }
        match network.station_by_stop_id(stop.id) {
            Some(holder) if holder != station => warn!(
                station = %name,
                id = %stop.id,
                holder = network.station(holder).name(),
                "stop ID already belongs to another station, not binding"
            ),
            _ => {
                if !network.station_mut(station).bind_stop_id(stop.id) {
                    warn!(station = %name, id = %stop.id, "station is bound to a different stop ID");
                }
            }
        }

        let listing = self
            .provider
            .departures(
                stop.id,
                window_start,
                self.config.departure_limit,
                self.config.mot,
            )
            .await?;
        debug!(station = %name, departures = listing.len(), "departure listing");

        let mut report = CrawlReport {
            stations: 1,
            listed: listing.len(),
            ..CrawlReport::default()
        };

        for entry in &listing {
            if entry.departure.date() != self.date {
                debug!(station = %name, at = %entry.departure, "listing left the service day");
                break;
            }

            let Some(line) = self.seed_line(network, station, entry) else {
                report.skipped += 1;
                continue;
            };

            let destination = match self.resolver.resolve(network, &entry.destination).await {
                Ok(destination) => destination,
                Err(e) => {
                    warn!(
                        station = %name,
                        line = %entry.line,
                        destination = %entry.destination.name,
                        error = %e,
                        "cannot resolve destination"
                    );
                    report.failed += 1;
                    continue;
                }
            };

            let key = DepartureKey::new(line, destination, None, Some(entry.departure));
            if network.find_departure(station, &key).is_some() {
                report.duplicates += 1;
                continue;
            }

            let (departure, _) = network.departure_or_insert(Departure {
                station,
                line,
                destination,
                arrival: None,
                departure: Some(entry.departure),
            });
            report.seeds += 1;

            let seed = TripSeed {
                departure,
                origin: stop.id,
                destination: entry.destination.id,
            };
            match self.build_trip(network, &seed).await {
                Ok(added) => report.trips += added,
                Err(e) => {
                    warn!(
                        station = %name,
                        line = %entry.line,
                        at = %entry.departure,
                        kind = ?e.kind(),
                        error = %e,
                        "trip building failed"
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// The line a listed departure seeds trips for, or `None` if it is to
    /// be skipped.
    fn seed_line(
        &self,
        network: &mut Network,
        station: StationIdx,
        entry: &BoardDeparture,
    ) -> Option<LineIdx> {
        if entry.mot != self.config.mot {
            return None;
        }
        let name = LineName::from_designator(&entry.line, &self.config.line_prefix)?;

        if name.is_unnumbered() {
            return match self.config.unnumbered {
                UnnumberedPolicy::AcceptAll => Some(network.line_or_insert(name)),
                UnnumberedPolicy::Skip => None,
            };
        }

        let Some(line) = network.line_by_name(&name) else {
            debug!(line = %name, "line not in topology");
            return None;
        };
        // Only termini seed trips; intermediate stations are reached by
        // expanding routes from the ends of the line.
        if !network.line(line).is_terminus(station) {
            return None;
        }
        Some(line)
    }
}

