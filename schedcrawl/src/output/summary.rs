//! Plain-text views of a network for the terminal.

use std::fmt;

use chrono::NaiveDateTime;

use crate::domain::{Departure, Network};

use super::{event_time, sorted_lines, sorted_trips};

/// Every line with its stops and the departures of that line at each stop.
pub struct NetworkListing<'a>(pub &'a Network);

/// Number of trips per line, then where and when every trip starts and ends.
pub struct TripStatistics<'a>(pub &'a Network);

fn clock(time: Option<NaiveDateTime>) -> String {
    match time {
        Some(t) => t.format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

impl fmt::Display for NetworkListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let network = self.0;
        for line_idx in sorted_lines(network) {
            let line = network.line(line_idx);
            writeln!(f, "{}", line.name())?;
            for stop in line.stops() {
                let station = network.station(*stop);
                writeln!(f, "    {}", station.name())?;

                let mut departures: Vec<&Departure> = station
                    .departures()
                    .iter()
                    .map(|idx| network.departure(*idx))
                    .filter(|d| d.line == line_idx)
                    .collect();
                departures.sort_by_key(|d| event_time(d));
                for departure in departures {
                    writeln!(
                        f,
                        "        arr {}  dep {}  to {}",
                        clock(departure.arrival),
                        clock(departure.departure),
                        network.station(departure.destination).name()
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for TripStatistics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let network = self.0;
        let lines = sorted_lines(network);

        writeln!(f, "== Number of trips ==")?;
        for line in &lines {
            let line = network.line(*line);
            writeln!(f, "{} {}", line.name(), line.trips().len())?;
        }

        writeln!(f, "== From-To ==")?;
        for line_idx in lines {
            let name = network.line(line_idx).name();
            for trip in sorted_trips(network, line_idx) {
                let (Some(first), Some(last)) = (trip.departures.first(), trip.departures.last())
                else {
                    continue;
                };
                let first = network.departure(*first);
                let last = network.departure(*last);
                let at = match first.departure {
                    Some(t) => t.to_string(),
                    None => "?".to_string(),
                };
                writeln!(
                    f,
                    "{name} from {} to {} at {at}",
                    network.station(first.station).name(),
                    network.station(last.station).name()
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn listing_shows_departures_per_stop() {
        let net = fixtures::network();
        let listing = NetworkListing(&net).to_string();
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines[0], "U2");
        assert_eq!(lines[1], "    Feldmoching");
        assert_eq!(lines[2], "        arr --:--  dep 06:00  to Messestadt Ost");
        assert_eq!(lines[4], "        arr --:--  dep 23:50  to Messestadt Ost");
        assert_eq!(lines[5], "    Hauptbahnhof");
        assert!(listing.contains("        arr 00:20  dep --:--  to Messestadt Ost"));
    }

    #[test]
    fn departures_of_other_lines_are_not_listed() {
        let net = fixtures::network();
        let listing = NetworkListing(&net).to_string();
        let u10 = listing.split("U10\n").nth(1).unwrap();
        assert_eq!(u10, "    Hauptbahnhof\n    Messestadt Ost\n");
    }

    #[test]
    fn statistics_count_and_list_trips() {
        let net = fixtures::network();
        let stats = TripStatistics(&net).to_string();
        let lines: Vec<&str> = stats.lines().collect();

        assert_eq!(
            lines,
            [
                "== Number of trips ==",
                "U2 3",
                "U10 0",
                "== From-To ==",
                "U2 from Feldmoching to Messestadt Ost at 2024-03-15 06:00:00",
                "U2 from Feldmoching to Messestadt Ost at 2024-03-15 09:00:00",
                "U2 from Feldmoching to Messestadt Ost at 2024-03-15 23:50:00",
            ]
        );
    }
}
