//! Builds the network skeleton from topology data.

use tracing::debug;

use crate::domain::{LineName, Network, Topology};

/// Create lines and stations from route relations.
///
/// Stations are matched by exact name only; topology names are taken as
/// authoritative. Relations without a line designator are skipped.
pub fn build_network(topology: &Topology) -> Network {
    let mut network = Network::new();

    for route in &topology.routes {
        let Some(designator) = route.line.as_deref().map(str::trim) else {
            debug!(stops = route.stops.len(), "skipping relation without ref");
            continue;
        };
        if designator.is_empty() {
            debug!(stops = route.stops.len(), "skipping relation without ref");
            continue;
        }

        let line = network.line_or_insert(LineName::new(designator));
        for stop in &route.stops {
            let station = network.station_or_insert(&stop.name, stop.coord);
            network.line_mut(line).push_stop(station);
        }
    }

    debug!(
        lines = network.line_count(),
        stations = network.station_count(),
        "network skeleton built"
    );
    network
}
