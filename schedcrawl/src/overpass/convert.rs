//! Conversion from Overpass elements to [`Topology`].

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{Coord, Topology, TopologyRoute, TopologyStop};

use super::types::{OsmElement, OverpassResponse};

/// Member roles marking a stopping position.
const STOP_ROLES: [&str; 3] = ["stop", "stop_exit_only", "stop_entry_only"];

/// Build a topology from the route relations in `response`.
///
/// Relations that are not `type=route` (the network or route master the
/// query started from) are ignored. Stop members whose node is missing from
/// the response or carries no name are dropped.
pub fn convert_topology(response: &OverpassResponse) -> Topology {
    let nodes: HashMap<i64, &OsmElement> = response
        .elements
        .iter()
        .filter(|e| e.is_node())
        .map(|e| (e.id, e))
        .collect();

    let routes = response
        .elements
        .iter()
        .filter(|e| e.is_relation() && e.tag("type") == Some("route"))
        .map(|relation| convert_route(relation, &nodes))
        .collect();

    Topology { routes }
}

fn convert_route(relation: &OsmElement, nodes: &HashMap<i64, &OsmElement>) -> TopologyRoute {
    let mut stops = Vec::new();
    for member in &relation.members {
        if member.member_type != "node" || !STOP_ROLES.contains(&member.role.as_str()) {
            continue;
        }
        let Some(node) = nodes.get(&member.member_ref) else {
            debug!(relation = relation.id, node = member.member_ref, "stop node not in response");
            continue;
        };
        let Some(name) = node.tag("name").filter(|n| !n.trim().is_empty()) else {
            debug!(relation = relation.id, node = node.id, "stop node has no name");
            continue;
        };
        let coord = match (node.lat, node.lon) {
            (Some(lat), Some(lon)) => Some(Coord { lat, lon }),
            _ => None,
        };
        stops.push(TopologyStop {
            name: name.to_string(),
            coord,
        });
    }

    TopologyRoute {
        line: relation.tag("ref").map(str::to_string),
        stops,
    }
}
