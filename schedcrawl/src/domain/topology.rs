//! Static line topology, independent of where it was fetched from.

use serde::{Deserialize, Serialize};

use super::Coord;

/// Every route relation of the network with its stopping positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub routes: Vec<TopologyRoute>,
}

/// One route relation (usually one direction of one line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyRoute {
    /// Line designator, `None` if the relation carries no `ref`.
    pub line: Option<String>,
    /// Stopping positions in relation member order.
    pub stops: Vec<TopologyStop>,
}

/// A stopping position of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyStop {
    pub name: String,
    #[serde(default)]
    pub coord: Option<Coord>,
}

impl TopologyStop {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coord: None,
        }
    }
}

impl TopologyRoute {
    /// Convenience constructor from a designator and stop names.
    pub fn with_stops(line: &str, stops: &[&str]) -> Self {
        Self {
            line: Some(line.to_string()),
            stops: stops.iter().map(|s| TopologyStop::new(*s)).collect(),
        }
    }
}
