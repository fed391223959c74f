//! Network topology from OpenStreetMap via the Overpass API.

mod cache;
mod client;
mod convert;
mod error;
mod types;

pub use cache::{TopologyCache, TopologyCacheConfig};
pub use client::{DEFAULT_OVERPASS_URL, DEFAULT_RELATION_ID, OverpassClient, OverpassConfig};
pub use convert::convert_topology;
pub use error::OverpassError;
pub use types::{OsmElement, OsmMember, OverpassResponse};
