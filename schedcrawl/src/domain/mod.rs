//! Domain types for the network crawler.
//!
//! The network is an arena: stations, lines and departures are stored once
//! in [`Network`] and addressed by index. Provider-facing value types
//! ([`StopRef`], [`BoardDeparture`], [`PlannedRoute`]) carry no network
//! references.

mod departure;
mod line;
mod network;
mod station;
mod time;
mod timetable;
mod topology;

pub use departure::{Departure, DepartureIdx, DepartureKey};
pub use line::{Line, LineIdx, LineName, Trip};
pub use network::Network;
pub use station::{Coord, Station, StationIdx};
pub use time::{add_minutes, is_after_day, service_time, time_at_date, today};
pub use timetable::{
    BoardDeparture, InvalidStopId, MotType, PlannedRoute, RouteLeg, RouteStop, StopId, StopMatch,
    StopRef,
};
pub use topology::{Topology, TopologyRoute, TopologyStop};
