//! Transit network crawler.
//!
//! Assembles a subway network from two sources: line topology from
//! OpenStreetMap and departure times from an EFA timetable service. The
//! result is a deduplicated graph of lines, stations, trips and departures
//! that can be written as JSON or as a GTFS feed.

pub mod cache;
pub mod crawler;
pub mod domain;
pub mod efa;
pub mod output;
pub mod overpass;
