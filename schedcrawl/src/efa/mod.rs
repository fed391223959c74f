//! EFA timetable provider client.
//!
//! EFA ("Elektronische Fahrplanauskunft") is the journey planner behind most
//! German regional transit networks. This module talks to its JSON interface.
//!
//! Key characteristics of EFA:
//! - Stops have numeric IDs; names in results carry a town prefix unless the
//!   `object` field is used
//! - Times are broken down into components, in local time
//! - Events that do not happen are encoded with a year of -1
//! - A single-element list is sent as a bare object

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{DEFAULT_BASE_URL, EfaClient, EfaConfig};
pub use convert::{
    ConversionError, convert_date_time, convert_departure_monitor, convert_stop_finder,
    convert_trips,
};
pub use error::EfaError;
pub use mock::{
    DepartureRequest, FixtureBoard, FixtureRoutes, MockFixture, MockTimetable, RouteRequest,
};
pub use types::{DepartureMonitorResponse, EfaDateTime, StopFinderResponse, TripResponse};
