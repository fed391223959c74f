//! EFA API response DTOs.
//!
//! These map the EFA JSON interface (`outputFormat=JSON`). The interface is
//! a mechanical translation of the XML one, which shows in two quirks:
//! numbers are usually sent as strings, and an element that occurs once is
//! an object while repeated elements become an array.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Either a single element or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Response from `XML_STOPFINDER_REQUEST`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopFinderResponse {
    #[serde(rename = "stopFinder")]
    pub stop_finder: StopFinder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopFinder {
    /// Absent or null when nothing matched.
    #[serde(default)]
    pub points: Option<StopFinderPoints>,
}

/// A uniquely identified stop comes back as `{"point": {...}}`; a list of
/// candidates as a plain array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StopFinderPoints {
    Candidates(Vec<StopFinderPoint>),
    Unique { point: StopFinderPoint },
}

/// One stop finder result.
#[derive(Debug, Clone, Deserialize)]
pub struct StopFinderPoint {
    /// Full name including the town (e.g. "München, Marienplatz").
    pub name: String,

    /// Stop name without the town, when the provider sends it.
    #[serde(default)]
    pub object: Option<String>,

    /// Kind of location ("stop", "poi", "street", ...).
    #[serde(rename = "anyType", default)]
    pub any_type: Option<String>,

    #[serde(rename = "ref")]
    pub point_ref: PointRef,
}

/// Reference block of a location.
#[derive(Debug, Clone, Deserialize)]
pub struct PointRef {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
}

/// Response from `XML_DM_REQUEST` (departure monitor).
#[derive(Debug, Clone, Deserialize)]
pub struct DepartureMonitorResponse {
    #[serde(rename = "departureList", default)]
    pub departure_list: Option<Vec<DmDeparture>>,
}

/// One departure monitor entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DmDeparture {
    #[serde(rename = "stopID", deserialize_with = "lenient_string")]
    pub stop_id: String,

    /// Planned departure time.
    #[serde(rename = "dateTime")]
    pub date_time: EfaDateTime,

    #[serde(rename = "servingLine")]
    pub serving_line: ServingLine,
}

/// Line serving a departure.
#[derive(Debug, Clone, Deserialize)]
pub struct ServingLine {
    /// Line number (e.g. "U3"); may be the bare family symbol for
    /// services without a number.
    #[serde(default)]
    pub number: String,

    #[serde(rename = "motType", deserialize_with = "lenient_i32")]
    pub mot_type: i32,

    /// Stop ID of the service's destination.
    #[serde(rename = "destID", deserialize_with = "lenient_string")]
    pub dest_id: String,

    /// Destination as displayed on the train.
    #[serde(default)]
    pub direction: String,
}

/// Response from `XML_TRIP_REQUEST2`.
#[derive(Debug, Clone, Deserialize)]
pub struct TripResponse {
    /// Null when no connection was found.
    #[serde(default)]
    pub trips: Option<Vec<EfaTrip>>,
}

/// One route alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct EfaTrip {
    pub legs: Vec<EfaLeg>,
}

/// One leg of a route alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct EfaLeg {
    pub mode: EfaMode,

    /// Stops served on this leg; missing for footpaths.
    #[serde(rename = "stopSeq", default)]
    pub stop_seq: Option<Vec<EfaStopSeqPoint>>,
}

/// Vehicle used on a leg.
#[derive(Debug, Clone, Deserialize)]
pub struct EfaMode {
    /// Line short name.
    #[serde(default)]
    pub number: String,

    /// Mode of transport code.
    #[serde(rename = "type", deserialize_with = "lenient_i32")]
    pub mot_type: i32,
}

/// A stop on a leg with its arrival and/or departure time.
#[derive(Debug, Clone, Deserialize)]
pub struct EfaStopSeqPoint {
    pub name: String,

    #[serde(default)]
    pub object: Option<String>,

    #[serde(rename = "ref")]
    pub point_ref: PointRef,

    /// One entry (departure) or two (arrival, departure).
    #[serde(rename = "dateTime", default)]
    pub date_time: Option<OneOrMany<EfaDateTime>>,
}

/// Broken-down local date and time.
///
/// A year of -1 means the event does not take place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EfaDateTime {
    #[serde(deserialize_with = "lenient_i32")]
    pub year: i32,
    #[serde(deserialize_with = "lenient_i32")]
    pub month: i32,
    #[serde(deserialize_with = "lenient_i32")]
    pub day: i32,
    #[serde(deserialize_with = "lenient_i32")]
    pub hour: i32,
    #[serde(deserialize_with = "lenient_i32")]
    pub minute: i32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

/// Accept `"12"` as well as `12`.
fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => i32::try_from(n).map_err(D::Error::custom),
        NumberOrString::String(s) => s.trim().parse().map_err(D::Error::custom),
    }
}

/// Accept `12` as well as `"12"`, yielding the string form.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n.to_string()),
        NumberOrString::String(s) => Ok(s),
    }
}
