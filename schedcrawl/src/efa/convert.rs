//! Conversion from EFA DTOs to domain types.
//!
//! Sentinel dates are resolved here: anything the provider marks as "never
//! happens" becomes `None`, so the crawler only ever sees real timestamps.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::domain::{
    BoardDeparture, MotType, PlannedRoute, RouteLeg, RouteStop, StopId, StopMatch, StopRef,
};

use super::types::{
    DepartureMonitorResponse, DmDeparture, EfaDateTime, EfaLeg, EfaStopSeqPoint,
    StopFinderPoint, StopFinderPoints, StopFinderResponse, TripResponse,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a stop ID
    #[error("invalid stop ID: {0}")]
    InvalidStopId(String),

    /// Date/time components do not form a valid timestamp
    #[error("invalid date/time: {0}")]
    InvalidTime(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A stop carried more timestamps than arrival and departure
    #[error("unexpected number of timestamps at stop {stop}: {count}")]
    UnexpectedTimes { stop: String, count: usize },
}

/// Convert broken-down provider time, mapping sentinels to `None`.
///
/// The provider encodes events that do not happen with a year (and usually
/// every other component) of -1.
pub fn convert_date_time(dt: &EfaDateTime) -> Result<Option<NaiveDateTime>, ConversionError> {
    if dt.year <= 0 || dt.hour < 0 || dt.minute < 0 {
        return Ok(None);
    }

    let invalid = || {
        ConversionError::InvalidTime(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}",
            dt.year, dt.month, dt.day, dt.hour, dt.minute
        ))
    };

    let month = u32::try_from(dt.month).map_err(|_| invalid())?;
    let day = u32::try_from(dt.day).map_err(|_| invalid())?;
    let hour = u32::try_from(dt.hour).map_err(|_| invalid())?;
    let minute = u32::try_from(dt.minute).map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(dt.year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(Some)
        .ok_or_else(invalid)
}

/// Convert a stop finder response.
///
/// Results that are not stops (addresses, POIs) are dropped.
pub fn convert_stop_finder(resp: &StopFinderResponse) -> Result<StopMatch, ConversionError> {
    let (identified, points) = match &resp.stop_finder.points {
        None => (false, Vec::new()),
        Some(StopFinderPoints::Unique { point }) => (true, vec![point]),
        Some(StopFinderPoints::Candidates(points)) => (false, points.iter().collect()),
    };

    let mut candidates = Vec::with_capacity(points.len());
    for point in points {
        if point.any_type.as_deref().is_some_and(|t| t != "stop") {
            continue;
        }
        match convert_point(point) {
            Ok(stop) => candidates.push(stop),
            Err(e) => warn!(name = %point.name, error = %e, "skipping stop finder result"),
        }
    }

    Ok(StopMatch {
        identified: identified && candidates.len() == 1,
        candidates,
    })
}

fn convert_point(point: &StopFinderPoint) -> Result<StopRef, ConversionError> {
    let id = parse_stop_id(&point.point_ref.id)?;
    Ok(StopRef::new(id, stop_name(&point.name, point.object.as_deref())))
}

/// Convert a departure monitor response, skipping malformed entries.
pub fn convert_departure_monitor(resp: &DepartureMonitorResponse) -> Vec<BoardDeparture> {
    let list = resp.departure_list.as_deref().unwrap_or(&[]);
    let mut results = Vec::with_capacity(list.len());

    for item in list {
        match convert_dm_departure(item) {
            Ok(Some(departure)) => results.push(departure),
            Ok(None) => {}
            Err(e) => {
                // Log and skip rather than failing the whole listing
                warn!(
                    stop_id = %item.stop_id,
                    line = %item.serving_line.number,
                    error = %e,
                    "skipping departure"
                );
            }
        }
    }

    results
}

fn convert_dm_departure(item: &DmDeparture) -> Result<Option<BoardDeparture>, ConversionError> {
    let Some(departure) = convert_date_time(&item.date_time)? else {
        return Ok(None);
    };
    let line = &item.serving_line;
    let mot = mot_from_code(line.mot_type)?;
    let destination = StopRef::new(parse_stop_id(&line.dest_id)?, line.direction.trim());

    Ok(Some(BoardDeparture {
        line: line.number.trim().to_string(),
        mot,
        destination,
        departure,
    }))
}

/// Convert a trip response into planned routes.
///
/// Each alternative converts on its own; one that fails (typically a
/// footpath to a street address in an indirect route) is skipped.
pub fn convert_trips(resp: &TripResponse) -> Vec<PlannedRoute> {
    let trips = resp.trips.as_deref().unwrap_or(&[]);
    let mut routes = Vec::with_capacity(trips.len());

    for (i, trip) in trips.iter().enumerate() {
        match trip
            .legs
            .iter()
            .map(convert_leg)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(legs) => routes.push(PlannedRoute { legs }),
            Err(e) => warn!(alternative = i, error = %e, "skipping route alternative"),
        }
    }

    routes
}

fn convert_leg(leg: &EfaLeg) -> Result<RouteLeg, ConversionError> {
    let stops = leg
        .stop_seq
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(convert_stop_seq_point)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RouteLeg {
        mot: mot_from_code(leg.mode.mot_type)?,
        line: leg.mode.number.trim().to_string(),
        stops,
    })
}

/// A stop reports one timestamp (departure only) or two (arrival, then
/// departure).
fn convert_stop_seq_point(point: &EfaStopSeqPoint) -> Result<RouteStop, ConversionError> {
    let stop = StopRef::new(
        parse_stop_id(&point.point_ref.id)?,
        stop_name(&point.name, point.object.as_deref()),
    );

    let times = point
        .date_time
        .clone()
        .map(|dt| dt.into_vec())
        .unwrap_or_default();

    let (arrival, departure) = match times.as_slice() {
        [] => (None, None),
        [dep] => (None, convert_date_time(dep)?),
        [arr, dep] => (convert_date_time(arr)?, convert_date_time(dep)?),
        more => {
            return Err(ConversionError::UnexpectedTimes {
                stop: stop.name,
                count: more.len(),
            });
        }
    };

    Ok(RouteStop {
        stop,
        arrival,
        departure,
    })
}

fn parse_stop_id(raw: &str) -> Result<StopId, ConversionError> {
    StopId::parse(raw).map_err(|_| ConversionError::InvalidStopId(raw.to_string()))
}

fn mot_from_code(code: i32) -> Result<MotType, ConversionError> {
    u8::try_from(code)
        .map(MotType::from_code)
        .map_err(|_| ConversionError::MissingField("motType"))
}

/// Prefer the bare stop name over "Town, Stop".
fn stop_name(name: &str, object: Option<&str>) -> String {
    object
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .unwrap_or_else(|| name.trim())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::efa::types::{
        EfaMode, EfaTrip, OneOrMany, PointRef, ServingLine, StopFinder,
    };

    fn dt(year: i32, month: i32, day: i32, hour: i32, minute: i32) -> EfaDateTime {
        EfaDateTime {
            year,
            month,
            day,
            hour,
            minute,
        }
    }

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn point(name: &str, object: Option<&str>, any_type: Option<&str>, id: &str) -> StopFinderPoint {
        StopFinderPoint {
            name: name.to_string(),
            object: object.map(str::to_string),
            any_type: any_type.map(str::to_string),
            point_ref: PointRef { id: id.to_string() },
        }
    }

    fn seq_point(name: &str, id: &str, times: Option<OneOrMany<EfaDateTime>>) -> EfaStopSeqPoint {
        EfaStopSeqPoint {
            name: name.to_string(),
            object: None,
            point_ref: PointRef { id: id.to_string() },
            date_time: times,
        }
    }

    #[test]
    fn date_time_valid() {
        assert_eq!(convert_date_time(&dt(2024, 3, 15, 8, 5)).unwrap(), Some(ts(8, 5)));
    }

    #[test]
    fn date_time_sentinel_is_none() {
        assert_eq!(convert_date_time(&dt(-1, -1, -1, -1, -1)).unwrap(), None);
        assert_eq!(convert_date_time(&dt(-1, 3, 15, 8, 0)).unwrap(), None);
        assert_eq!(convert_date_time(&dt(0, 0, 0, 0, 0)).unwrap(), None);
    }

    #[test]
    fn date_time_invalid_components() {
        assert!(convert_date_time(&dt(2024, 13, 1, 8, 0)).is_err());
        assert!(convert_date_time(&dt(2024, 2, 30, 8, 0)).is_err());
        assert!(convert_date_time(&dt(2024, 3, 15, 24, 0)).is_err());
    }

    #[test]
    fn stop_finder_unique() {
        let resp = StopFinderResponse {
            stop_finder: StopFinder {
                points: Some(StopFinderPoints::Unique {
                    point: point("München, Marienplatz", Some("Marienplatz"), Some("stop"), "2"),
                }),
            },
        };
        let m = convert_stop_finder(&resp).unwrap();
        assert!(m.identified);
        assert_eq!(
            m.unique_stop(),
            Some(&StopRef::new(StopId::new(2), "Marienplatz"))
        );
    }

    #[test]
    fn stop_finder_candidates_are_not_identified() {
        let resp = StopFinderResponse {
            stop_finder: StopFinder {
                points: Some(StopFinderPoints::Candidates(vec![
                    point("München, Hauptbahnhof", None, Some("stop"), "6"),
                    point("München, Hauptbahnhofstraße", None, Some("street"), "x"),
                    point("München, Hauptbahnhof Süd", None, Some("stop"), "1002"),
                ])),
            },
        };
        let m = convert_stop_finder(&resp).unwrap();
        assert!(!m.identified);
        assert_eq!(m.candidates.len(), 2);
        assert_eq!(m.candidates[0].name, "München, Hauptbahnhof");
    }

    #[test]
    fn stop_finder_empty() {
        let resp = StopFinderResponse {
            stop_finder: StopFinder { points: None },
        };
        let m = convert_stop_finder(&resp).unwrap();
        assert!(!m.identified);
        assert!(m.candidates.is_empty());
    }

    #[test]
    fn departure_monitor_skips_bad_entries() {
        let good = DmDeparture {
            stop_id: "2".into(),
            date_time: dt(2024, 3, 15, 8, 0),
            serving_line: ServingLine {
                number: "U3".into(),
                mot_type: 2,
                dest_id: "1510".into(),
                direction: "Fürstenried West".into(),
            },
        };
        let mut bad_dest = good.clone();
        bad_dest.serving_line.dest_id = "de:09162:1510".into();
        let mut never = good.clone();
        never.date_time = dt(-1, -1, -1, -1, -1);

        let resp = DepartureMonitorResponse {
            departure_list: Some(vec![good, bad_dest, never]),
        };
        let deps = convert_departure_monitor(&resp);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].line, "U3");
        assert_eq!(deps[0].mot, MotType::Subway);
        assert_eq!(deps[0].destination.id, StopId::new(1510));
        assert_eq!(deps[0].departure, ts(8, 0));
    }

    #[test]
    fn trip_stops_one_or_two_times() {
        let resp = TripResponse {
            trips: Some(vec![EfaTrip {
                legs: vec![EfaLeg {
                    mode: EfaMode {
                        number: "U3".into(),
                        mot_type: 2,
                    },
                    stop_seq: Some(vec![
                        seq_point("A", "1", Some(OneOrMany::One(dt(2024, 3, 15, 8, 0)))),
                        seq_point(
                            "B",
                            "2",
                            Some(OneOrMany::Many(vec![
                                dt(2024, 3, 15, 8, 2),
                                dt(2024, 3, 15, 8, 3),
                            ])),
                        ),
                        seq_point(
                            "C",
                            "3",
                            Some(OneOrMany::Many(vec![
                                dt(2024, 3, 15, 8, 6),
                                dt(-1, -1, -1, -1, -1),
                            ])),
                        ),
                    ]),
                }],
            }]),
        };

        let routes = convert_trips(&resp);
        let stops = &routes[0].legs[0].stops;
        assert_eq!(stops[0].arrival, None);
        assert_eq!(stops[0].departure, Some(ts(8, 0)));
        assert_eq!(stops[1].arrival, Some(ts(8, 2)));
        assert_eq!(stops[1].departure, Some(ts(8, 3)));
        assert_eq!(stops[2].arrival, Some(ts(8, 6)));
        assert_eq!(stops[2].departure, None);
    }

    #[test]
    fn trip_stop_with_three_times_is_rejected() {
        let p = seq_point(
            "X",
            "9",
            Some(OneOrMany::Many(vec![
                dt(2024, 3, 15, 8, 0),
                dt(2024, 3, 15, 8, 1),
                dt(2024, 3, 15, 8, 2),
            ])),
        );
        assert!(matches!(
            convert_stop_seq_point(&p),
            Err(ConversionError::UnexpectedTimes { count: 3, .. })
        ));
    }

    #[test]
    fn empty_trip_response() {
        let resp = TripResponse { trips: None };
        assert!(convert_trips(&resp).is_empty());
    }

    #[test]
    fn unconvertible_alternative_does_not_drop_the_others() {
        let leg = |number: &str, mot_type: i32, stops: Vec<EfaStopSeqPoint>| EfaLeg {
            mode: EfaMode {
                number: number.into(),
                mot_type,
            },
            stop_seq: Some(stops),
        };
        let at = |minute: i32| Some(OneOrMany::One(dt(2024, 3, 15, 8, minute)));

        let direct = EfaTrip {
            legs: vec![leg(
                "U1",
                2,
                vec![seq_point("A", "1", at(0)), seq_point("C", "3", at(6))],
            )],
        };
        let with_footpath = EfaTrip {
            legs: vec![
                leg(
                    "U1",
                    2,
                    vec![seq_point("A", "1", at(0)), seq_point("B", "2", at(3))],
                ),
                leg(
                    "",
                    100,
                    vec![
                        seq_point("B", "2", at(3)),
                        seq_point("Leopoldstraße 12", "streetID:1500", at(9)),
                    ],
                ),
            ],
        };

        let resp = TripResponse {
            trips: Some(vec![with_footpath, direct]),
        };
        let routes = convert_trips(&resp);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].legs.len(), 1);
        assert_eq!(routes[0].legs[0].line, "U1");
        assert_eq!(routes[0].legs[0].stops[1].stop.id, StopId::new(3));
    }

    #[test]
    fn stop_name_prefers_object() {
        assert_eq!(stop_name("München, Marienplatz", Some("Marienplatz")), "Marienplatz");
        assert_eq!(stop_name("Marienplatz", Some("  ")), "Marienplatz");
        assert_eq!(stop_name(" Odeonsplatz ", None), "Odeonsplatz");
    }
}
