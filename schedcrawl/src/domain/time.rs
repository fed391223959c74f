//! Time handling for the crawl.
//!
//! All provider timestamps are local wall-clock times. The crawl is anchored
//! to one service date; departures are re-anchored onto that date and
//! anything that spills into the following day is cut off.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Place a time of day onto the given calendar date.
///
/// # Examples
///
/// ```
/// use schedcrawl::domain::time_at_date;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let three = NaiveTime::from_hms_opt(3, 0, 0).unwrap();
/// assert_eq!(time_at_date(three, date).to_string(), "2024-03-15 03:00:00");
/// ```
pub fn time_at_date(time: NaiveTime, date: NaiveDate) -> NaiveDateTime {
    date.and_time(time)
}

/// Whether `timestamp` falls on a later calendar day than `date`.
pub fn is_after_day(timestamp: NaiveDateTime, date: NaiveDate) -> bool {
    timestamp.date() > date
}

/// Shift a timestamp forward by whole minutes.
pub fn add_minutes(timestamp: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    timestamp + Duration::minutes(minutes)
}

/// Format a timestamp relative to a service date as GTFS `HH:MM:SS`.
///
/// Times on the following day keep counting past 24 hours, as the feed
/// format requires for trips that run over midnight.
///
/// # Examples
///
/// ```
/// use schedcrawl::domain::service_time;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let late = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap().and_hms_opt(0, 40, 0).unwrap();
/// assert_eq!(service_time(late, date), "24:40:00");
/// ```
pub fn service_time(timestamp: NaiveDateTime, service_date: NaiveDate) -> String {
    let days = (timestamp.date() - service_date).num_days();
    let hours = days * 24 + i64::from(timestamp.hour());
    format!(
        "{:02}:{:02}:{:02}",
        hours,
        timestamp.minute(),
        timestamp.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        d.and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn later_day_detection() {
        let d = date(2024, 3, 15);
        assert!(!is_after_day(at(d, 23, 59), d));
        assert!(is_after_day(at(date(2024, 3, 16), 0, 1), d));
        assert!(!is_after_day(at(date(2024, 3, 14), 23, 0), d));
    }

    #[test]
    fn add_minutes_crosses_midnight() {
        let d = date(2024, 12, 31);
        let t = add_minutes(at(d, 23, 59), 1);
        assert_eq!(t, at(date(2025, 1, 1), 0, 0));
    }

    #[test]
    fn service_time_same_day() {
        let d = date(2024, 3, 15);
        assert_eq!(service_time(at(d, 8, 5), d), "08:05:00");
        assert_eq!(service_time(at(d, 0, 0), d), "00:00:00");
    }

    #[test]
    fn service_time_next_day() {
        let d = date(2024, 3, 15);
        assert_eq!(service_time(at(date(2024, 3, 16), 1, 15), d), "25:15:00");
    }
}
