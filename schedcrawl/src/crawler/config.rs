//! Crawl configuration.

use chrono::NaiveTime;

use crate::domain::MotType;

/// How departures of services without a line number are treated.
///
/// Unnumbered services belong to a placeholder line without termini, so the
/// terminus check cannot apply to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnnumberedPolicy {
    /// Use every unnumbered departure as a crawl seed.
    #[default]
    AcceptAll,
    /// Ignore unnumbered services entirely.
    Skip,
}

/// Configuration parameters for crawling the timetable provider.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Only services of this mode of transport are crawled.
    pub mot: MotType,

    /// Line family prefix; designators not starting with it are ignored.
    pub line_prefix: String,

    /// Time of day the departure listing starts at.
    pub first_train: NaiveTime,

    /// Maximum number of departures requested per station.
    pub departure_limit: usize,

    /// Alternative routes requested when the seed runs to a terminus.
    pub max_routes: usize,

    /// How far past the seed departure route planning starts (minutes).
    /// The provider also returns the last route before the requested time.
    pub trip_offset_mins: i64,

    pub unnumbered: UnnumberedPolicy,
}

impl CrawlConfig {
    pub fn with_mot(mut self, mot: MotType) -> Self {
        self.mot = mot;
        self
    }

    pub fn with_line_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.line_prefix = prefix.into();
        self
    }

    pub fn with_first_train(mut self, time: NaiveTime) -> Self {
        self.first_train = time;
        self
    }

    pub fn with_departure_limit(mut self, limit: usize) -> Self {
        self.departure_limit = limit;
        self
    }

    pub fn with_max_routes(mut self, n: usize) -> Self {
        self.max_routes = n;
        self
    }

    pub fn with_unnumbered(mut self, policy: UnnumberedPolicy) -> Self {
        self.unnumbered = policy;
        self
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            mot: MotType::Subway,
            line_prefix: "U".to_string(),
            first_train: NaiveTime::from_hms_opt(3, 0, 0).unwrap_or(NaiveTime::MIN),
            departure_limit: 500,
            max_routes: 200,
            trip_offset_mins: 1,
            unnumbered: UnnumberedPolicy::AcceptAll,
        }
    }
}
