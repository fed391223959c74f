//! Crawl error types.

use crate::efa::EfaError;

/// Coarse classification of crawl failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The provider returned several candidates where one was needed.
    AmbiguousIdentification,
    /// No station could be resolved by any strategy.
    NotFound,
    /// Transport or provider error, including malformed data.
    UpstreamFailure,
    /// Route planning produced nothing usable.
    NoRouteFound,
}

/// Errors raised while assembling the network.
///
/// All of these abort only the unit of work they occur in; the caller
/// decides whether that is a single departure or a whole station.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Provider lookup did not yield exactly one stop
    #[error("stop {query:?} was not uniquely identified ({candidates} candidates)")]
    NotUniquelyIdentified { query: String, candidates: usize },

    /// No strategy found a station
    #[error("station {0:?} not found")]
    NotFound(String),

    /// Fuzzy matching found more than one station
    #[error("station {name:?} is ambiguous: {}", .candidates.join(", "))]
    AmbiguousMatch {
        name: String,
        candidates: Vec<String>,
    },

    /// Provider request failed
    #[error("timetable provider: {0}")]
    Upstream(#[from] EfaError),

    /// Route planning returned no routes
    #[error("no route from {origin} to {destination}")]
    NoRouteFound { origin: String, destination: String },

    /// A route stop carried neither arrival nor departure
    #[error("route stop {0:?} has no time")]
    MissingDepartureTime(String),
}

impl CrawlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrawlError::NotUniquelyIdentified { .. } | CrawlError::AmbiguousMatch { .. } => {
                ErrorKind::AmbiguousIdentification
            }
            CrawlError::NotFound(_) => ErrorKind::NotFound,
            CrawlError::Upstream(_) | CrawlError::MissingDepartureTime(_) => {
                ErrorKind::UpstreamFailure
            }
            CrawlError::NoRouteFound { .. } => ErrorKind::NoRouteFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CrawlError::NotFound("Olympiazentrum".into());
        assert_eq!(err.to_string(), "station \"Olympiazentrum\" not found");

        let err = CrawlError::AmbiguousMatch {
            name: "Platz".into(),
            candidates: vec!["Marienplatz".into(), "Odeonsplatz".into()],
        };
        assert_eq!(
            err.to_string(),
            "station \"Platz\" is ambiguous: Marienplatz, Odeonsplatz"
        );

        let err = CrawlError::NoRouteFound {
            origin: "A".into(),
            destination: "C".into(),
        };
        assert_eq!(err.to_string(), "no route from A to C");

        let err = CrawlError::Upstream(EfaError::RateLimited);
        assert_eq!(
            err.to_string(),
            "timetable provider: rate limited by EFA API"
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(
            CrawlError::NotUniquelyIdentified {
                query: "x".into(),
                candidates: 2
            }
            .kind(),
            ErrorKind::AmbiguousIdentification
        );
        assert_eq!(
            CrawlError::AmbiguousMatch {
                name: "x".into(),
                candidates: vec![]
            }
            .kind(),
            ErrorKind::AmbiguousIdentification
        );
        assert_eq!(CrawlError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            CrawlError::from(EfaError::RateLimited).kind(),
            ErrorKind::UpstreamFailure
        );
        assert_eq!(
            CrawlError::NoRouteFound {
                origin: "a".into(),
                destination: "b".into()
            }
            .kind(),
            ErrorKind::NoRouteFound
        );
    }
}
