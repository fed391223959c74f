//! Maps provider stop references onto stations of the network.
//!
//! Topology and timetable provider name stations differently often enough
//! that exact matching is not sufficient. Resolution tries, in order:
//!
//! 1. exact name
//! 2. an already bound stop ID
//! 3. the provider's own name for the stop ID
//! 4. fuzzy name matching
//!
//! Strategies 3 and 4 bind the stop ID to the station they find.

use tracing::debug;

use crate::domain::{Network, StationIdx, StopRef};

use super::{CrawlError, TimetableProvider};

/// Resolves provider stops against a network, asking the provider when
/// the network alone is not enough.
pub struct StationResolver<'p, P> {
    provider: &'p P,
}

impl<'p, P: TimetableProvider> StationResolver<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    pub async fn resolve(
        &self,
        network: &mut Network,
        stop: &StopRef,
    ) -> Result<StationIdx, CrawlError> {
        if let Some(idx) = by_exact_name(network, stop) {
            return Ok(idx);
        }

        if let Some(idx) = by_stop_id(network, stop) {
            return Ok(idx);
        }

        if let Some(idx) = self.by_provider_name(network, stop).await? {
            debug!(
                stop = %stop.name,
                id = %stop.id,
                station = network.station(idx).name(),
                "resolved via provider name"
            );
            return Ok(idx);
        }

        let idx = by_fuzzy_name(network, stop)?;
        network.station_mut(idx).bind_stop_id(stop.id);
        debug!(
            stop = %stop.name,
            id = %stop.id,
            station = network.station(idx).name(),
            "resolved via fuzzy match"
        );
        Ok(idx)
    }

    /// Ask the provider for its canonical name of the stop ID and look that
    /// up in the registry.
    async fn by_provider_name(
        &self,
        network: &mut Network,
        stop: &StopRef,
    ) -> Result<Option<StationIdx>, CrawlError> {
        let found = self.provider.stop_by_id(stop.id).await?;
        let Some(canonical) = found.unique_stop() else {
            return Err(CrawlError::NotUniquelyIdentified {
                query: stop.id.to_string(),
                candidates: found.candidates.len(),
            });
        };

        let Some(idx) = network.station_by_name(&canonical.name) else {
            return Ok(None);
        };
        if network.station_mut(idx).bind_stop_id(stop.id) {
            Ok(Some(idx))
        } else {
            Ok(None)
        }
    }
}

fn by_exact_name(network: &Network, stop: &StopRef) -> Option<StationIdx> {
    network.station_by_name(&stop.name)
}

fn by_stop_id(network: &Network, stop: &StopRef) -> Option<StationIdx> {
    network.station_by_stop_id(stop.id)
}

/// Succeeds only if exactly one station matches. Stations bound to another
/// stop ID are not considered.
fn by_fuzzy_name(network: &Network, stop: &StopRef) -> Result<StationIdx, CrawlError> {
    let wanted = sanitize(&stop.name);
    if wanted.is_empty() {
        return Err(CrawlError::NotFound(stop.name.clone()));
    }

    let matches: Vec<StationIdx> = network
        .stations()
        .filter(|(_, station)| station.accepts_stop_id(stop.id))
        .filter(|(_, station)| fuzzy_eq(&wanted, &sanitize(station.name())))
        .map(|(idx, _)| idx)
        .collect();

    match matches.as_slice() {
        [] => Err(CrawlError::NotFound(stop.name.clone())),
        [idx] => Ok(*idx),
        _ => Err(CrawlError::AmbiguousMatch {
            name: stop.name.clone(),
            candidates: matches
                .iter()
                .map(|idx| network.station(*idx).name().to_string())
                .collect(),
        }),
    }
}

/// Lowercase and drop everything that is not a letter or digit.
///
/// # Examples
///
/// ```
/// use schedcrawl::crawler::sanitize;
///
/// assert_eq!(sanitize("Theresienwiese"), "theresienwiese");
/// assert_eq!(sanitize("St.-Quirin-Platz"), "stquirinplatz");
/// ```
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Two sanitized names match if either is a subsequence of the other.
fn fuzzy_eq(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (is_subsequence(a, b) || is_subsequence(b, a))
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut rest = haystack.chars();
    needle.chars().all(|c| rest.any(|h| h == c))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sanitize_is_idempotent(name in "[A-Za-z0-9äöüÄÖÜß .,()/-]{0,40}") {
            let once = sanitize(&name);
            prop_assert_eq!(sanitize(&once), once.clone());
        }

        #[test]
        fn sanitize_ignores_separators(words in proptest::collection::vec("[A-Za-z]{1,8}", 1..5)) {
            let spaced = words.join(" ");
            let hyphenated = words.join("-");
            let dotted = words.join(". ");
            prop_assert_eq!(sanitize(&spaced), sanitize(&hyphenated));
            prop_assert_eq!(sanitize(&spaced), sanitize(&dotted));
        }

        #[test]
        fn name_matches_its_own_prefix(name in "[a-z]{1,20}", cut in 1usize..20) {
            let cut = cut.min(name.len());
            prop_assert!(fuzzy_eq(&name[..cut], &name));
        }
    }
}
