//! Caching layer for stop lookups.
//!
//! The resolver asks the provider for the canonical name of the same stop
//! IDs over and over (every trip through a station resolves it again
//! until the ID is bound), and the departure crawler identifies stations by
//! name. Both answers are stable for the length of a run, so they are
//! cached. Departure listings and routes are not.

use std::time::Duration;

use chrono::NaiveDateTime;
use moka::future::Cache as MokaCache;

use crate::crawler::TimetableProvider;
use crate::domain::{BoardDeparture, MotType, PlannedRoute, StopId, StopMatch};
use crate::efa::EfaError;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per lookup kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Timetable provider with cached stop lookups.
///
/// Wraps any provider. Failed lookups are not cached.
pub struct CachedTimetable<P> {
    inner: P,
    by_name: MokaCache<String, StopMatch>,
    by_id: MokaCache<StopId, StopMatch>,
}

impl<P: TimetableProvider> CachedTimetable<P> {
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let by_name = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let by_id = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            by_name,
            by_id,
        }
    }

    /// Access the underlying provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

}

impl<P: TimetableProvider> TimetableProvider for CachedTimetable<P> {
    async fn find_stop(&self, name: &str) -> Result<StopMatch, EfaError> {
        if let Some(cached) = self.by_name.get(name).await {
            return Ok(cached);
        }
        let found = self.inner.find_stop(name).await?;
        self.by_name.insert(name.to_string(), found.clone()).await;
        Ok(found)
    }

    async fn stop_by_id(&self, id: StopId) -> Result<StopMatch, EfaError> {
        if let Some(cached) = self.by_id.get(&id).await {
            return Ok(cached);
        }
        let found = self.inner.stop_by_id(id).await?;
        self.by_id.insert(id, found.clone()).await;
        Ok(found)
    }

    async fn departures(
        &self,
        stop: StopId,
        from: NaiveDateTime,
        limit: usize,
        mot: MotType,
    ) -> Result<Vec<BoardDeparture>, EfaError> {
        self.inner.departures(stop, from, limit, mot).await
    }

    async fn routes(
        &self,
        origin: StopId,
        destination: StopId,
        depart_at: NaiveDateTime,
        mot: MotType,
        max_routes: usize,
    ) -> Result<Vec<PlannedRoute>, EfaError> {
        self.inner
            .routes(origin, destination, depart_at, mot, max_routes)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::efa::MockTimetable;

    fn cached() -> CachedTimetable<MockTimetable> {
        let mock = MockTimetable::new()
            .with_stop(StopId::new(2), "Marienplatz")
            .with_failing_stop(StopId::new(2));
        CachedTimetable::new(mock, &CacheConfig::default())
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_capacity, 10_000);
    }

    #[tokio::test]
    async fn name_lookups_hit_cache() {
        let provider = cached();

        let first = provider.find_stop("Marienplatz").await.unwrap();
        let second = provider.find_stop("Marienplatz").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.inner().call_count(), 1);
    }

    #[tokio::test]
    async fn id_lookups_hit_cache() {
        let provider = cached();

        provider.stop_by_id(StopId::new(2)).await.unwrap();
        provider.stop_by_id(StopId::new(2)).await.unwrap();
        provider.stop_by_id(StopId::new(3)).await.unwrap();
        assert_eq!(provider.inner().call_count(), 2);
    }

    #[tokio::test]
    async fn listings_are_not_cached() {
        let provider = cached();
        let from = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(3, 0, 0)
            .unwrap();

        assert!(
            provider
                .departures(StopId::new(2), from, 10, MotType::Subway)
                .await
                .is_err()
        );
        assert!(
            provider
                .departures(StopId::new(2), from, 10, MotType::Subway)
                .await
                .is_err()
        );
        assert_eq!(provider.inner().call_count(), 2);
    }
}
