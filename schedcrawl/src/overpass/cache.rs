//! On-disk snapshot of the Overpass answer for a network relation.
//!
//! The raw response is stored rather than the converted topology, so a
//! change in how relations are converted takes effect without refetching.
//! A snapshot is only served for the relation it was fetched for and while
//! it is younger than the TTL.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Topology;

use super::convert::convert_topology;
use super::error::OverpassError;
use super::types::OverpassResponse;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    relation_id: i64,
    fetched_at: DateTime<Utc>,
    response: OverpassResponse,
}

/// Where the snapshot lives and how long it stays usable.
#[derive(Debug, Clone)]
pub struct TopologyCacheConfig {
    pub path: PathBuf,
    pub ttl: Duration,
}

impl TopologyCacheConfig {
    /// Snapshot at `path`, valid for a week.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TopologyCache {
    config: TopologyCacheConfig,
}

impl TopologyCache {
    pub fn new(config: TopologyCacheConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// The topology of `relation_id`, if a usable snapshot exists.
    pub fn load(&self, relation_id: i64) -> Option<Topology> {
        let snapshot = self.read()?;
        if snapshot.relation_id != relation_id {
            debug!(
                cached = snapshot.relation_id,
                wanted = relation_id,
                "snapshot is for another relation"
            );
            return None;
        }
        if !self.is_fresh(snapshot.fetched_at, Utc::now()) {
            debug!(fetched_at = %snapshot.fetched_at, "snapshot expired");
            return None;
        }
        Some(convert_topology(&snapshot.response))
    }

    /// Store `response` as the snapshot of `relation_id`.
    ///
    /// The file is written next to its final location and renamed into
    /// place, so an interrupted run never leaves a truncated snapshot.
    pub fn save(&self, relation_id: i64, response: &OverpassResponse) -> Result<(), OverpassError> {
        let snapshot = Snapshot {
            relation_id,
            fetched_at: Utc::now(),
            response: response.clone(),
        };
        let json = serde_json::to_vec(&snapshot)?;

        let path = &self.config.path;
        let staging = path.with_extension("tmp");
        let io_error = |source: io::Error| OverpassError::Snapshot {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_error)?;
        }
        std::fs::write(&staging, json).map_err(io_error)?;
        std::fs::rename(&staging, path).map_err(io_error)
    }

    fn read(&self) -> Option<Snapshot> {
        let bytes = std::fs::read(&self.config.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(path = %self.config.path.display(), error = %e, "unreadable snapshot");
                None
            }
        }
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match (now - fetched_at).to_std() {
            Ok(age) => age < self.config.ttl,
            // Written "in the future": the clock moved, don't trust it.
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const U3: &str = r#"{"elements": [
        {"type": "relation", "id": 5, "tags": {"type": "route", "ref": "U3"},
         "members": [{"type": "node", "ref": 1, "role": "stop"},
                     {"type": "node", "ref": 2, "role": "stop_exit_only"}]},
        {"type": "node", "id": 1, "lat": 48.18, "lon": 11.51, "tags": {"name": "Moosach"}},
        {"type": "node", "id": 2, "tags": {"name": "Fürstenried West"}}
    ]}"#;

    fn response() -> OverpassResponse {
        serde_json::from_str(U3).unwrap()
    }

    fn cache_in(dir: &Path) -> TopologyCache {
        TopologyCache::new(TopologyCacheConfig::new(dir.join("topology.json")))
    }

    #[test]
    fn snapshot_loads_as_converted_topology() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());

        cache.save(7099055, &response()).unwrap();

        let topology = cache.load(7099055).unwrap();
        assert_eq!(topology, convert_topology(&response()));
        assert_eq!(topology.routes[0].stops.len(), 2);
    }

    #[test]
    fn snapshot_of_other_relation_is_ignored() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());

        cache.save(7099055, &response()).unwrap();

        assert!(cache.load(1).is_none());
    }

    #[test]
    fn expired_snapshot_is_ignored() {
        let dir = tempdir().unwrap();
        let config =
            TopologyCacheConfig::new(dir.path().join("topology.json")).with_ttl(Duration::ZERO);
        let cache = TopologyCache::new(config);

        cache.save(7099055, &response()).unwrap();

        assert!(cache.load(7099055).is_none());
    }

    #[test]
    fn freshness_against_ttl() {
        let cache = TopologyCache::new(
            TopologyCacheConfig::new("unused.json").with_ttl(Duration::from_secs(3600)),
        );
        let now = Utc::now();

        assert!(cache.is_fresh(now - chrono::Duration::minutes(59), now));
        assert!(!cache.is_fresh(now - chrono::Duration::minutes(60), now));
        assert!(!cache.is_fresh(now + chrono::Duration::minutes(5), now));
    }

    #[test]
    fn missing_or_corrupt_snapshot_is_ignored() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());
        assert!(cache.load(7099055).is_none());

        std::fs::write(cache.path(), "{not json").unwrap();
        assert!(cache.load(7099055).is_none());
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("topology.json");
        let cache = TopologyCache::new(TopologyCacheConfig::new(&path));

        cache.save(1, &response()).unwrap();
        cache.save(2, &OverpassResponse::default()).unwrap();

        assert!(cache.load(1).is_none());
        assert!(cache.load(2).unwrap().routes.is_empty());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn unwritable_location_reports_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let cache = TopologyCache::new(TopologyCacheConfig::new(blocker.join("topology.json")));

        let err = cache.save(1, &response()).unwrap_err();
        assert!(matches!(err, OverpassError::Snapshot { .. }));
        assert!(err.to_string().contains("topology.json"));
    }
}
