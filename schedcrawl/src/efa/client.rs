//! EFA HTTP client.
//!
//! Provides async methods for the three EFA requests the crawler needs:
//! stop finder, departure monitor and trip request. Handles rate limiting
//! and conversion to domain types.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::crawler::TimetableProvider;
use crate::domain::{BoardDeparture, MotType, PlannedRoute, StopId, StopMatch};

use super::convert::{convert_departure_monitor, convert_stop_finder, convert_trips};
use super::error::EfaError;
use super::types::{DepartureMonitorResponse, StopFinderResponse, TripResponse};

/// Default base URL (MVV, Munich).
pub const DEFAULT_BASE_URL: &str = "https://efa.mvv-muenchen.de/ng/";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Configuration for the EFA client.
#[derive(Debug, Clone)]
pub struct EfaConfig {
    /// Base URL of the EFA instance, ending in a slash
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EfaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }
}

impl EfaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// EFA API client.
///
/// Uses a semaphore to limit concurrent requests; the provider is a shared
/// public service.
#[derive(Debug, Clone)]
pub struct EfaClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl EfaClient {
    pub fn new(config: EfaConfig) -> Result<Self, EfaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Look up stops by free-text name.
    pub async fn find_stop(&self, name: &str) -> Result<StopMatch, EfaError> {
        self.stop_finder("stop", name).await
    }

    /// Look up a stop by its numeric ID.
    pub async fn stop_by_id(&self, id: StopId) -> Result<StopMatch, EfaError> {
        self.stop_finder("stopID", &id.to_string()).await
    }

    async fn stop_finder(&self, kind: &str, value: &str) -> Result<StopMatch, EfaError> {
        let resp: StopFinderResponse = self
            .get(
                "XML_STOPFINDER_REQUEST",
                vec![
                    ("type_sf", kind.to_string()),
                    ("name_sf", value.to_string()),
                ],
            )
            .await?;

        convert_stop_finder(&resp).map_err(|e| EfaError::InvalidResponse(e.to_string()))
    }

    /// Departures from a stop, starting at `from`.
    ///
    /// # Arguments
    ///
    /// * `stop` - Stop ID
    /// * `from` - Start of the listing (local time)
    /// * `limit` - Maximum number of entries
    /// * `mot` - Only list services of this mode of transport
    pub async fn departures(
        &self,
        stop: StopId,
        from: NaiveDateTime,
        limit: usize,
        mot: MotType,
    ) -> Result<Vec<BoardDeparture>, EfaError> {
        let mot_key = mot_param(mot);
        let query = vec![
            ("mode", "direct".to_string()),
            ("type_dm", "stop".to_string()),
            ("name_dm", stop.to_string()),
            ("itdDate", from.format("%Y%m%d").to_string()),
            ("itdTime", from.format("%H%M").to_string()),
            ("limit", limit.to_string()),
            ("useRealtime", "0".to_string()),
            ("includedMeans", "checkbox".to_string()),
            (mot_key.as_str(), "on".to_string()),
        ];

        let resp: DepartureMonitorResponse = self.get("XML_DM_REQUEST", query).await?;
        Ok(convert_departure_monitor(&resp))
    }

    /// Plan routes departing `origin` at or after `depart_at`.
    pub async fn routes(
        &self,
        origin: StopId,
        destination: StopId,
        depart_at: NaiveDateTime,
        mot: MotType,
        max_routes: usize,
    ) -> Result<Vec<PlannedRoute>, EfaError> {
        let mot_key = mot_param(mot);
        let query = vec![
            ("type_origin", "stop".to_string()),
            ("name_origin", origin.to_string()),
            ("type_destination", "stop".to_string()),
            ("name_destination", destination.to_string()),
            ("itdDate", depart_at.format("%Y%m%d").to_string()),
            ("itdTime", depart_at.format("%H%M").to_string()),
            ("itdTripDateTimeDepArr", "dep".to_string()),
            ("calcNumberOfTrips", max_routes.to_string()),
            ("useRealtime", "0".to_string()),
            ("includedMeans", "checkbox".to_string()),
            (mot_key.as_str(), "on".to_string()),
        ];

        let resp: TripResponse = self.get("XML_TRIP_REQUEST2", query).await?;
        Ok(convert_trips(&resp))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<T, EfaError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| EfaError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        query.push(("outputFormat", "JSON".to_string()));
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, ?query, "EFA request");

        let response = self.http.get(&url).query(&query).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EfaError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EfaError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| EfaError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

/// Query key enabling one mode of transport (used with
/// `includedMeans=checkbox`).
fn mot_param(mot: MotType) -> String {
    format!("inclMOT_{}", mot.code())
}

impl TimetableProvider for EfaClient {
    async fn find_stop(&self, name: &str) -> Result<StopMatch, EfaError> {
        EfaClient::find_stop(self, name).await
    }

    async fn stop_by_id(&self, id: StopId) -> Result<StopMatch, EfaError> {
        EfaClient::stop_by_id(self, id).await
    }

    async fn departures(
        &self,
        stop: StopId,
        from: NaiveDateTime,
        limit: usize,
        mot: MotType,
    ) -> Result<Vec<BoardDeparture>, EfaError> {
        EfaClient::departures(self, stop, from, limit, mot).await
    }

    async fn routes(
        &self,
        origin: StopId,
        destination: StopId,
        depart_at: NaiveDateTime,
        mot: MotType,
        max_routes: usize,
    ) -> Result<Vec<PlannedRoute>, EfaError> {
        EfaClient::routes(self, origin, destination, depart_at, mot, max_routes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = EfaConfig::new()
            .with_base_url("http://localhost:8080")
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.base_url, "http://localhost:8080/");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = EfaConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation() {
        assert!(EfaClient::new(EfaConfig::default()).is_ok());
    }

    #[test]
    fn mot_query_key() {
        assert_eq!(mot_param(MotType::Subway), "inclMOT_2");
        assert_eq!(mot_param(MotType::Tram), "inclMOT_4");
    }
}
