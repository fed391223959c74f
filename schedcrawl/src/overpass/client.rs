//! Overpass API client.
//!
//! Fetches the route relations of one public transport network together with
//! their stop nodes. Overpass instances are frequently overloaded, so
//! transient failures are retried with exponential backoff.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::OverpassError;
use super::types::OverpassResponse;

/// Default Overpass endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Network relation of the Munich U-Bahn.
pub const DEFAULT_RELATION_ID: i64 = 7099055;

const DEFAULT_MAX_RETRIES: u32 = 3;
const INITIAL_RETRY_DELAY_SECS: u64 = 5;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5 * 60);

/// Configuration for the Overpass client.
#[derive(Debug, Clone)]
pub struct OverpassConfig {
    /// Interpreter endpoint
    pub url: String,
    /// Network relation whose route relations make up the topology
    pub relation_id: i64,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts before giving up on transient failures
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further one
    pub retry_delay: Duration,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERPASS_URL.to_string(),
            relation_id: DEFAULT_RELATION_ID,
            timeout_secs: 200,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(INITIAL_RETRY_DELAY_SECS),
        }
    }
}

impl OverpassConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_relation(mut self, relation_id: i64) -> Self {
        self.relation_id = relation_id;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// At least one attempt is always made.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (1-based), doubling each time
    /// and never longer than five minutes.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_delay
            .saturating_mul(factor)
            .min(MAX_RETRY_DELAY)
    }

    /// Overpass QL selecting every route of the network relation and the
    /// nodes those routes stop at.
    pub fn query(&self) -> String {
        // The server-side timeout stays below the client timeout so a slow
        // query fails with a status rather than a dropped connection.
        let server_timeout = self.timeout_secs.saturating_sub(20).max(1);
        format!(
            r#"[out:json][timeout:{server_timeout}];
rel({relation});
rel(r);
foreach(
  ._;
  rel(r)->.route;
  (
    node(r.route:"stop");
    node(r.route:"stop_exit_only");
    node(r.route:"stop_entry_only");
  )->.stops;
  (
    rel.route;
    node.stops;
  );
  out;
);"#,
            relation = self.relation_id
        )
    }
}

/// Client for an Overpass interpreter.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    http: reqwest::Client,
    config: OverpassConfig,
}

impl OverpassClient {
    pub fn new(config: OverpassConfig) -> Result<Self, OverpassError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| OverpassError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OverpassConfig {
        &self.config
    }

    /// Fetch the raw route relations and stop nodes of the network.
    pub async fn fetch_response(&self) -> Result<OverpassResponse, OverpassError> {
        info!(relation = self.config.relation_id, "fetching topology");
        let body = self.execute_with_retry(&self.config.query()).await?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body_preview = %body.chars().take(500).collect::<String>(),
                "failed to parse Overpass response"
            );
            OverpassError::Parse(e.to_string())
        })
    }

    async fn execute_with_retry(&self, query: &str) -> Result<String, OverpassError> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                let delay = self.config.backoff(attempt);
                warn!(attempt, delay_secs = delay.as_secs(), "retrying Overpass request");
                tokio::time::sleep(delay).await;
            }

            match self.execute_request(query).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() => {
                    warn!(attempt, error = %e, "transient Overpass error");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| OverpassError::Network("max retries exceeded".into())))
    }

    async fn execute_request(&self, query: &str) -> Result<String, OverpassError> {
        debug!(url = %self.config.url, "executing Overpass query");

        let response = self
            .http
            .post(&self.config.url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| OverpassError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OverpassError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(OverpassError::Status {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        Ok(text)
    }
}
