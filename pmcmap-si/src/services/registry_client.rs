//! PMC OAI-PMH registry client
//!
//! Fetches one article's front-matter metadata record per request. Requests
//! pass through a shared politeness gate bounding aggregate rate, and
//! rate-limit signals and transport failures are retried with exponential
//! backoff up to a fixed attempt budget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Mutex;

use pmcmap_common::Config;

use crate::models::article_id::PmcId;
use crate::utils::retry::{run_with_backoff, RetryPolicy};

const USER_AGENT: &str = "pmcmap/0.1.0 (subject aggregation)";

/// Registry fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Rate-limit signal from the registry (HTTP 429/503); retried.
    #[error("Rate limited by registry (HTTP {status})")]
    RateLimited { status: u16 },

    /// Timeout, connect failure, or other transport-level error; retried.
    #[error("Network error: {0}")]
    Transport(String),

    /// Any other HTTP error status; the article is skipped immediately.
    #[error("Registry error {status}: {body}")]
    Http { status: u16, body: String },

    /// Attempt budget spent on retryable failures.
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Rate-limit signals and transport failures share the retry budget.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::RateLimited { .. } | FetchError::Transport(_)
        )
    }
}

/// Minimum-interval gate bounding aggregate request rate.
///
/// Shared across workers; every attempt, retries included, waits its turn.
struct PolitenessGate {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl PolitenessGate {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to keep the configured minimum interval.
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// OAI-PMH registry client
pub struct RegistryClient {
    http_client: reqwest::Client,
    gate: Arc<PolitenessGate>,
    endpoint: String,
    metadata_prefix: String,
    oai_namespace: String,
    policy: RetryPolicy,
}

impl RegistryClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            gate: Arc::new(PolitenessGate::new(Duration::from_millis(
                config.politeness_ms,
            ))),
            endpoint: config.registry_url.clone(),
            metadata_prefix: config.metadata_prefix.clone(),
            oai_namespace: config.oai_namespace.clone(),
            policy: RetryPolicy {
                max_attempts: config.max_attempts,
                base_delay: Duration::from_millis(config.base_delay_ms),
                backoff_factor: config.backoff_factor,
            },
        })
    }

    /// Fetch the raw `GetRecord` response body for one article.
    ///
    /// Retries rate limiting and transport failures up to the configured
    /// attempt budget; any other error status fails immediately.
    pub async fn fetch_record(&self, id: &PmcId) -> Result<String, FetchError> {
        let (result, attempts) = run_with_backoff(
            "GetRecord",
            self.policy,
            FetchError::is_retryable,
            || self.attempt(id),
        )
        .await;

        match result {
            Ok(body) => Ok(body),
            Err(last) if last.is_retryable() => Err(FetchError::Exhausted {
                attempts,
                last: Box::new(last),
            }),
            Err(err) => Err(err),
        }
    }

    async fn attempt(&self, id: &PmcId) -> Result<String, FetchError> {
        self.gate.wait().await;

        let identifier = format!("{}{}", self.oai_namespace, id.numeric());

        tracing::debug!(pmc_id = %id, identifier = %identifier, "Querying OAI-PMH registry");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("verb", "GetRecord"),
                ("identifier", identifier.as_str()),
                ("metadataPrefix", self.metadata_prefix.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 || status == 503 {
            return Err(FetchError::RateLimited { status });
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http { status, body });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}
