//! Backend submission of a qualified claim.
//!
//! The processing step talks to the backend through `SubmissionClient`. In
//! deployments without a backend the simulated client stands in, preserving
//! the funnel's visible five-second processing latency.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use intake_flow::{FlowError, Result};

use crate::steps::types::ClaimRecord;

pub const SIMULATED_SUBMIT_DELAY_MS: u64 = 5_000;

#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, record: &ClaimRecord) -> Result<()>;
}

/// Stand-in for a real backend: waits the configured delay, then succeeds.
pub struct SimulatedSubmissionClient {
    delay: Duration,
}

impl SimulatedSubmissionClient {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(SIMULATED_SUBMIT_DELAY_MS))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedSubmissionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionClient for SimulatedSubmissionClient {
    async fn submit(&self, _record: &ClaimRecord) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        info!("simulated claim submission completed");
        Ok(())
    }
}

/// POSTs the claim record as JSON to the configured backend endpoint.
pub struct HttpSubmissionClient {
    client: reqwest::Client,
    url: String,
}

impl HttpSubmissionClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn submit(&self, record: &ClaimRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| FlowError::SubmissionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FlowError::SubmissionFailed(format!(
                "backend returned {}",
                response.status()
            )));
        }

        info!(url = %self.url, "claim submitted to backend");
        Ok(())
    }
}
