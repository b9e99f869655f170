//! Remote collector contract and HTTP implementation
//!
//! The pipeline needs exactly one asynchronous capability from the
//! surrounding network stack: submit one client error record. Transport,
//! authentication, and endpoint layout stay behind this trait.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use faultline_core::config::CollectorConfig;
use faultline_core::ErrorReport;
use thiserror::Error;
use tracing::debug;

/// Errors a collector submission can fail with.
///
/// Deliveries are fire-and-forget; these never travel further than a log
/// line in the delivery task.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The request never completed (connect failure, timeout, ...).
    #[error("failed to send report: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collector answered with a non-success status.
    #[error("collector returned status {0}")]
    Status(reqwest::StatusCode),

    /// Submission rejected for any other reason.
    #[error("report rejected: {0}")]
    Rejected(String),
}

/// The single operation the pipeline consumes from the outside world.
#[async_trait]
pub trait Collector: Send + Sync {
    async fn submit_client_error(&self, report: ErrorReport) -> Result<(), DeliveryError>;
}

/// Default collector: POSTs the JSON report to a configured endpoint.
pub struct HttpCollector {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCollector {
    /// Creates a collector posting to `endpoint` with a default client.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Creates a collector with an externally configured client
    /// (useful for tests and for hosts that share a client).
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Builds a collector from configuration, applying the request timeout.
    pub fn from_config(config: &CollectorConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for collector")?;
        Ok(Self::with_client(client, config.endpoint.clone()))
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn submit_client_error(&self, report: ErrorReport) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&report)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status));
        }

        debug!(endpoint = %self.endpoint, "delivered error report");
        Ok(())
    }
}
