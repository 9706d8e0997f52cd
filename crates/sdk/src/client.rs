//! JobScout Client Implementation

use std::time::Duration;

use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};

use crate::error::{Result, SdkError};
use crate::types::{
    ActivityResponse, CancelResponse, ResultsQuery, ResultsResponse, StartResponse, StatsResponse,
    StatusResponse,
};

/// JobScout Engine Client
///
/// High-level interface to a running JobScout daemon.
///
/// # Example
///
/// ```no_run
/// use jobscout_sdk::JobscoutClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = JobscoutClient::connect("http://127.0.0.1:9610").await?;
/// let started = client.start("my-search-spec").await?;
/// # Ok(())
/// # }
/// ```
pub struct JobscoutClient {
    client: HttpClient,
}

impl JobscoutClient {
    /// Connect to a JobScout daemon at `url` (e.g. `http://127.0.0.1:9610`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url.as_ref())
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Start an execution for a search spec.
    ///
    /// Returns immediately with the execution id; the run continues in the
    /// daemon regardless of what this client does next.
    pub async fn start(&self, search_id: impl Into<String>) -> Result<StartResponse> {
        let mut params = ObjectParams::new();
        params.insert("search_id", search_id.into())?;

        Ok(self.client.request("search.start.v1", params).await?)
    }

    /// Poll the status of one execution
    pub async fn status(&self, execution_id: impl Into<String>) -> Result<StatusResponse> {
        let mut params = ObjectParams::new();
        params.insert("execution_id", execution_id.into())?;

        Ok(self.client.request("search.status.v1", params).await?)
    }

    /// Request cooperative cancellation of a running execution.
    ///
    /// The run resolves to `cancelled` at its next checkpoint; poll
    /// [`status`](Self::status) to observe the transition.
    pub async fn cancel(&self, execution_id: impl Into<String>) -> Result<CancelResponse> {
        let mut params = ObjectParams::new();
        params.insert("execution_id", execution_id.into())?;

        Ok(self.client.request("search.cancel.v1", params).await?)
    }

    /// Query persisted results for a search spec
    pub async fn results(
        &self,
        search_id: impl Into<String>,
        query: ResultsQuery,
    ) -> Result<ResultsResponse> {
        let mut params = ObjectParams::new();
        params.insert("search_id", search_id.into())?;
        params.insert("source", query.source)?;
        params.insert("min_score", query.min_score)?;
        params.insert("include_duplicates", query.include_duplicates)?;
        params.insert("limit", query.limit)?;

        Ok(self.client.request("search.results.v1", params).await?)
    }

    /// Tail the activity log of an execution
    pub async fn activity(
        &self,
        execution_id: impl Into<String>,
        limit: usize,
    ) -> Result<ActivityResponse> {
        let mut params = ObjectParams::new();
        params.insert("execution_id", execution_id.into())?;
        params.insert("limit", limit)?;

        Ok(self.client.request("search.activity.v1", params).await?)
    }

    /// Get daemon statistics
    pub async fn stats(&self) -> Result<StatsResponse> {
        Ok(self
            .client
            .request("admin.stats.v1", ObjectParams::new())
            .await?)
    }

    /// Poll until the execution reaches a terminal status.
    ///
    /// Polls every `poll_interval` and gives up after `timeout` with
    /// [`SdkError::WaitTimeout`]; the execution itself keeps running.
    pub async fn wait_for_terminal(
        &self,
        execution_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<StatusResponse> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let status = self.status(execution_id).await?;
            if status.is_terminal() {
                return Ok(status);
            }
            if tokio::time::Instant::now() + poll_interval > deadline {
                return Err(SdkError::WaitTimeout);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
